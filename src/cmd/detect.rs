//! Detect command: scan the project tree and report its structure.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use edgecraft::config::{ConfigSource, ProjectConfig};
use edgecraft::detect::detect_project_structure;

fn field(label: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {:<24} {}", label, v.cyan()),
        None => println!("  {:<24} {}", label, "(not found)".dimmed()),
    }
}

/// Print a human-readable summary of a configuration record.
pub fn print_summary(config: &ProjectConfig) {
    println!(
        "{} {}",
        "Project structure".bold(),
        format!("({})", config.config_source).dimmed()
    );
    println!();
    field("Modules base path:", config.modules_base_path.as_deref());
    field(
        "Contracts project:",
        config.contracts_project_name.as_deref(),
    );
    field(
        "Contracts path:",
        config.contracts_project_path.as_deref(),
    );
    field("Project namespace:", config.project_namespace.as_deref());
    field("Container registry:", config.container_registry.as_deref());
    field("NuGet feed:", config.nuget_feed_url.as_deref());

    if config.manifests_found.is_empty() {
        println!("  {:<24} {}", "Manifests:", "(none found)".dimmed());
    } else {
        println!("  {:<24}", "Manifests:");
        for manifest in &config.manifests_found {
            println!("    {}", manifest.yellow());
        }
    }
}

/// Run project-structure detection and print or save the result.
pub fn cmd_detect(root: &Path, force: bool, save: bool, json: bool) -> Result<()> {
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let config = detect_project_structure(root, force);

    if save && config.config_source == ConfigSource::Detected {
        config.save(root)?;
        if !json {
            println!(
                "{} Saved configuration to {}",
                "✓".green(),
                edgecraft::paths::CONFIG_FILE.cyan()
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print_summary(&config);
    }

    Ok(())
}
