//! Scan command: list deployment manifests with metadata.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::Path;

use edgecraft::detect::find_deployment_manifests;
use edgecraft::manifest;

/// List all deployment manifests under `root` with per-manifest metadata.
/// Malformed manifests are reported as invalid, not fatal.
pub fn cmd_scan(root: &Path, json_output: bool) -> Result<()> {
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let manifest_paths = find_deployment_manifests(root);

    if json_output {
        let mut entries = Vec::new();
        for path in &manifest_paths {
            match manifest::summarize(root, &root.join(path)) {
                Ok(summary) => {
                    let mut value = serde_json::to_value(&summary)?;
                    value["valid"] = json!(true);
                    entries.push(value);
                }
                Err(e) => entries.push(json!({
                    "path": path,
                    "valid": false,
                    "error": e.to_string(),
                })),
            }
        }
        let output = json!({
            "manifests_found": manifest_paths.len(),
            "manifests": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if manifest_paths.is_empty() {
        println!("{}", "No deployment manifests found.".yellow());
        return Ok(());
    }

    println!(
        "{} {}",
        "Deployment manifests:".bold(),
        format!("({})", manifest_paths.len()).dimmed()
    );
    for path in &manifest_paths {
        match manifest::summarize(root, &root.join(path)) {
            Ok(summary) => {
                println!(
                    "  {} {} modules, {} routes",
                    path.cyan(),
                    summary.modules_count.to_string().yellow(),
                    summary.routes_count.to_string().yellow()
                );
                if !summary.module_names.is_empty() {
                    println!("    {}", summary.module_names.join(", ").dimmed());
                }
            }
            Err(e) => {
                println!("  {} {} {}", path.cyan(), "invalid:".red(), e);
            }
        }
    }

    Ok(())
}
