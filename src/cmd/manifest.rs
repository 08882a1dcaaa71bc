//! Manifest commands: patch or inspect a single deployment manifest.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use edgecraft::manifest;
use edgecraft::scaffold::validate_module_name;

/// Add a module definition and default route to a manifest file.
pub fn cmd_manifest_add(manifest_path: &Path, name: &str, no_volume: bool) -> Result<()> {
    validate_module_name(name)?;

    let outcome = manifest::update_file(manifest_path, name, !no_volume)?;

    println!(
        "{} Added module {} to {}",
        "✓".green(),
        name.cyan().bold(),
        manifest_path.display()
    );
    println!(
        "  startupOrder {}, modules {} -> {}, route {}",
        outcome.startup_order.to_string().yellow(),
        outcome.modules_before,
        outcome.modules_after,
        outcome.route_added.cyan()
    );

    Ok(())
}

/// Show metadata for one manifest file.
pub fn cmd_manifest_show(manifest_path: &Path, json: bool) -> Result<()> {
    let root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let summary = manifest::summarize(root, manifest_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {}", "Manifest".bold(), summary.name.cyan());
    println!(
        "  {:<12} {}",
        "Modules:",
        summary.modules_count.to_string().yellow()
    );
    if !summary.module_names.is_empty() {
        println!("    {}", summary.module_names.join(", ").dimmed());
    }
    println!(
        "  {:<12} {}",
        "Routes:",
        summary.routes_count.to_string().yellow()
    );

    Ok(())
}
