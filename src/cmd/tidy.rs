//! Tidy command: strip trailing newlines from .NET sources.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use edgecraft::tidy::tidy_tree;

/// Walk a directory and trim trailing newlines from .NET source files.
pub fn cmd_tidy(dir: &Path, dry_run: bool) -> Result<()> {
    let report = tidy_tree(dir, dry_run)?;

    let verb = if dry_run { "Would fix" } else { "Fixed" };
    for file in &report.fixed {
        println!("  {} {}", verb.green(), file);
    }

    println!(
        "Scanned {} files, {} {}.",
        report.scanned.to_string().yellow(),
        if dry_run { "would fix" } else { "fixed" },
        report.fixed.len().to_string().yellow()
    );

    Ok(())
}
