//! Solution commands: locate the solution file and add projects to it.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use edgecraft::solution::{self, SlnxAction, SolutionKind};

/// Report which solution file (if any) the project uses.
pub fn cmd_solution_detect(root: &Path) -> Result<()> {
    match solution::find_solution_file(root) {
        Some(found) => {
            println!(
                "{} {} solution: {}",
                "✓".green(),
                found.kind.to_string().cyan(),
                found.path.display()
            );
            if found.kind == SolutionKind::Sln {
                println!(
                    "  {}",
                    "Legacy format - edgecraft prints manual instructions instead of editing it."
                        .dimmed()
                );
            }
        }
        None => {
            println!("{}", "No solution file found.".yellow());
        }
    }
    Ok(())
}

/// Add a csproj to the solution, automatically for `.slnx`.
pub fn cmd_solution_add(root: &Path, csproj: &str, name: Option<&str>) -> Result<()> {
    let project_name = name
        .map(|n| n.to_string())
        .or_else(|| {
            Path::new(csproj)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| csproj.to_string());

    match solution::find_solution_file(root) {
        Some(found) if found.kind == SolutionKind::Slnx => {
            match solution::add_project_to_slnx(&found.path, csproj)? {
                SlnxAction::Added { position, total } => {
                    println!(
                        "{} Added {} to {} (position {} of {})",
                        "✓".green(),
                        csproj.cyan(),
                        found.path.display(),
                        position,
                        total
                    );
                }
                SlnxAction::AlreadyExists => {
                    println!(
                        "{} {} already in {}",
                        "•".cyan(),
                        csproj,
                        found.path.display()
                    );
                }
            }
            Ok(())
        }
        Some(found) => {
            println!(
                "{} Solution {} uses the legacy .sln format.",
                "•".yellow(),
                found.path.display()
            );
            println!("{}", solution::sln_instructions(csproj, &project_name));
            Ok(())
        }
        None => anyhow::bail!("No solution file found under {}", root.display()),
    }
}
