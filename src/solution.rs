//! Solution file discovery and updates.
//!
//! Two formats exist in the wild: the modern XML-based `.slnx` and the
//! legacy `.sln` with project GUIDs. Edgecraft auto-inserts into `.slnx`
//! (the format is line-regular, so the edit is textual and idempotent) and
//! only prints manual instructions for `.sln`, where generating GUIDs by
//! hand is more dangerous than telling the user to run `dotnet sln add`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::find_solution_candidates;

/// Solution file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionKind {
    /// Modern XML-based format, auto-editable
    Slnx,
    /// Legacy GUID-based format, manual instructions only
    Sln,
}

impl std::fmt::Display for SolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionKind::Slnx => write!(f, "slnx"),
            SolutionKind::Sln => write!(f, "sln"),
        }
    }
}

/// A discovered solution file.
#[derive(Debug, Clone)]
pub struct SolutionFile {
    pub kind: SolutionKind,
    pub path: PathBuf,
}

/// What happened when inserting a project into a `.slnx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlnxAction {
    /// Project was inserted at the given position (1-based) of the total
    Added { position: usize, total: usize },
    /// Project was already present, file untouched
    AlreadyExists,
}

/// Find the solution file under `root`, preferring `.slnx` over `.sln` and
/// files closer to the root. Test directories are excluded.
pub fn find_solution_file(root: &Path) -> Option<SolutionFile> {
    let mut slnx = find_solution_candidates(root, "slnx");
    if let Some(path) = pick_nearest(&mut slnx) {
        return Some(SolutionFile {
            kind: SolutionKind::Slnx,
            path,
        });
    }

    let mut sln = find_solution_candidates(root, "sln");
    pick_nearest(&mut sln).map(|path| SolutionFile {
        kind: SolutionKind::Sln,
        path,
    })
}

fn pick_nearest(candidates: &mut Vec<PathBuf>) -> Option<PathBuf> {
    candidates.sort_by_key(|p| (p.components().count(), p.clone()));
    candidates.first().cloned()
}

/// Insert a `<Project Path="..."/>` entry into the `/modules/` folder of a
/// `.slnx` file, keeping entries in case-insensitive alphabetical order.
///
/// The folder element is created when missing. Inserting a path that is
/// already present leaves the file byte-identical.
pub fn add_project_to_slnx(slnx_path: &Path, csproj_path: &str) -> Result<SlnxAction> {
    let content = fs::read_to_string(slnx_path)
        .with_context(|| format!("Failed to read {}", slnx_path.display()))?;

    if content.contains(&format!("Path=\"{}\"", csproj_path)) {
        return Ok(SlnxAction::AlreadyExists);
    }

    let mut lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();

    // Locate (or create) the /modules/ folder element
    let folder_open = lines
        .iter()
        .position(|l| l.contains("<Folder Name=\"/modules/\""));

    let (folder_open, folder_close) = match folder_open {
        Some(open) if lines[open].trim_end().ends_with("/>") => {
            // Self-closing empty folder: expand it so the entry has a home
            let indent = lines[open]
                .chars()
                .take_while(|c| c.is_whitespace())
                .collect::<String>();
            lines[open] = format!("{}<Folder Name=\"/modules/\">", indent);
            lines.insert(open + 1, format!("{}</Folder>", indent));
            (open, open + 1)
        }
        Some(open) => {
            let close = lines[open..]
                .iter()
                .position(|l| l.contains("</Folder>"))
                .map(|offset| open + offset)
                .with_context(|| {
                    format!("Malformed {}: unclosed /modules/ folder", slnx_path.display())
                })?;
            (open, close)
        }
        None => {
            let solution_close = lines
                .iter()
                .position(|l| l.contains("</Solution>"))
                .with_context(|| {
                    format!("Malformed {}: no </Solution> element", slnx_path.display())
                })?;
            lines.insert(solution_close, "  <Folder Name=\"/modules/\">".to_string());
            lines.insert(solution_close + 1, "  </Folder>".to_string());
            (solution_close, solution_close + 1)
        }
    };

    // Existing project paths inside the folder, in file order
    let existing: Vec<String> = lines[folder_open + 1..folder_close]
        .iter()
        .filter_map(|l| extract_project_path(l))
        .collect();

    // Case-insensitive alphabetical insertion point
    let mut insertion_index = existing.len();
    for (i, path) in existing.iter().enumerate() {
        if csproj_path.to_lowercase() < path.to_lowercase() {
            insertion_index = i;
            break;
        }
    }

    let indent = lines[folder_open]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect::<String>();
    let entry = format!("{}  <Project Path=\"{}\" />", indent, csproj_path);
    lines.insert(folder_open + 1 + insertion_index, entry);

    let mut updated = lines.join("\n");
    if content.ends_with('\n') {
        updated.push('\n');
    }
    fs::write(slnx_path, updated)
        .with_context(|| format!("Failed to write {}", slnx_path.display()))?;

    Ok(SlnxAction::Added {
        position: insertion_index + 1,
        total: existing.len() + 1,
    })
}

fn extract_project_path(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with("<Project ") {
        return None;
    }
    let start = line.find("Path=\"")? + 6;
    let end = line[start..].find('"')? + start;
    Some(line[start..end].to_string())
}

/// Manual instructions for adding a project to a legacy `.sln` file.
pub fn sln_instructions(csproj_path: &str, module_name: &str) -> String {
    format!(
        "The solution uses the legacy .sln format, which requires project GUIDs.\n\
         Add the module with the dotnet CLI (recommended):\n\n    \
         dotnet sln add \"{csproj}\"\n\n\
         Or in Visual Studio: right-click the solution, Add > Existing Project,\n\
         and select {csproj}.\n\n\
         For manual editing, generate a new GUID and add:\n\n    \
         Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{name}\", \"{csproj}\", \"{{YOUR-NEW-GUID}}\"\n    \
         EndProject\n",
        csproj = csproj_path,
        name = module_name,
    )
}
