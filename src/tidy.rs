//! Trailing-newline cleanup for .NET sources.
//!
//! StyleCop SA1518 with `insert_final_newline = false` requires that files
//! do NOT end with a newline. This walks a tree and strips trailing `\r`/`\n`
//! bytes from files with recognized .NET extensions, skipping build output
//! and VCS directories.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions subject to the SA1518 cleanup
const EXTENSIONS: &[&str] = &[
    "cs",
    "xaml",
    "axaml",
    "csproj",
    "props",
    "targets",
    "editorconfig",
];

/// Directory names never descended into
const EXCLUDE_DIRS: &[&str] = &["bin", "obj", ".vs", ".git", "node_modules"];

/// Outcome of a tidy run.
#[derive(Debug, Default)]
pub struct TidyReport {
    pub scanned: usize,
    /// Relative paths of files that were (or would be, in dry-run) trimmed
    pub fixed: Vec<String>,
}

fn has_target_extension(path: &Path) -> bool {
    // `.editorconfig` is all extension as far as Path is concerned
    if path.file_name().is_some_and(|n| n == ".editorconfig") {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_excluded_dir(name: &str) -> bool {
    EXCLUDE_DIRS
        .iter()
        .any(|d| d.eq_ignore_ascii_case(name))
}

/// Enumerate candidate files under `root` with an explicit stack, skipping
/// excluded directories. Unreadable directories are skipped silently.
fn enumerate_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(current) = stack.pop() {
        let Ok(entries) = fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                if has_target_extension(&path) {
                    files.push(path);
                }
            } else if path.is_dir() {
                let name = entry.file_name();
                if !name.to_str().map(is_excluded_dir).unwrap_or(false) {
                    stack.push(path);
                }
            }
        }
    }

    files.sort();
    files
}

/// Strip all trailing `\r` and `\n` bytes.
fn trim_trailing_newlines(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && (data[end - 1] == b'\n' || data[end - 1] == b'\r') {
        end -= 1;
    }
    &data[..end]
}

/// Walk `root` and trim trailing newlines from matching files.
///
/// With `dry_run`, files are only inspected and the report lists what would
/// change.
pub fn tidy_tree(root: &Path, dry_run: bool) -> Result<TidyReport> {
    if !root.is_dir() {
        anyhow::bail!("Directory not found: {}", root.display());
    }

    let mut report = TidyReport::default();

    for path in enumerate_files(root) {
        report.scanned += 1;

        let data = fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if data.is_empty() {
            continue;
        }

        let trimmed = trim_trailing_newlines(&data);
        if trimmed.len() == data.len() {
            continue;
        }

        if !dry_run {
            fs::write(&path, trimmed)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        report.fixed.push(relative);
    }

    Ok(report)
}
