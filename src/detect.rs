//! Project-structure detection for IoT Edge solutions.
//!
//! One pass over the project tree, looking for the files an existing IoT
//! Edge solution leaves behind: module `Program.cs` files, a contracts
//! csproj, deployment manifests, `module.json` image definitions, and
//! Dockerfiles. Whatever is found populates a [`ProjectConfig`]; whatever is
//! not stays unset. Detection never returns an error - an empty directory
//! yields an empty record.
//!
//! Test directories are always excluded: a path with any component starting
//! with `test` (case-insensitive) is ignored, so fixture trees under
//! `tests/` never leak into detection results.

use glob::glob;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigSource, ProjectConfig};

/// Find files matching a glob pattern under `root`, excluding test
/// directories. Results are sorted for deterministic output.
fn find_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let full_pattern = format!("{}/{}", root.display(), pattern);

    let mut files: Vec<PathBuf> = glob(&full_pattern)
        .map(|paths| paths.flatten().collect())
        .unwrap_or_default();

    files.retain(|f| !is_test_path(root, f));
    files.sort();
    files
}

/// True if any path component under `root` starts with `test`.
fn is_test_path(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s.to_lowercase().starts_with("test"))
            .unwrap_or(false)
    })
}

/// Convert a path to a forward-slash relative string under `root`.
fn relative_str(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Candidate solution files with the given extension (`sln` or `slnx`),
/// excluding test directories.
pub fn find_solution_candidates(root: &Path, extension: &str) -> Vec<PathBuf> {
    find_files(root, &format!("**/*.{}", extension))
}

/// Find the modules base path by locating existing modules.
///
/// Expected pattern: `**/modules/*/Program.cs`. The base path is the
/// `modules` directory itself, e.g. `src/IoTEdgeModules/modules`.
fn find_modules_base_path(root: &Path) -> Option<String> {
    let module_programs = find_files(root, "**/modules/*/Program.cs");

    module_programs.first().map(|first| {
        // Go up from <modules>/<name>/Program.cs to <modules>
        let modules_dir = first
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(first.as_path());
        relative_str(root, modules_dir)
    })
}

/// Find the shared contracts project.
///
/// Tries `*Modules.Contracts*.csproj` first, then any `*Contracts*.csproj`.
/// Returns (relative directory, project name) of the first match.
fn find_contracts_project(root: &Path) -> Option<(String, String)> {
    let mut contracts = find_files(root, "**/*Modules.Contracts*.csproj");
    if contracts.is_empty() {
        contracts = find_files(root, "**/*Contracts*.csproj");
    }

    contracts.first().map(|first| {
        let project_dir = first.parent().unwrap_or(first.as_path());
        let project_name = first
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        (relative_str(root, project_dir), project_name)
    })
}

/// Find all deployment manifests (`*.deployment.manifest.json`), as sorted
/// relative paths.
pub fn find_deployment_manifests(root: &Path) -> Vec<String> {
    find_files(root, "**/*.deployment.manifest.json")
        .iter()
        .map(|m| relative_str(root, m))
        .collect()
}

/// Extract the base project namespace.
///
/// Checks `<RootNamespace>` in found csproj files first (contracts project
/// preferred), then falls back to `namespace` declarations in C# sources.
/// The base namespace is the portion before `.Modules`, matching the
/// convention `<Base>.Modules.Contracts.<ModuleName>`.
fn extract_namespace(root: &Path, contracts_path: Option<&str>) -> Option<String> {
    let root_ns_re = Regex::new(r"<RootNamespace>([A-Za-z0-9.]+)</RootNamespace>").ok()?;
    let decl_re =
        Regex::new(r"namespace\s+([A-Za-z0-9.]+?)\.Modules(?:\.Contracts)?(?:\.[A-Za-z0-9]+)*\s*[;{]")
            .ok()?;

    // csproj RootNamespace, contracts project first
    let mut csprojs = match contracts_path {
        Some(path) => find_files(&root.join(path), "*.csproj"),
        None => Vec::new(),
    };
    if csprojs.is_empty() {
        csprojs = find_files(root, "**/*.csproj");
    }

    for csproj in csprojs.iter().take(10) {
        let Ok(content) = fs::read_to_string(csproj) else {
            continue;
        };
        if let Some(caps) = root_ns_re.captures(&content) {
            let value = caps[1].to_string();
            // Keep only the part before `.Modules` when present
            let base = value
                .split_once(".Modules")
                .map(|(base, _)| base.to_string())
                .unwrap_or(value);
            if !base.is_empty() {
                return Some(base);
            }
        }
    }

    // Fallback: namespace declarations in C# sources
    let mut cs_files = match contracts_path {
        Some(path) => find_files(&root.join(path), "**/*.cs"),
        None => Vec::new(),
    };
    if cs_files.is_empty() {
        cs_files = find_files(root, "**/modules/*/*.cs");
    }

    for cs_file in cs_files.iter().take(10) {
        let Ok(content) = fs::read_to_string(cs_file) else {
            continue;
        };
        if let Some(caps) = decl_re.captures(&content) {
            return Some(caps[1].to_string());
        }
    }

    None
}

/// Extract the container registry host from module.json files or deployment
/// manifests.
///
/// `module.json` carries `"repository": "<registry>/<module>"` and is the
/// most reliable source. Manifests may name the registry in
/// `registryCredentials` (`"address"`) or in a literal image reference.
fn extract_container_registry(root: &Path, manifest_paths: &[String]) -> Option<String> {
    let repository_re = Regex::new(r#""repository":\s*"([^/"]+)/[^"]+""#).ok()?;
    let address_re = Regex::new(r#""address":\s*"([^"]+)""#).ok()?;
    let image_re = Regex::new(r#""image":\s*"([^/"$][^"/]*)/[^"]+""#).ok()?;

    let module_jsons = find_files(root, "**/modules/*/module.json");
    for module_json in module_jsons.iter().take(5) {
        let Ok(content) = fs::read_to_string(module_json) else {
            continue;
        };
        if let Some(caps) = repository_re.captures(&content) {
            return Some(caps[1].to_string());
        }
    }

    for manifest_path in manifest_paths {
        let Ok(content) = fs::read_to_string(root.join(manifest_path)) else {
            continue;
        };
        if let Some(caps) = repository_re.captures(&content) {
            return Some(caps[1].to_string());
        }
        if let Some(caps) = address_re.captures(&content) {
            return Some(caps[1].to_string());
        }
        // Literal images also name the registry; skip the Microsoft-hosted
        // runtime images.
        for caps in image_re.captures_iter(&content) {
            let host = caps[1].to_string();
            if host != "mcr.microsoft.com" {
                return Some(host);
            }
        }
    }

    None
}

/// Extract a private NuGet feed URL from module Dockerfiles.
///
/// Looks for the `VSS_NUGET_EXTERNAL_FEED_ENDPOINTS` JSON blob, which embeds
/// `"endpoint":"https://.../nuget/v3/index.json"` (quotes are often escaped
/// inside the Dockerfile ENV line).
fn extract_nuget_feed_url(root: &Path) -> Option<String> {
    let feed_re =
        Regex::new(r#"endpoint\\?"\s*:\s*\\?"(https://[^"\\]+/nuget/v3/index\.json)\\?""#).ok()?;

    let dockerfiles = find_files(root, "**/modules/*/Dockerfile*");
    for dockerfile in dockerfiles.iter().take(10) {
        let Ok(content) = fs::read_to_string(dockerfile) else {
            continue;
        };
        if let Some(caps) = feed_re.captures(&content) {
            return Some(caps[1].to_string());
        }
    }

    None
}

/// Detect the project structure under `root`.
///
/// A saved configuration is preferred unless `force_detect` is set. The
/// scan itself cannot fail: missing or unreadable files simply leave their
/// fields unset.
pub fn detect_project_structure(root: &Path, force_detect: bool) -> ProjectConfig {
    if !force_detect {
        if let Some(saved) = ProjectConfig::load_saved(root) {
            return saved;
        }
    }

    let modules_base_path = find_modules_base_path(root);
    let contracts_project = find_contracts_project(root);
    let manifests_found = find_deployment_manifests(root);

    let contracts_path = contracts_project.as_ref().map(|(path, _)| path.clone());
    let project_namespace = extract_namespace(root, contracts_path.as_deref());
    let container_registry = extract_container_registry(root, &manifests_found);
    let nuget_feed_url = extract_nuget_feed_url(root);

    let manifests_base_path = manifests_found.first().map(|first| {
        first
            .rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .unwrap_or_default()
    });

    ProjectConfig {
        config_source: ConfigSource::Detected,
        modules_base_path,
        contracts_project_name: contracts_project.map(|(_, name)| name),
        contracts_project_path: contracts_path,
        has_contracts_project: false,
        manifests_found,
        manifests_base_path,
        project_namespace,
        has_nuget_feed: nuget_feed_url.is_some(),
        container_registry,
        nuget_feed_url,
        saved_at: None,
    }
    .with_derived_flags()
}

impl ProjectConfig {
    fn with_derived_flags(mut self) -> Self {
        self.has_contracts_project = self.contracts_project_path.is_some();
        self.has_nuget_feed = self.nuget_feed_url.is_some();
        self
    }
}
