//! # Edgecraft - IoT Edge module scaffolding
//!
//! Edgecraft scaffolds Azure IoT Edge modules into existing .NET solutions.
//! It detects the conventions a repository already follows (module layout,
//! project namespace, container registry, NuGet feed), renders module file
//! templates with those values, and wires the new module into deployment
//! manifests and solution files.
//!
//! ## Core Concepts
//!
//! - **Detection**: one pass over the project tree, producing a flat
//!   configuration record. Missing values stay unset; detection never fails.
//! - **Templates**: markdown files with YAML frontmatter declaring an output
//!   path and variables, and a body holding the file content with
//!   `{{variable}}` placeholders.
//! - **Manifests**: `*.deployment.manifest.json` files describing deployed
//!   modules. Edgecraft patches them by key insertion, never restructuring.
//!
//! ## Modules
//!
//! - [`detect`] - Project-structure detection
//! - [`config`] - Saved project configuration (`.edgecraft/config.json`)
//! - [`scaffold`] - Module templates and placeholder substitution
//! - [`manifest`] - Deployment manifest scanning and patching
//! - [`solution`] - Solution file (`.slnx`/`.sln`) discovery and updates
//! - [`tidy`] - Trailing-newline cleanup for .NET sources
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use edgecraft::detect;
//!
//! let config = detect::detect_project_structure(Path::new("."), false);
//! if let Some(registry) = &config.container_registry {
//!     println!("registry: {}", registry);
//! }
//! ```

pub mod config;
pub mod detect;
pub mod manifest;
pub mod scaffold;
pub mod solution;
pub mod tidy;

/// Default path constants for the edgecraft directory structure.
pub mod paths {
    /// Saved project configuration: `.edgecraft/config.json`
    pub const CONFIG_FILE: &str = ".edgecraft/config.json";
    /// Project-local template overrides: `.edgecraft/templates`
    pub const TEMPLATES_DIR: &str = ".edgecraft/templates";
    /// Filename suffix identifying deployment manifests
    pub const MANIFEST_SUFFIX: &str = ".deployment.manifest.json";
}

/// Generate a UTC timestamp in ISO 8601 format: `YYYY-MM-DDTHH:MM:SSZ`
///
/// Uses `chrono::Utc::now()` so the timestamp is truly UTC, not local time
/// with a misleading `Z` suffix.
pub fn utc_now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
