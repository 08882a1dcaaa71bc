//! Saved project configuration for edgecraft.
//!
//! Detection results can be persisted to `.edgecraft/config.json` so later
//! runs skip the filesystem scan. The record is flat: every field is either a
//! string, a list of paths, or a derived boolean. It is created once per
//! `detect --save` and overwritten wholesale on the next one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::paths::CONFIG_FILE;

/// Where a configuration record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Loaded from `.edgecraft/config.json`
    Saved,
    /// Produced by a fresh filesystem scan
    Detected,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Saved => write!(f, "saved"),
            ConfigSource::Detected => write!(f, "detected"),
        }
    }
}

/// The flat configuration record for an IoT Edge project.
///
/// All optional fields stay `None` when detection finds nothing; callers are
/// expected to fill the gaps from flags or interactive prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Provenance of this record
    pub config_source: ConfigSource,
    /// Directory holding module subdirectories, relative to the project root
    pub modules_base_path: Option<String>,
    /// Directory of the shared contracts project, relative to the root
    pub contracts_project_path: Option<String>,
    /// Name of the contracts project (csproj stem)
    pub contracts_project_name: Option<String>,
    /// All deployment manifests found, relative paths sorted
    #[serde(default)]
    pub manifests_found: Vec<String>,
    /// Directory of the first manifest found
    pub manifests_base_path: Option<String>,
    /// Base namespace shared by module projects (the part before `.Modules`)
    pub project_namespace: Option<String>,
    /// Container registry host, e.g. `myregistry.azurecr.io`
    pub container_registry: Option<String>,
    /// Private NuGet feed URL, if the Dockerfiles reference one
    pub nuget_feed_url: Option<String>,
    pub has_contracts_project: bool,
    pub has_nuget_feed: bool,
    /// When this record was saved (only set on persisted records)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl ProjectConfig {
    /// An empty record, as produced by detection over a directory with no
    /// recognizable structure.
    pub fn empty(source: ConfigSource) -> Self {
        Self {
            config_source: source,
            modules_base_path: None,
            contracts_project_path: None,
            contracts_project_name: None,
            manifests_found: Vec::new(),
            manifests_base_path: None,
            project_namespace: None,
            container_registry: None,
            nuget_feed_url: None,
            has_contracts_project: false,
            has_nuget_feed: false,
            saved_at: None,
        }
    }

    /// Load the saved configuration from `<root>/.edgecraft/config.json`.
    ///
    /// Returns `None` when no file exists or it cannot be parsed; a
    /// stale or corrupt cache is treated as absent, not as an error.
    pub fn load_saved(root: &Path) -> Option<Self> {
        let path = root.join(CONFIG_FILE);
        let content = fs::read_to_string(&path).ok()?;
        let mut config: ProjectConfig = serde_json::from_str(&content).ok()?;
        config.config_source = ConfigSource::Saved;
        Some(config)
    }

    /// Persist this record to `<root>/.edgecraft/config.json`.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut record = self.clone();
        record.saved_at = Some(crate::utc_now_iso());

        let content = serde_json::to_string_pretty(&record)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_saved_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectConfig::load_saved(dir.path()).is_none());
    }

    #[test]
    fn test_load_saved_corrupt_returns_none() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(CONFIG_FILE);
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "{ not json").unwrap();
        assert!(ProjectConfig::load_saved(dir.path()).is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();

        let mut config = ProjectConfig::empty(ConfigSource::Detected);
        config.modules_base_path = Some("src/IoTEdgeModules/modules".to_string());
        config.container_registry = Some("myregistry.azurecr.io".to_string());
        config.save(dir.path()).unwrap();

        let loaded = ProjectConfig::load_saved(dir.path()).expect("Should load");
        assert_eq!(loaded.config_source, ConfigSource::Saved);
        assert_eq!(
            loaded.modules_base_path.as_deref(),
            Some("src/IoTEdgeModules/modules")
        );
        assert_eq!(
            loaded.container_registry.as_deref(),
            Some("myregistry.azurecr.io")
        );
        assert!(loaded.saved_at.is_some());
    }
}
