//! End-to-end detection over a realistic project tree.

use tempfile::TempDir;

use edgecraft::config::{ConfigSource, ProjectConfig};
use edgecraft::detect::detect_project_structure;

mod common;

#[test]
fn test_detect_full_project() {
    let dir = TempDir::new().unwrap();
    common::sample_project(dir.path());

    let config = detect_project_structure(dir.path(), true);

    assert_eq!(config.config_source, ConfigSource::Detected);
    assert_eq!(
        config.modules_base_path.as_deref(),
        Some("src/IoTEdgeModules/modules")
    );
    assert!(config.has_contracts_project);
    assert_eq!(
        config.contracts_project_name.as_deref(),
        Some("Contoso.Edge.Modules.Contracts")
    );
    assert_eq!(config.project_namespace.as_deref(), Some("Contoso.Edge"));
    assert_eq!(
        config.container_registry.as_deref(),
        Some("contoso.azurecr.io")
    );
    assert_eq!(
        config.manifests_found,
        vec!["config/base.deployment.manifest.json".to_string()]
    );
    assert_eq!(config.manifests_base_path.as_deref(), Some("config"));
    assert!(!config.has_nuget_feed);
}

#[test]
fn test_detect_never_fails_on_garbage() {
    let dir = TempDir::new().unwrap();
    common::write(dir.path(), "modules/broken/Program.cs", "not c# at all");
    common::write(
        dir.path(),
        "config/bad.deployment.manifest.json",
        "{ this is not json",
    );
    // Binary content where text is expected
    std::fs::write(dir.path().join("modules/broken/module.json"), [0xff, 0xfe, 0x00]).unwrap();

    let config = detect_project_structure(dir.path(), true);

    // The broken files are found but yield no extracted values
    assert_eq!(config.modules_base_path.as_deref(), Some("modules"));
    assert_eq!(config.manifests_found.len(), 1);
    assert!(config.project_namespace.is_none());
    assert!(config.container_registry.is_none());
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    common::sample_project(dir.path());

    let detected = detect_project_structure(dir.path(), true);
    detected.save(dir.path()).unwrap();
    assert!(dir.path().join(".edgecraft/config.json").exists());

    let reloaded = detect_project_structure(dir.path(), false);
    assert_eq!(reloaded.config_source, ConfigSource::Saved);
    assert_eq!(reloaded.modules_base_path, detected.modules_base_path);
    assert_eq!(reloaded.project_namespace, detected.project_namespace);
    assert_eq!(reloaded.container_registry, detected.container_registry);
    assert!(reloaded.saved_at.is_some());
}

#[test]
fn test_corrupt_saved_config_falls_back_to_detection() {
    let dir = TempDir::new().unwrap();
    common::sample_project(dir.path());
    common::write(dir.path(), ".edgecraft/config.json", "{ corrupt");

    assert!(ProjectConfig::load_saved(dir.path()).is_none());

    let config = detect_project_structure(dir.path(), false);
    assert_eq!(config.config_source, ConfigSource::Detected);
    assert_eq!(config.project_namespace.as_deref(), Some("Contoso.Edge"));
}
