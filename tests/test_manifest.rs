//! Manifest patching and scanning against files on disk.

use serde_json::Value;
use tempfile::TempDir;

use edgecraft::detect::find_deployment_manifests;
use edgecraft::manifest;

mod common;

#[test]
fn test_patch_adds_exactly_one_module_and_one_route() {
    let dir = TempDir::new().unwrap();
    common::write(
        dir.path(),
        "config/base.deployment.manifest.json",
        &common::sample_manifest(),
    );
    let path = dir.path().join("config/base.deployment.manifest.json");

    let before: Value = serde_json::from_str(&common::sample_manifest()).unwrap();
    let outcome = manifest::update_file(&path, "heartbeat", true).unwrap();
    let after = manifest::load(&path).unwrap();

    assert_eq!(outcome.modules_after, outcome.modules_before + 1);
    assert_eq!(
        manifest::route_count(&after),
        manifest::route_count(&before) + 1
    );

    // Every pre-existing key survived with its original value
    let agent_before = before["modulesContent"]["$edgeAgent"].as_object().unwrap();
    let agent_after = after["modulesContent"]["$edgeAgent"].as_object().unwrap();
    for (key, value) in agent_before {
        assert_eq!(agent_after.get(key), Some(value), "lost or changed: {}", key);
    }
    let hub_before = before["modulesContent"]["$edgeHub"].as_object().unwrap();
    let hub_after = after["modulesContent"]["$edgeHub"].as_object().unwrap();
    for (key, value) in hub_before {
        assert_eq!(hub_after.get(key), Some(value), "lost or changed: {}", key);
    }

    // And exactly one new key appeared on each side
    assert_eq!(agent_after.len(), agent_before.len() + 1);
    assert_eq!(hub_after.len(), hub_before.len() + 1);
}

#[test]
fn test_patch_same_module_twice_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    common::write(
        dir.path(),
        "config/base.deployment.manifest.json",
        &common::sample_manifest(),
    );
    let path = dir.path().join("config/base.deployment.manifest.json");

    manifest::update_file(&path, "heartbeat", true).unwrap();
    let snapshot = std::fs::read_to_string(&path).unwrap();

    let err = manifest::update_file(&path, "heartbeat", true).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), snapshot);
}

#[test]
fn test_scan_finds_all_manifests_sorted() {
    let dir = TempDir::new().unwrap();
    common::write(
        dir.path(),
        "config/prod.deployment.manifest.json",
        &common::sample_manifest(),
    );
    common::write(
        dir.path(),
        "config/dev.deployment.manifest.json",
        &common::sample_manifest(),
    );
    // Fixture manifests under test directories are invisible
    common::write(
        dir.path(),
        "tests/fixtures/fake.deployment.manifest.json",
        &common::sample_manifest(),
    );

    let found = find_deployment_manifests(dir.path());
    assert_eq!(
        found,
        vec![
            "config/dev.deployment.manifest.json".to_string(),
            "config/prod.deployment.manifest.json".to_string(),
        ]
    );
}

#[test]
fn test_summarize_reports_modules_and_routes() {
    let dir = TempDir::new().unwrap();
    common::write(
        dir.path(),
        "config/prod.deployment.manifest.json",
        &common::sample_manifest(),
    );

    let summary = manifest::summarize(
        dir.path(),
        &dir.path().join("config/prod.deployment.manifest.json"),
    )
    .unwrap();

    assert_eq!(summary.path, "config/prod.deployment.manifest.json");
    assert_eq!(summary.basename, "prod");
    assert_eq!(summary.modules_count, 1);
    assert_eq!(summary.module_names, vec!["telemetry".to_string()]);
    assert_eq!(summary.routes_count, 1);
}

#[test]
fn test_summarize_malformed_manifest_is_an_error_not_a_panic() {
    let dir = TempDir::new().unwrap();
    common::write(
        dir.path(),
        "config/bad.deployment.manifest.json",
        "{ truncated",
    );

    let err = manifest::summarize(
        dir.path(),
        &dir.path().join("config/bad.deployment.manifest.json"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid JSON"));
}
