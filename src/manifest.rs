//! Deployment manifest scanning and patching.
//!
//! IoT Edge deployment manifests store module definitions under
//! `modulesContent.$edgeAgent` using dotted keys
//! (`properties.desired.modules.<name>`) and routes under
//! `modulesContent.$edgeHub` (`properties.desired.routes.<name>`). Edgecraft
//! works on the parsed JSON tree by key insertion only; existing keys are
//! never touched.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Dotted-key prefix for module definitions under `$edgeAgent`
const MODULES_PREFIX: &str = "properties.desired.modules.";
/// Dotted-key prefix for routes under `$edgeHub`
const ROUTES_PREFIX: &str = "properties.desired.routes.";

/// Metadata extracted from one deployment manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    /// Relative path to the manifest
    pub path: String,
    /// File name
    pub name: String,
    /// File name with the `.deployment.manifest.json` suffix stripped
    pub basename: String,
    pub modules_count: usize,
    pub module_names: Vec<String>,
    pub routes_count: usize,
}

/// Result of patching a manifest with a new module.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    pub module_name: String,
    pub startup_order: u64,
    pub modules_before: usize,
    pub modules_after: usize,
    pub route_added: String,
}

/// Read and parse a manifest file.
pub fn load(path: &Path) -> Result<Value> {
    if !path.exists() {
        anyhow::bail!("Manifest file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| {
        format!(
            "Invalid JSON in {} - fix the manifest manually and retry",
            path.display()
        )
    })
}

fn edge_agent(manifest: &Value) -> Option<&serde_json::Map<String, Value>> {
    manifest
        .get("modulesContent")?
        .get("$edgeAgent")?
        .as_object()
}

fn edge_hub(manifest: &Value) -> Option<&serde_json::Map<String, Value>> {
    manifest.get("modulesContent")?.get("$edgeHub")?.as_object()
}

/// Names of the modules defined in a manifest.
pub fn module_names(manifest: &Value) -> Vec<String> {
    edge_agent(manifest)
        .map(|agent| {
            agent
                .keys()
                .filter_map(|key| key.strip_prefix(MODULES_PREFIX))
                .map(|name| name.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Number of routes defined in a manifest.
pub fn route_count(manifest: &Value) -> usize {
    edge_hub(manifest)
        .map(|hub| hub.keys().filter(|k| k.starts_with(ROUTES_PREFIX)).count())
        .unwrap_or(0)
}

/// True if the manifest already defines a module with this name.
pub fn module_exists(manifest: &Value, module_name: &str) -> bool {
    edge_agent(manifest)
        .map(|agent| agent.contains_key(&format!("{}{}", MODULES_PREFIX, module_name)))
        .unwrap_or(false)
}

/// Highest startupOrder among existing module definitions, or 0 when there
/// are none.
pub fn highest_startup_order(manifest: &Value) -> u64 {
    edge_agent(manifest)
        .map(|agent| {
            agent
                .iter()
                .filter(|(key, _)| key.starts_with(MODULES_PREFIX))
                .filter_map(|(_, module)| module.get("startupOrder"))
                .filter_map(Value::as_u64)
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

/// Build a standard module definition for `$edgeAgent`.
///
/// The image reference uses the `${MODULES.<name>}` placeholder resolved at
/// deploy time by the IoT Edge tooling, so no registry host appears here.
fn module_definition(module_name: &str, startup_order: u64, with_volume: bool) -> Value {
    let mut create_options = json!({
        "HostConfig": {
            "LogConfig": {
                "Type": "json-file",
                "Config": {
                    "max-size": "10m",
                    "max-file": "10"
                }
            }
        }
    });

    if with_volume {
        create_options["HostConfig"]["Mounts"] = json!([
            {
                "Type": "volume",
                "Target": "/app/data/",
                "Source": module_name
            }
        ]);
    }

    json!({
        "version": "1.0",
        "type": "docker",
        "status": "running",
        "restartPolicy": "always",
        "startupOrder": startup_order,
        "settings": {
            "image": format!("${{MODULES.{}}}", module_name),
            "createOptions": create_options
        }
    })
}

/// Build the default upstream route for a module.
fn default_route(module_name: &str) -> Value {
    json!({
        "route": format!(
            "FROM /messages/modules/{}/outputs/* INTO $upstream",
            module_name
        ),
        "priority": 0,
        "timeToLiveSecs": 86400
    })
}

/// Get (or create) the named key as a mutable object map, failing when the
/// existing value has a different JSON type.
fn object_entry<'a>(
    parent: &'a mut serde_json::Map<String, Value>,
    key: &str,
) -> Result<&'a mut serde_json::Map<String, Value>> {
    parent
        .entry(key)
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "'{}' is not a JSON object - fix the manifest manually and retry",
                key
            )
        })
}

/// Add a module definition and its default route to a parsed manifest.
///
/// Inserts exactly one key under `$edgeAgent` and one under `$edgeHub`,
/// creating the containers when absent. The new module's startupOrder is one
/// greater than the current maximum, so deliberately ordered modules keep
/// their head start. Fails if the module already exists or the manifest does
/// not have the expected object shape.
pub fn add_module(manifest: &mut Value, module_name: &str, with_volume: bool) -> Result<PatchOutcome> {
    if module_exists(manifest, module_name) {
        anyhow::bail!("Module '{}' already exists in manifest", module_name);
    }

    let modules_before = module_names(manifest).len();
    let startup_order = highest_startup_order(manifest) + 1;

    let root = manifest.as_object_mut().ok_or_else(|| {
        anyhow::anyhow!("Manifest root is not a JSON object - fix the manifest manually and retry")
    })?;
    let modules_content = object_entry(root, "modulesContent")?;

    let module_key = format!("{}{}", MODULES_PREFIX, module_name);
    let route_name = format!("{}ToIoTHub", module_name);
    let route_key = format!("{}{}", ROUTES_PREFIX, route_name);

    // Validate both containers before inserting anything, so a malformed
    // $edgeHub cannot leave a half-patched $edgeAgent behind.
    object_entry(modules_content, "$edgeAgent")?;
    object_entry(modules_content, "$edgeHub")?;

    object_entry(modules_content, "$edgeAgent")?.insert(
        module_key,
        module_definition(module_name, startup_order, with_volume),
    );
    object_entry(modules_content, "$edgeHub")?.insert(route_key, default_route(module_name));

    Ok(PatchOutcome {
        module_name: module_name.to_string(),
        startup_order,
        modules_before,
        modules_after: module_names(manifest).len(),
        route_added: route_name,
    })
}

/// Patch a manifest file on disk with a new module and route.
pub fn update_file(path: &Path, module_name: &str, with_volume: bool) -> Result<PatchOutcome> {
    let mut manifest = load(path)?;
    let outcome = add_module(&mut manifest, module_name, with_volume)
        .with_context(|| format!("Cannot update manifest {}", path.display()))?;

    let content = serde_json::to_string_pretty(&manifest)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;

    Ok(outcome)
}

/// Summarize one manifest file. Returns an error for unreadable or
/// malformed manifests; `scan` downgrades that to an invalid entry.
pub fn summarize(root: &Path, path: &Path) -> Result<ManifestSummary> {
    let manifest = load(path)?;
    let names = module_names(&manifest);

    let relative = path.strip_prefix(root).unwrap_or(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let basename = name
        .strip_suffix(crate::paths::MANIFEST_SUFFIX)
        .unwrap_or(&name)
        .to_string();

    Ok(ManifestSummary {
        path: relative.to_string_lossy().replace('\\', "/"),
        name,
        basename,
        modules_count: names.len(),
        module_names: names,
        routes_count: route_count(&manifest),
    })
}
