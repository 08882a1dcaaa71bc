//! Common test helpers for integration tests

use std::fs;
use std::path::Path;

/// Write a file under `root`, creating parent directories.
pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A deployment manifest with one module and one route, as it would exist in
/// a real project.
pub fn sample_manifest() -> String {
    serde_json::to_string_pretty(&serde_json::json!({
        "modulesContent": {
            "$edgeAgent": {
                "properties.desired.schemaVersion": "1.1",
                "properties.desired.runtime.settings.registryCredentials.acr": {
                    "address": "contoso.azurecr.io",
                    "username": "$CONTAINER_REGISTRY_USERNAME",
                    "password": "$CONTAINER_REGISTRY_PASSWORD"
                },
                "properties.desired.modules.telemetry": {
                    "version": "1.0",
                    "type": "docker",
                    "status": "running",
                    "restartPolicy": "always",
                    "startupOrder": 2,
                    "settings": {
                        "image": "${MODULES.telemetry}"
                    }
                }
            },
            "$edgeHub": {
                "properties.desired.schemaVersion": "1.1",
                "properties.desired.routes.telemetryToIoTHub": {
                    "route": "FROM /messages/modules/telemetry/outputs/* INTO $upstream",
                    "priority": 0,
                    "timeToLiveSecs": 86400
                }
            }
        }
    }))
    .unwrap()
}

/// Lay out a realistic IoT Edge project tree: one existing module, a
/// contracts project, a deployment manifest and a solution file.
pub fn sample_project(root: &Path) {
    write(
        root,
        "src/IoTEdgeModules/modules/telemetry/Program.cs",
        "namespace Contoso.Edge.Modules.Telemetry;\n\nclass Program { }\n",
    );
    write(
        root,
        "src/IoTEdgeModules/modules/telemetry/module.json",
        r#"{"image": {"repository": "contoso.azurecr.io/telemetry"}}"#,
    );
    write(
        root,
        "src/Contoso.Edge.Modules.Contracts/Contoso.Edge.Modules.Contracts.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <RootNamespace>Contoso.Edge.Modules.Contracts</RootNamespace>\n  </PropertyGroup>\n</Project>\n",
    );
    write(
        root,
        "config/base.deployment.manifest.json",
        &sample_manifest(),
    );
    write(
        root,
        "Edge.slnx",
        "<Solution>\n  <Folder Name=\"/modules/\">\n    <Project Path=\"src/IoTEdgeModules/modules/telemetry/Telemetry.csproj\" />\n  </Folder>\n</Solution>\n",
    );
}
