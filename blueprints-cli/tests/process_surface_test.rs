//! Runs the built binary and checks exit codes and output channels

use std::process::Command;
use tempfile::TempDir;

fn blueprints() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_blueprints"));
    for var in ["TAG", "BLUEPRINTS_REPO", "GITHUB_TOKEN", "REGISTRY_PATH", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_sync_without_tag_fails_before_network() {
    let temp_dir = TempDir::new().unwrap();
    let registry = temp_dir.path().join("registry.json");

    let output = blueprints()
        .args(["sync", "--repo", "acme/blueprints", "--api-url", "http://127.0.0.1:9"])
        .arg("--registry")
        .arg(&registry)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing TAG"), "stderr: {stderr}");
    assert!(!registry.exists());
}

#[test]
fn test_sync_reads_inputs_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    let registry = temp_dir.path().join("registry.json");

    // Valid config, unreachable API: the failure must be a fetch error, not a config error
    let output = blueprints()
        .env("TAG", "v1.0.0")
        .env("BLUEPRINTS_REPO", "acme/blueprints")
        .env("REGISTRY_PATH", &registry)
        .args(["sync", "--api-url", "http://127.0.0.1:9", "--timeout", "5"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Configuration error"), "stderr: {stderr}");
    assert!(stderr.contains("request failed"), "stderr: {stderr}");
    assert!(!registry.exists());
}

#[test]
fn test_list_prints_registry() {
    let temp_dir = TempDir::new().unwrap();
    let registry = temp_dir.path().join("registry.json");
    std::fs::write(
        &registry,
        r#"{"blueprints": [{"name": "api", "version": "1.0.0", "repo": "github.com/acme/blueprints",
            "path": "blueprints/api", "download_url": "https://dl/api.zip",
            "description": "REST API", "tags": ["go"]}]}"#,
    )
    .unwrap();

    let output = blueprints()
        .arg("list")
        .arg("--json")
        .arg("--registry")
        .arg(&registry)
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["name"], "api");
}

#[test]
fn test_list_malformed_registry_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let registry = temp_dir.path().join("registry.json");
    std::fs::write(&registry, "not json").unwrap();

    let output = blueprints()
        .arg("list")
        .arg("--registry")
        .arg(&registry)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse registry"), "stderr: {stderr}");
}
