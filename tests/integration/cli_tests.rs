//! Runs the `sublink` binary end to end

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_config(dir: &Path, db_path: &Path) -> std::path::PathBuf {
    let config_path = dir.join("sublink.toml");
    let toml = format!(
        r#"
[source]
api-base = "http://127.0.0.1:9"
user-agent = "sublink-test/0.1"

[auth]
access-token = "tok"

[filter]
allowed-domains = ['good\.com']

[output]
database-path = "{}"
"#,
        db_path.display()
    );
    fs::write(&config_path, toml).unwrap();
    config_path
}

fn sublink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sublink"))
        .args(args)
        .arg("-q")
        .output()
        .unwrap()
}

#[test]
fn test_invalid_cutoff_leaves_no_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("links.db");
    let config_path = write_config(dir.path(), &db_path);

    let output = sublink(&[
        config_path.to_str().unwrap(),
        "--source",
        "rust",
        "--cutoff",
        "not-a-date",
    ]);

    assert!(!output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"]["reason"], "InvalidRequest");
    assert!(!db_path.exists());
}

#[test]
fn test_invalid_source_name_leaves_no_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("links.db");
    let config_path = write_config(dir.path(), &db_path);

    let output = sublink(&[
        config_path.to_str().unwrap(),
        "--source",
        "no/slashes",
        "--cutoff",
        "2024-01-01",
    ]);

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"]["reason"], "InvalidRequest");
    assert!(!db_path.exists());
}

#[test]
fn test_init_db_creates_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("links.db");
    let config_path = write_config(dir.path(), &db_path);

    let output = sublink(&[config_path.to_str().unwrap(), "--init-db"]);

    assert!(output.status.success());
    assert!(db_path.exists());
}
