//! End-to-end runs of the `dsync` binary against a temporary store.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::{TempDir, tempdir};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self::with_settings("")
    }

    fn with_settings(settings: &str) -> Self {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.toml"), settings).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, owner: &str, args: &[&str]) -> Output {
        let store = self.path().join("store");
        let config = self.path().join("settings.toml");
        Command::new(env!("CARGO_BIN_EXE_dsync"))
            .args(args)
            .arg("--owner")
            .arg(owner)
            .arg("--store")
            .arg(&store)
            .arg("--config")
            .arg(&config)
            .arg("--json")
            .arg("--color")
            .arg("never")
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }

    fn json(&self, owner: &str, args: &[&str]) -> Value {
        let output = self.run(owner, args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn failure(&self, owner: &str, args: &[&str]) -> Value {
        let output = self.run(owner, args);
        assert_eq!(output.status.code(), Some(1), "{args:?} should fail");
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn upload_list_show_summary_delete() {
    let ws = Workspace::new();
    let csv = ws.path().join("people.csv");
    std::fs::write(&csv, "name,age\nAda,30\nLin,25\nMo,41\n").unwrap();

    let uploaded = ws.json("ada", &["upload", csv.to_str().unwrap()]);
    assert_eq!(uploaded["rowCount"], 3);
    assert_eq!(uploaded["headers"], serde_json::json!(["name", "age"]));
    let id = uploaded["datasetId"].as_str().unwrap().to_string();

    let listed = ws.json("ada", &["list"]);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["fileName"], "people.csv");

    let shown = ws.json("ada", &["show", &id, "--rows", "2"]);
    assert_eq!(shown["rowCount"], 3);
    assert_eq!(shown["rows"].as_array().unwrap().len(), 2);
    assert_eq!(shown["rows"][0]["name"], "Ada");
    assert_eq!(shown["rows"][0]["age"], 30.0);

    let summary = ws.json("ada", &["summary", &id]);
    assert_eq!(summary["rowCount"], 3);
    assert_eq!(summary["columns"][1]["kind"], "number");

    let deleted = ws.json("ada", &["delete", &id]);
    assert_eq!(deleted["deleted"], id.as_str());
    assert!(ws.json("ada", &["list"]).as_array().unwrap().is_empty());
}

#[test]
fn other_owners_see_not_found() {
    let ws = Workspace::new();
    let csv = ws.path().join("t.csv");
    std::fs::write(&csv, "a\n1\n").unwrap();
    let uploaded = ws.json("ada", &["upload", csv.to_str().unwrap()]);
    let id = uploaded["datasetId"].as_str().unwrap().to_string();

    assert!(ws.json("lin", &["list"]).as_array().unwrap().is_empty());
    for command in ["show", "summary", "delete", "resync"] {
        let body = ws.failure("lin", &[command, &id]);
        assert_eq!(body["error"]["kind"], "not_found", "{command}");
    }

    let missing = ws.failure("ada", &["show", "not-an-id"]);
    assert_eq!(missing["error"]["kind"], "not_found");
}

#[test]
fn rejected_uploads_report_error_kind() {
    let ws = Workspace::new();
    let pdf = ws.path().join("report.pdf");
    std::fs::write(&pdf, "%PDF-1.7").unwrap();
    let header_only = ws.path().join("empty.csv");
    std::fs::write(&header_only, "name,age\n").unwrap();

    let body = ws.failure("ada", &["upload", pdf.to_str().unwrap()]);
    assert_eq!(body["error"]["kind"], "unsupported_format");

    let body = ws.failure("ada", &["upload", header_only.to_str().unwrap()]);
    assert_eq!(body["error"]["kind"], "empty_dataset");

    assert!(ws.json("ada", &["list"]).as_array().unwrap().is_empty());
}

#[test]
fn upload_over_configured_limit_is_too_large() {
    let ws = Workspace::with_settings("[hub]\nmax_upload_bytes = 16\n");
    let csv = ws.path().join("big.csv");
    std::fs::write(&csv, "name\nAda Lovelace\nGrace Hopper\n").unwrap();

    let body = ws.failure("ada", &["upload", csv.to_str().unwrap()]);
    assert_eq!(body["error"]["kind"], "file_too_large");
    assert!(ws.json("ada", &["list"]).as_array().unwrap().is_empty());
}

#[test]
fn resync_of_upload_is_invalid_operation() {
    let ws = Workspace::new();
    let csv = ws.path().join("t.csv");
    std::fs::write(&csv, "a\n1\n").unwrap();
    let uploaded = ws.json("ada", &["upload", csv.to_str().unwrap()]);
    let id = uploaded["datasetId"].as_str().unwrap().to_string();

    let body = ws.failure("ada", &["resync", &id]);
    assert_eq!(body["error"]["kind"], "invalid_operation");
}

#[test]
fn invalid_sheet_url_is_rejected_offline() {
    let ws = Workspace::new();
    let body = ws.failure("ada", &["import", "https://example.com/not-a-sheet"]);
    assert_eq!(body["error"]["kind"], "invalid_sheet_url");
}
