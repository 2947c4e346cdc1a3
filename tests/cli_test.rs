// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Command-line tool tests

#![cfg(feature = "cli")]

use std::path::Path;
use std::process::{Command, Output};

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_template-archival"))
        .args(args)
        .current_dir(dir)
        .env_remove("TEMPLATE_ARCHIVAL_CONFIG")
        .output()
        .expect("failed to run template-archival")
}

#[test]
fn test_directory_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("KeyRecoveryUser.toml");
    std::fs::write(
        &record,
        r#"
distinguished_name = "CN=KeyRecoveryUser"

[attributes]
"msPKI-Private-Key-Flag" = 1
"msPKI-RA-Application-Policies" = "msPKI-Symmetric-Algorithm`PZPWSTR`3DES`msPKI-Symmetric-Key-Length`DWORD`168`"
"#,
    )
    .unwrap();

    let output = run(&["directory", record.to_str().unwrap()], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Key Archival Settings]"));
    assert!(stdout.contains("Key archival required: true"));
    assert!(stdout.contains("Symmetric algorithm: 3des"));
    assert!(stdout.contains("Symmetric key length: 168"));
}

#[test]
fn test_policy_json_report_signed() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.json");
    std::fs::write(
        &template,
        r#"{"properties": {"PrivateKeyFlags": {"Int32": 1}, "SymmetricKeyLength": {"Int32": 256}}}"#,
    )
    .unwrap();

    let output = run(
        &[
            "policy",
            "--representation",
            "signed",
            "--format",
            "json",
            template.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["archival_required"], true);
    assert_eq!(json["key_length"], 256);
    assert!(json["encryption_algorithm"].is_null());
}

#[test]
fn test_policy_representation_mismatch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.toml");
    std::fs::write(&template, "[properties]\nPrivateKeyFlags = { UInt32 = 1 }\n").unwrap();

    let output = run(
        &["policy", "-r", "signed", template.to_str().unwrap()],
        dir.path(),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PrivateKeyFlags"));
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("template-archival.toml"),
        "[output]\nformat = \"json\"\n",
    )
    .unwrap();

    let output = run(&["parse", "msPKI-Symmetric-Key-Length`DWORD`128`"], dir.path());
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["symmetric_key_length"], 128);
    assert_eq!(json["fields"][0]["kind"], "DWORD");
}

#[test]
fn test_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["directory", "does-not-exist.toml"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn test_malformed_export_reported() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("broken.toml");
    std::fs::write(&record, "[attributes\n").unwrap();

    let output = run(&["directory", record.to_str().unwrap()], dir.path());
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid template export"));
    assert!(!stderr.contains("Configuration error"));
}
