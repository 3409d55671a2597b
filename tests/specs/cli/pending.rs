// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for `redial pending` and `redial clear`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated home with a known store location.
struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        Env {
            temp: TempDir::new().unwrap(),
        }
    }

    fn store(&self) -> PathBuf {
        self.temp.path().join("pending.jsonl")
    }

    fn redial(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("redial");
        cmd.env("HOME", self.temp.path())
            .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env("XDG_STATE_HOME", self.temp.path().join("state"))
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.store());
        cmd
    }

    fn write_store(&self, lines: &[&str]) {
        std::fs::write(self.store(), format!("{}\n", lines.join("\n"))).unwrap();
    }
}

const POST_LINE: &str =
    r#"{"method":"POST","url":"http://api.test/items","body":{"name":"widget"}}"#;
const DELETE_LINE: &str = r#"{"method":"DELETE","url":"http://api.test/items/4"}"#;

#[test]
fn pending_with_no_store_reports_none() {
    let env = Env::new();
    env.redial()
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending requests"));
}

#[test]
fn pending_lists_saved_requests_in_order() {
    let env = Env::new();
    env.write_store(&[POST_LINE, DELETE_LINE]);

    let output = env.redial().arg("pending").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"POST http://api.test/items {"name":"widget"}"#,
            "DELETE http://api.test/items/4",
        ]
    );
}

#[test]
fn pending_json_output_is_one_object_per_line() {
    let env = Env::new();
    env.write_store(&[POST_LINE, DELETE_LINE]);

    let output = env
        .redial()
        .args(["pending", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let methods: Vec<String> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["method"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(methods, vec!["POST", "DELETE"]);
}

#[test]
fn corrupt_store_reports_line() {
    let env = Env::new();
    env.write_store(&[POST_LINE, "{not json"]);

    env.redial()
        .arg("pending")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn clear_empties_store() {
    let env = Env::new();
    env.write_store(&[POST_LINE, DELETE_LINE]);

    env.redial()
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 pending request(s)"));
    env.redial()
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending requests"));
}

#[test]
fn missing_explicit_config_fails() {
    let env = Env::new();
    env.redial()
        .args(["--config"])
        .arg(env.temp.path().join("absent.toml"))
        .arg("pending")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn invalid_config_value_fails() {
    let env = Env::new();
    let config = env.temp.path().join("redial.toml");
    std::fs::write(&config, "check_interval_ms = 0\n").unwrap();

    env.redial()
        .arg("--config")
        .arg(&config)
        .arg("pending")
        .assert()
        .failure()
        .stderr(predicate::str::contains("check_interval_ms"));
}
