// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the request commands and `redial replay`.
//!
//! A wiremock server stands in for the remote API; an unbound local port
//! stands in for an unreachable one.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

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

    fn stored_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.store())
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(String::from)
            .collect()
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
}

/// A base URL nothing is listening on.
fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

#[test]
fn get_prints_response_body() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/greeting"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello there"))
            .expect(1)
            .mount(&server),
    );

    let env = Env::new();
    env.redial()
        .args(["get", &format!("{}/greeting", server.uri())])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello there"));
    assert!(env.stored_lines().is_empty());
}

#[test]
fn post_sends_json_body() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(body_json(serde_json::json!({"name": "widget"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .expect(1)
            .mount(&server),
    );

    let env = Env::new();
    env.redial()
        .args([
            "post",
            &format!("{}/items", server.uri()),
            "--body",
            r#"{"name":"widget"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
}

#[test]
fn unreachable_get_is_dropped() {
    let env = Env::new();
    env.redial()
        .args(["get", &format!("{}/items", unreachable_base()), "--wait", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("request failed: GET"));
    assert!(env.stored_lines().is_empty());
}

#[test]
fn unreachable_post_is_saved() {
    let env = Env::new();
    let url = format!("{}/items", unreachable_base());
    env.redial()
        .args(["post", &url, "--body", r#"{"n":1}"#, "--wait", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 request(s) still pending"));

    let lines = env.stored_lines();
    assert_eq!(lines.len(), 1);
    let saved: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(saved["method"], "POST");
    assert_eq!(saved["url"], url.as_str());
}

#[test]
fn unreachable_get_with_resend_is_saved() {
    let env = Env::new();
    env.redial()
        .args([
            "get",
            &format!("{}/items", unreachable_base()),
            "--resend",
            "--wait",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still pending"));
    assert_eq!(env.stored_lines().len(), 1);
}

#[test]
fn invalid_body_rejected() {
    let env = Env::new();
    env.redial()
        .args(["put", "http://localhost/items/1", "--body", "{oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid body"));
}

#[test]
fn invalid_header_rejected() {
    let env = Env::new();
    env.redial()
        .args(["get", "http://localhost/items", "-H", "no-colon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid header"));
}

#[test]
fn relative_url_needs_base_url() {
    let env = Env::new();
    env.redial()
        .args(["get", "/items"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn relative_url_joined_onto_base_url() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/api/items"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server),
    );

    let env = Env::new();
    let config = env.temp.path().join("redial.toml");
    std::fs::write(&config, format!("base_url = \"{}/api\"\n", server.uri())).unwrap();

    env.redial()
        .arg("--config")
        .arg(&config)
        .args(["get", "items"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn saved_request_replayed_once_server_recovers() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server),
    );

    let env = Env::new();
    let url = format!("{}/orders", server.uri());
    env.redial()
        .args(["post", &url, "--body", r#"{"qty":2}"#, "--wait", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still pending"));
    assert_eq!(env.stored_lines().len(), 1);

    rt.block_on(server.reset());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(body_json(serde_json::json!({"qty": 2})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server),
    );

    env.redial()
        .args(["replay", "--wait", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 completed"));
    assert!(env.stored_lines().is_empty());
}

#[test]
fn replay_with_nothing_saved() {
    let env = Env::new();
    env.redial()
        .arg("replay")
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending requests"));
}

#[test]
fn status_without_probe_is_up() {
    let env = Env::new();
    env.redial()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("up (no probe configured)"));
}

#[test]
fn status_reports_down_for_unreachable_probe() {
    let env = Env::new();
    env.redial()
        .args([
            "--probe-url",
            &format!("{}/health", unreachable_base()),
            "status",
            "--output",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"down""#));
}
