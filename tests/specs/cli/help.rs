// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for `redial --help` and argument validation.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use yare::parameterized;

fn redial() -> Command {
    cargo_bin_cmd!("redial")
}

#[test]
fn help_lists_commands() {
    redial()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("pending"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn version_flag() {
    redial()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("redial "));
}

#[parameterized(
    get = { "get" },
    post = { "post" },
    put = { "put" },
    delete = { "delete" },
    status = { "status" },
    pending = { "pending" },
    replay = { "replay" },
    clear = { "clear" },
)]
fn command_supports_help_flag(cmd: &str) {
    redial()
        .args([cmd, "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn request_help_shows_resend_flags() {
    redial()
        .args(["post", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--resend"))
        .stdout(predicate::str::contains("--no-resend"))
        .stdout(predicate::str::contains("--body"))
        .stdout(predicate::str::contains("--header"));
}

#[test]
fn get_requires_url() {
    redial().arg("get").assert().failure();
}

#[test]
fn resend_and_no_resend_conflict() {
    redial()
        .args(["get", "http://localhost/x", "--resend", "--no-resend"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_command_fails() {
    redial().arg("fetch").assert().failure();
}
