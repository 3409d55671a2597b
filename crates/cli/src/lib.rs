// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! redial - HTTP requests that survive connectivity loss.
//!
//! This crate wires the [`redial_core`] engine to the outside world for the
//! `redial` CLI tool.
//!
//! # Main Components
//!
//! - [`HttpTransport`] - `reqwest`-backed transport for the engine
//! - [`PendingStore`] - JSONL file holding requests that still need replay
//! - [`Config`] - `redial.toml` settings (probe endpoint, intervals, headers)
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use redial::{Config, HttpTransport, PendingStore};
//! use redial_core::{Client, RequestDescriptor};
//!
//! let config = Config::load_or_default(None)?;
//! let transport = HttpTransport::new(config.timeout(), config.headers.clone())?;
//! let client = Client::new(config.monitor_config(), transport)?;
//! let store = PendingStore::open(&config.store_path())?;
//!
//! client.restore_pending(store.load()?);
//! let mut handle = client.request(RequestDescriptor::get("https://api.example.com/items"));
//! let outcome = handle.recv().await;
//! store.save(&client.snapshot_pending())?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use cli::{Cli, Command, OutputFormat, RequestArgs};
pub use config::Config;
pub use error::{Error, Result};
pub use http::HttpTransport;
pub use store::PendingStore;

use redial_core::Method;

/// Applies command-line overrides on top of the loaded config file.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(store) = &cli.store {
        config.store = Some(store.clone());
    }
    if let Some(url) = &cli.probe_url {
        config.probe_url = Some(url.clone());
    }
    if let Some(ms) = cli.check_interval_ms {
        config.check_interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Get { url, request } => {
            commands::request::run(config, Method::Get, &url, None, &request).await
        }
        Command::Post { url, body, request } => {
            commands::request::run(config, Method::Post, &url, body.as_deref(), &request).await
        }
        Command::Put { url, body, request } => {
            commands::request::run(config, Method::Put, &url, body.as_deref(), &request).await
        }
        Command::Delete { url, request } => {
            commands::request::run(config, Method::Delete, &url, None, &request).await
        }
        Command::Status { output } => commands::status::run(config, output).await,
        Command::Pending { output } => commands::pending::list(&config, output),
        Command::Replay { wait } => commands::replay::run(config, wait).await,
        Command::Clear => commands::pending::clear(&config),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
