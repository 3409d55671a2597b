// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use redial_core::RequestOptions;
use serde_json::Value;

use crate::error::{Error, Result};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  redial get https://api.example.com/items       Fetch, or queue if offline
  redial post https://api.example.com/items \\
      --body '{\"name\":\"widget\"}'                 Create, retried until it lands
  redial pending                                 Show queued requests
  redial replay                                  Retry queued requests";

#[derive(Parser)]
#[command(name = "redial", version)]
#[command(about = "HTTP requests that survive connectivity loss")]
#[command(
    long_about = "HTTP requests that survive connectivity loss.\n\n\
    Failed requests are kept and replayed once the connection comes back. \
    Requests still queued when the command exits are saved and picked up by \
    the next invocation."
)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: redial.toml in the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pending-request store, overriding the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Connectivity probe endpoint, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    pub probe_url: Option<String>,

    /// Delay between connectivity checks in milliseconds, overriding the config file
    #[arg(long, global = true, value_name = "MS")]
    pub check_interval_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send a GET request (deduplicated, dropped after failure by default)
    Get {
        url: String,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a POST request (kept for replay after failure by default)
    Post {
        url: String,
        /// JSON request body
        #[arg(long, short)]
        body: Option<String>,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a PUT request (kept for replay after failure by default)
    Put {
        url: String,
        /// JSON request body
        #[arg(long, short)]
        body: Option<String>,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a DELETE request (deduplicated, kept for replay after failure by default)
    Delete {
        url: String,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Check connectivity against the probe endpoint
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List requests saved for replay
    Pending {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Retry saved requests and keep whatever still fails
    Replay {
        /// Seconds to wait for the saved requests to complete
        #[arg(long, default_value_t = 30)]
        wait: u64,
    },

    /// Discard all saved requests
    Clear,
}

/// Options shared by the request commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Extra request header as name:value (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Keep the request queued after a failure
    #[arg(long, conflicts_with = "no_resend")]
    pub resend: bool,

    /// Drop the request after its first failure
    #[arg(long)]
    pub no_resend: bool,

    /// Seconds to wait for the request to complete
    #[arg(long, default_value_t = 30)]
    pub wait: u64,
}

impl RequestArgs {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait)
    }

    /// Builds request options from the flags. Unset resend keeps the method default.
    pub fn options(&self) -> Result<RequestOptions> {
        let mut options = RequestOptions::new();
        if self.resend {
            options = options.resend(true);
        } else if self.no_resend {
            options = options.resend(false);
        }
        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            options = options.header(name, value);
        }
        Ok(options)
    }
}

/// Splits `name:value`, trimming whitespace around both parts.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub fn parse_body(raw: Option<&str>) -> Result<Option<Value>> {
    raw.map(|text| serde_json::from_str(text).map_err(|e| Error::InvalidBody(e.to_string())))
        .transpose()
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
