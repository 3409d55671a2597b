// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use redial_core::{CheckResult, Transport};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;

use super::Session;

pub async fn run(config: Config, output: OutputFormat) -> Result<()> {
    let session = Session::open(config)?;
    let result = status_impl(&session).await;
    let probe_url = session.config().probe_url.as_deref();

    match output {
        OutputFormat::Text => {
            let detail = match probe_url {
                Some(url) if result.probed => format!("probed {}", url),
                Some(_) => "not probed".to_string(),
                None => "no probe configured".to_string(),
            };
            println!("{} ({})", result.status, detail);
        }
        OutputFormat::Json => {
            let value = json!({
                "status": result.status,
                "probed": result.probed,
                "probe_url": probe_url,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

/// Runs one forced connectivity check.
pub(crate) async fn status_impl<T: Transport>(session: &Session<T>) -> CheckResult {
    let result = session.client().check(true).await;
    session.client().shutdown();
    result
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
