// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::store::PendingStore;

use super::describe;

pub fn list(config: &Config, output: OutputFormat) -> Result<()> {
    let store = PendingStore::open(&config.store_path())?;
    for line in list_impl(&store, output)? {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn list_impl(store: &PendingStore, output: OutputFormat) -> Result<Vec<String>> {
    let requests = store.load()?;
    let mut lines = Vec::with_capacity(requests.len());
    match output {
        OutputFormat::Text => {
            if requests.is_empty() {
                lines.push("No pending requests".to_string());
            }
            for request in &requests {
                match &request.body {
                    Some(body) => lines.push(format!("{} {}", describe(request), body)),
                    None => lines.push(describe(request)),
                }
            }
        }
        OutputFormat::Json => {
            for request in &requests {
                lines.push(request.to_json()?);
            }
        }
    }
    Ok(lines)
}

pub fn clear(config: &Config) -> Result<()> {
    let store = PendingStore::open(&config.store_path())?;
    let count = clear_impl(&store)?;
    println!("Cleared {} pending request(s)", count);
    Ok(())
}

pub(crate) fn clear_impl(store: &PendingStore) -> Result<usize> {
    let count = store.len()?;
    store.clear()?;
    Ok(count)
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
