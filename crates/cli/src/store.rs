// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-request store.
//!
//! Requests that are still queued when the process exits are written here,
//! one [`RequestDescriptor`] per line, and handed back to the client on the
//! next run. Every save rewrites the file and fsyncs it.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use redial_core::RequestDescriptor;

use crate::error::{Error, Result};

/// JSONL file of requests awaiting replay.
#[derive(Debug)]
pub struct PendingStore {
    path: PathBuf,
}

impl PendingStore {
    /// Create or open a store at the given path, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(path)?;

        Ok(PendingStore {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the stored requests with `requests`, in order.
    pub fn save(&self, requests: &[RequestDescriptor]) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        for request in requests {
            writeln!(writer, "{}", request.to_json()?)?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }

    /// Reads all stored requests without removing them.
    pub fn load(&self) -> Result<Vec<RequestDescriptor>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut requests = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let request =
                RequestDescriptor::from_json(&line).map_err(|e| Error::ParseLineError {
                    line: idx + 1,
                    reason: e.to_string(),
                })?;
            requests.push(request);
        }

        Ok(requests)
    }

    /// Drops every stored request.
    pub fn clear(&self) -> Result<()> {
        File::create(&self.path)?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
