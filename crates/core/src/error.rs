// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for redial-core operations.
//!
//! Transport failures are not errors at this level: they are outcomes
//! delivered to subscribers (see [`crate::TransportError`]).

use thiserror::Error;

/// All possible errors that can occur in redial-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, DELETE")]
    InvalidMethod(String),

    #[error("no tokio runtime available\n  hint: construct the client from within a tokio runtime")]
    NoRuntime,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for redial-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
