// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the redial CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid header '{0}'\n  hint: headers are written as name:value")]
    InvalidHeader(String),

    #[error("invalid body: {0}\n  hint: the body must be valid JSON")]
    InvalidBody(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("line {line}: {reason}")]
    ParseLineError { line: usize, reason: String },

    #[error("http client error: {0}")]
    HttpClient(String),

    #[error(transparent)]
    Core(redial_core::Error),

    #[error("request failed: {request}: {reason}")]
    RequestFailed { request: String, reason: String },

    #[error("{count} request(s) still pending\n  hint: they are saved and will be retried by 'redial replay'")]
    StillPending { count: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for redial CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<redial_core::Error> for Error {
    fn from(e: redial_core::Error) -> Self {
        match e {
            redial_core::Error::Json(e) => Error::Json(e),
            other => Error::Core(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
