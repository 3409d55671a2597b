// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport port.
//!
//! The engine never talks to the network itself. It hands a
//! [`RequestDescriptor`] to a [`Transport`] and only looks at whether the
//! call succeeded or failed.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::request::RequestDescriptor;

/// Error type for transport operations.
///
/// The engine treats every variant the same way: the call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Host unreachable, connection refused or reset.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport gave up waiting for a response.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be built (bad URL, unserializable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// A successful response as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Response { status, body: body.into() }
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Future returned by [`Transport::invoke`].
///
/// It must not borrow the transport: the engine starts the call while
/// holding locks and finishes it on a spawned task.
pub type TransportFuture = Pin<Box<dyn Future<Output = TransportResult<Response>> + Send + 'static>>;

/// Performs one network call per invocation.
pub trait Transport: Send + Sync + 'static {
    /// Starts a call for the given request.
    ///
    /// Calls are started in the order `invoke` is called, which is what the
    /// replay ordering guarantee refers to.
    fn invoke(&self, request: RequestDescriptor) -> TransportFuture;
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
