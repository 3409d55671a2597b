// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request descriptors and per-request options.
//!
//! A [`RequestDescriptor`] is the plain-data description of one call: enough
//! to hand to a transport, and enough to persist and restore later.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::method::Method;

/// Options attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Keep the request queued for replay after a failure.
    ///
    /// `None` means the per-method default (see [`Method::default_resend`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend: Option<bool>,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Transport-specific options passed through untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit resend policy.
    pub fn resend(mut self, resend: bool) -> Self {
        self.resend = Some(resend);
        self
    }

    /// Adds a header, replacing any previous value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a passthrough transport option.
    pub fn extra(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Resolves the effective resend policy for the given method.
    pub fn resolve_resend(&self, method: Method) -> bool {
        self.resend.unwrap_or_else(|| method.default_resend())
    }
}

/// Everything needed to perform, or later re-register, one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default)]
    pub options: RequestOptions,
}

impl RequestDescriptor {
    /// Creates a descriptor with no body and default options.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        RequestDescriptor { method, url: url.into(), body: None, options: RequestOptions::default() }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn post(url: impl Into<String>, body: Option<Value>) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    pub fn put(url: impl Into<String>, body: Option<Value>) -> Self {
        Self::new(Method::Put, url).with_body(body)
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Effective resend policy for this request.
    pub fn resend(&self) -> bool {
        self.options.resolve_resend(self.method)
    }

    /// Serializes to a single JSON line.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a descriptor from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
