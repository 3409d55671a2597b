// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport backed by `reqwest`.
//!
//! Any non-2xx status is reported as a failure so the client treats it the
//! same as a dropped connection.

use std::collections::BTreeMap;
use std::time::Duration;

use redial_core::{
    Method, RequestDescriptor, Response, Transport, TransportError, TransportFuture,
};
use serde_json::Value;

use crate::error::{Error, Result};

/// Per-request override for the transport timeout, read from
/// `RequestOptions::extra`.
pub const TIMEOUT_OPTION: &str = "timeout_ms";

/// Transport that performs real HTTP calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    default_headers: BTreeMap<String, String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, default_headers: BTreeMap<String, String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("redial/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;
        Ok(HttpTransport {
            client,
            default_headers,
        })
    }
}

impl Transport for HttpTransport {
    fn invoke(&self, request: RequestDescriptor) -> TransportFuture {
        let client = self.client.clone();
        let mut headers = self.default_headers.clone();
        headers.extend(request.options.headers.clone());

        Box::pin(async move {
            let mut builder = client.request(to_reqwest_method(request.method), &request.url);
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(ms) = request.options.extra.get(TIMEOUT_OPTION).and_then(Value::as_u64) {
                builder = builder.timeout(Duration::from_millis(ms));
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(map_error)?;
            let status = response.status().as_u16();
            let success = response.status().is_success();
            let body = response.text().await.map_err(map_error)?;

            if !success {
                return Err(TransportError::Status { status, body });
            }
            Ok(Response::new(status, body))
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
