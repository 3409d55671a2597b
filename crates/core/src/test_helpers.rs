// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::request::RequestDescriptor;
use crate::transport::{Response, Transport, TransportError, TransportFuture, TransportResult};

/// Scripted transport for testing without real sockets.
///
/// Records every invocation in order. Outcomes come from a per-URL script
/// first, then from the offline flag, then default to `200`.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RequestDescriptor>,
    scripted: HashMap<String, VecDeque<TransportResult<Response>>>,
    offline: bool,
    delay: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call resolves only after `delay` (use with paused time).
    pub fn with_delay(delay: Duration) -> Self {
        let transport = Self::new();
        transport.lock().delay = delay;
        transport
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every unscripted call fail.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Queue an outcome for the next call to `url`.
    pub fn push_outcome(&self, url: &str, outcome: TransportResult<Response>) {
        self.lock().scripted.entry(url.to_string()).or_default().push_back(outcome);
    }

    /// Queue a connection failure for the next call to `url`.
    pub fn push_failure(&self, url: &str) {
        self.push_outcome(url, Err(TransportError::ConnectionFailed("mock failure".into())));
    }

    /// All invocations so far.
    pub fn calls(&self) -> Vec<RequestDescriptor> {
        self.lock().calls.clone()
    }

    /// URLs of all invocations so far, in invocation order.
    pub fn call_urls(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.url.clone()).collect()
    }

    /// Number of invocations for one URL.
    pub fn calls_to(&self, url: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.url == url).count()
    }
}

impl Transport for MockTransport {
    fn invoke(&self, request: RequestDescriptor) -> TransportFuture {
        let (result, delay) = {
            let mut state = self.lock();
            state.calls.push(request.clone());
            let scripted = state.scripted.get_mut(&request.url).and_then(|q| q.pop_front());
            let result = match scripted {
                Some(result) => result,
                None if state.offline => Err(TransportError::ConnectionFailed("offline".into())),
                None => Ok(Response::new(200, format!("{} {}", request.method, request.url))),
            };
            (result, state.delay)
        };

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}
