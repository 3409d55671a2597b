// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request facade.
//!
//! [`Client`] is what callers use instead of calling the transport directly.
//! It wires the registry, the replay engine and the liveness monitor
//! together:
//! - Registers requests, collapsing equivalent GET/DELETE calls
//! - Executes immediately while the connection is believed up
//! - Flips the monitor down on any failure and keeps resend-eligible
//!   requests queued
//! - Replays everything still queued when the connection comes back

use serde_json::Value;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::error::{Error, Result};
use crate::handle::{ExecutionHandle, Outcome, Subscription};
use crate::method::Method;
use crate::monitor::{CheckResult, ConnectivityStatus, LivenessMonitor, MonitorConfig, Phase};
use crate::registry::{DedupKey, PendingRequest, Registry};
use crate::replay::{RecoveryListener, ReplayEngine, ReplayReport};
use crate::request::{RequestDescriptor, RequestOptions};
use crate::transport::Transport;

/// A caller's view of one pending request.
///
/// Every outcome of the underlying entry is delivered through
/// [`recv`](RequestHandle::recv), including outcomes produced by replay.
/// Callers that asked for an equivalent request share the same entry.
#[derive(Debug)]
pub struct RequestHandle {
    key: DedupKey,
    created: bool,
    resend: bool,
    handle: ExecutionHandle,
    subscription: Subscription,
}

impl RequestHandle {
    pub fn key(&self) -> &DedupKey {
        &self.key
    }

    /// True if this call registered a new entry rather than joining one.
    pub fn is_new(&self) -> bool {
        self.created
    }

    /// Resend policy of the entry this handle observes.
    ///
    /// A call that joined an existing entry gets that entry's policy, which
    /// may differ from the options it was called with.
    pub fn resend(&self) -> bool {
        self.resend
    }

    pub fn execution_handle(&self) -> &ExecutionHandle {
        &self.handle
    }

    /// Waits for the next outcome of this request.
    pub async fn recv(&mut self) -> Option<Outcome> {
        self.subscription.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Outcome> {
        self.subscription.try_recv()
    }

    /// Attaches another independent observer.
    pub fn subscribe(&self) -> Subscription {
        self.handle.subscribe()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.handle.last_outcome()
    }
}

/// Resilient request client over a [`Transport`].
///
/// Cloning is cheap; clones share the registry and the monitor.
pub struct Client<T: Transport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Client { inner: Arc::clone(&self.inner) }
    }
}

struct ClientInner<T: Transport> {
    transport: Arc<T>,
    registry: Arc<Registry>,
    replay: Arc<ReplayEngine>,
    monitor: Arc<LivenessMonitor<T>>,
}

impl<T: Transport> Drop for ClientInner<T> {
    fn drop(&mut self) {
        self.monitor.shutdown();
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client on the current tokio runtime.
    pub fn new(config: MonitorConfig, transport: T) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::with_runtime(config, transport, runtime))
    }

    /// Creates a client whose executions and monitor loop run on `runtime`.
    pub fn with_runtime(config: MonitorConfig, transport: T, runtime: Handle) -> Self {
        let transport = Arc::new(transport);
        let registry = Arc::new(Registry::new(runtime.clone()));
        let replay = Arc::new(ReplayEngine::new(Arc::clone(&registry)));
        let monitor = Arc::new(LivenessMonitor::new(
            config,
            Arc::clone(&transport),
            runtime,
            Arc::clone(&replay) as Arc<dyn RecoveryListener>,
        ));

        Client { inner: Arc::new(ClientInner { transport, registry, replay, monitor }) }
    }

    /// Issues a request.
    ///
    /// Never waits for the network: the returned handle is already
    /// subscribed and receives the outcome of the execution started here (if
    /// the connection is believed up) and of every later replay.
    pub fn call(
        &self,
        method: Method,
        url: impl Into<String>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> RequestHandle {
        self.request(RequestDescriptor::new(method, url).with_body(body).with_options(options))
    }

    pub fn get(&self, url: impl Into<String>, options: RequestOptions) -> RequestHandle {
        self.call(Method::Get, url, None, options)
    }

    pub fn post(
        &self,
        url: impl Into<String>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> RequestHandle {
        self.call(Method::Post, url, body, options)
    }

    pub fn put(
        &self,
        url: impl Into<String>,
        body: Option<Value>,
        options: RequestOptions,
    ) -> RequestHandle {
        self.call(Method::Put, url, body, options)
    }

    pub fn delete(&self, url: impl Into<String>, options: RequestOptions) -> RequestHandle {
        self.call(Method::Delete, url, None, options)
    }

    /// Issues a request from a full descriptor.
    pub fn request(&self, descriptor: RequestDescriptor) -> RequestHandle {
        let (entry, created) = self.inner.registry.lookup_or_create(descriptor);
        if created {
            self.bind(&entry);
            tracing::debug!(key = %entry.key, "registered request");
        }

        // Subscribe before triggering so the first outcome cannot be missed.
        let subscription = entry.handle.subscribe();

        if self.inner.monitor.is_up() {
            entry.handle.trigger();
        } else {
            tracing::debug!(key = %entry.key, "offline, request queued for replay");
        }

        RequestHandle {
            key: entry.key,
            created,
            resend: entry.descriptor.resend(),
            handle: entry.handle,
            subscription,
        }
    }

    /// Binds a new entry's handle to one transport call plus bookkeeping.
    fn bind(&self, entry: &PendingRequest) {
        let transport = Arc::clone(&self.inner.transport);
        let registry = Arc::downgrade(&self.inner.registry);
        let monitor = Arc::downgrade(&self.inner.monitor);
        // Must run once the handle is no longer in flight, or a replay fired
        // by an immediate recovery is coalesced onto the finished execution.
        entry.handle.on_settled(move |outcome| {
            if !outcome.is_success() {
                if let Some(monitor) = monitor.upgrade() {
                    monitor.mark_down();
                }
            }
        });
        let key = entry.key.clone();
        let handle_id = entry.handle.id();
        let descriptor = entry.descriptor.clone();
        let resend = descriptor.resend();

        entry.handle.bind(move || {
            let call = transport.invoke(descriptor.clone());
            let registry = registry.clone();
            let key = key.clone();

            Box::pin(async move {
                match call.await {
                    Ok(response) => {
                        if let Some(registry) = registry.upgrade() {
                            registry.remove_handle(&key, handle_id);
                        }
                        tracing::debug!(key = %key, status = response.status, "request succeeded");
                        Outcome::Success(response)
                    }
                    Err(err) => {
                        tracing::warn!(key = %key, error = %err, resend, "request failed");
                        if !resend {
                            if let Some(registry) = registry.upgrade() {
                                registry.remove_handle(&key, handle_id);
                            }
                        }
                        Outcome::Failure(err)
                    }
                }
            })
        });
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.inner.monitor.status()
    }

    pub fn phase(&self) -> Phase {
        self.inner.monitor.phase()
    }

    /// Runs a connectivity check (see [`LivenessMonitor::check`]).
    pub async fn check(&self, force: bool) -> CheckResult {
        self.inner.monitor.check(force).await
    }

    pub fn monitor(&self) -> &Arc<LivenessMonitor<T>> {
        &self.inner.monitor
    }

    pub fn last_replay(&self) -> Option<ReplayReport> {
        self.inner.replay.last_report()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.registry.len()
    }

    /// Pending entries, in submission order.
    pub fn pending(&self) -> Vec<PendingRequest> {
        self.inner.registry.snapshot()
    }

    /// Descriptors of all pending requests, in submission order, for
    /// external persistence.
    pub fn snapshot_pending(&self) -> Vec<RequestDescriptor> {
        self.inner.registry.snapshot().into_iter().map(|entry| entry.descriptor).collect()
    }

    /// Re-registers previously snapshotted requests.
    ///
    /// Each one executes right away if the connection is believed up,
    /// otherwise it waits for the next replay.
    pub fn restore_pending<I>(&self, descriptors: I) -> Vec<RequestHandle>
    where
        I: IntoIterator<Item = RequestDescriptor>,
    {
        let handles: Vec<_> = descriptors.into_iter().map(|d| self.request(d)).collect();
        if !handles.is_empty() {
            tracing::info!(count = handles.len(), "restored pending requests");
        }
        handles
    }

    /// Stops the monitoring loop. Pending requests stay registered.
    pub fn shutdown(&self) {
        self.inner.monitor.shutdown();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
