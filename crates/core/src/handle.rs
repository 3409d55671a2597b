// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-shot execution handles.
//!
//! An [`ExecutionHandle`] wraps one unit of work (a transport call plus its
//! bookkeeping). Attaching a listener and triggering execution are separate
//! steps: any number of [`Subscription`]s observe the handle, and every
//! trigger broadcasts a fresh [`Outcome`] to all of them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::transport::{Response, TransportError};

/// Outcomes buffered per subscriber before a slow one starts lagging.
const OUTCOME_BUFFER: usize = 64;

/// Result of one execution, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Response),
    Failure(TransportError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Success(response) => Some(response),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(err) => Some(err),
        }
    }
}

/// Future produced by a bound job.
pub type JobFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

type Job = Box<dyn Fn() -> JobFuture + Send + Sync>;

type SettledHook = Box<dyn Fn(&Outcome) + Send + Sync>;

/// Shared, re-triggerable unit of work.
///
/// Cloning is cheap and every clone refers to the same handle.
#[derive(Clone)]
pub struct ExecutionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    id: u64,
    runtime: Handle,
    job: OnceLock<Job>,
    settled: OnceLock<SettledHook>,
    tx: broadcast::Sender<Outcome>,
    in_flight: AtomicBool,
    invocations: AtomicU64,
    last: Mutex<Option<Outcome>>,
}

impl HandleInner {
    /// The handle is re-triggerable before the settled hook runs, so any
    /// trigger the hook causes starts a fresh execution.
    fn publish(&self, outcome: Outcome) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome.clone());
        self.in_flight.store(false, Ordering::Release);
        if let Some(hook) = self.settled.get() {
            hook(&outcome);
        }
        // No receivers is fine: nobody is listening right now.
        let _ = self.tx.send(outcome);
    }
}

impl ExecutionHandle {
    /// Creates an unbound handle whose executions run on `runtime`.
    pub fn new(id: u64, runtime: Handle) -> Self {
        let (tx, _) = broadcast::channel(OUTCOME_BUFFER);
        ExecutionHandle {
            inner: Arc::new(HandleInner {
                id,
                runtime,
                job: OnceLock::new(),
                settled: OnceLock::new(),
                tx,
                in_flight: AtomicBool::new(false),
                invocations: AtomicU64::new(0),
                last: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Binds the work performed on each trigger.
    ///
    /// A handle is bound once; returns false if it already had a job.
    pub fn bind<F>(&self, job: F) -> bool
    where
        F: Fn() -> JobFuture + Send + Sync + 'static,
    {
        self.inner.job.set(Box::new(job)).is_ok()
    }

    /// Sets a callback run after each execution, once the handle is no
    /// longer in flight and before subscribers are notified.
    ///
    /// Returns false if a callback was already set.
    pub fn on_settled<F>(&self, hook: F) -> bool
    where
        F: Fn(&Outcome) + Send + Sync + 'static,
    {
        self.inner.settled.set(Box::new(hook)).is_ok()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.job.get().is_some()
    }

    /// Attaches a new observer. It receives every outcome published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription { rx: self.inner.tx.subscribe() }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }

    /// Starts one execution.
    ///
    /// The job is started synchronously, so handles triggered in sequence
    /// reach the transport in that sequence. The outcome is awaited on the
    /// runtime and broadcast to subscribers. A trigger while the previous
    /// execution is still running is coalesced into it and returns false.
    pub fn trigger(&self) -> bool {
        let Some(job) = self.inner.job.get() else {
            tracing::debug!(handle = self.inner.id, "trigger on unbound handle ignored");
            return false;
        };

        if self.inner.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!(handle = self.inner.id, "execution already in flight, coalesced");
            return false;
        }

        self.inner.invocations.fetch_add(1, Ordering::Relaxed);
        let execution = job();
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            let outcome = execution.await;
            inner.publish(outcome);
        });
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Number of executions started so far.
    pub fn invocations(&self) -> u64 {
        self.inner.invocations.load(Ordering::Relaxed)
    }

    /// Most recent outcome, for observers that attached after it was published.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.inner.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// True if both values refer to the same handle.
    pub fn same_as(&self, other: &ExecutionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("id", &self.inner.id)
            .field("bound", &self.is_bound())
            .field("in_flight", &self.is_in_flight())
            .field("invocations", &self.invocations())
            .finish()
    }
}

/// One observer of an [`ExecutionHandle`].
///
/// Dropping it detaches only this observer.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<Outcome>,
}

impl Subscription {
    /// Waits for the next outcome.
    ///
    /// Returns `None` once the handle is gone. Outcomes dropped because this
    /// observer fell behind are skipped.
    pub async fn recv(&mut self) -> Option<Outcome> {
        loop {
            match self.rx.recv().await {
                Ok(outcome) => return Some(outcome),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, outcomes dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next outcome if one is already available.
    pub fn try_recv(&mut self) -> Option<Outcome> {
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => return Some(outcome),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, outcomes dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
