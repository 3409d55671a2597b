// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay of pending requests after connectivity returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::registry::Registry;

/// Receives the "connection recovered" signal from the liveness monitor.
pub trait RecoveryListener: Send + Sync {
    /// Called once per `Down -> Up` transition.
    fn on_recovered(&self);
}

/// Summary of one replay walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Handles that started a new execution.
    pub triggered: usize,
    /// Handles skipped because they were unbound or already running.
    pub coalesced: usize,
}

/// Re-triggers every pending request in insertion order.
///
/// Executions are started one after another without waiting for any of them
/// to complete, so the order guarantee covers when calls start, not when
/// they finish.
pub struct ReplayEngine {
    registry: Arc<Registry>,
    rounds: AtomicU64,
    last_report: Mutex<Option<ReplayReport>>,
}

impl ReplayEngine {
    pub fn new(registry: Arc<Registry>) -> Self {
        ReplayEngine { registry, rounds: AtomicU64::new(0), last_report: Mutex::new(None) }
    }

    /// Walks the registry and triggers each entry once.
    pub fn replay(&self) -> ReplayReport {
        let mut report = ReplayReport::default();

        // Triggering only starts work, so holding the registry lock for the
        // whole walk is cheap. Completions that remove entries wait for it.
        self.registry.for_each_in_order(|entry| {
            if entry.handle.trigger() {
                report.triggered += 1;
            } else {
                report.coalesced += 1;
            }
        });

        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_report.lock().unwrap_or_else(|e| e.into_inner()) = Some(report);

        tracing::info!(
            round,
            triggered = report.triggered,
            coalesced = report.coalesced,
            "replayed pending requests"
        );
        report
    }

    /// Number of replay walks performed.
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    pub fn last_report(&self) -> Option<ReplayReport> {
        *self.last_report.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecoveryListener for ReplayEngine {
    fn on_recovered(&self) {
        self.replay();
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
