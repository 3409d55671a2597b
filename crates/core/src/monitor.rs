// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness monitor.
//!
//! Tracks whether the network is believed to be reachable. Checks are
//! rate-limited to one per `check_interval` unless forced. With a probe URL a
//! check issues one GET through the transport; without one it optimistically
//! assumes the connection is back.
//!
//! A `Down -> Up` transition notifies the [`RecoveryListener`] (normally the
//! replay engine) exactly once. An `Up -> Down` transition starts the
//! monitoring loop, a timer task that keeps checking at a fixed interval
//! until the connection is up again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::replay::RecoveryListener;
use crate::request::RequestDescriptor;
use crate::transport::Transport;

/// Default delay between two checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest period the monitoring loop sleeps between checks, whatever the
/// configured interval.
pub const MIN_LOOP_INTERVAL: Duration = Duration::from_millis(10);

/// Believed connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    Up,
    Down,
}

impl ConnectivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityStatus::Up => "up",
            ConnectivityStatus::Down => "down",
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Monitor state including whether the loop is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Up,
    Down,
    /// Down, with the monitoring loop running.
    CheckingWhileDown,
}

/// Configuration for the liveness monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Lightweight endpoint probed by checks. `None` means optimistic checks.
    pub probe_url: Option<String>,
    /// Minimum delay between two unforced checks, and the loop period.
    /// The loop never runs faster than [`MIN_LOOP_INTERVAL`].
    pub check_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig { probe_url: None, check_interval: DEFAULT_CHECK_INTERVAL }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = Some(url.into());
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }
}

/// What a call to [`LivenessMonitor::check`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub status: ConnectivityStatus,
    /// False when the check was rate-limited and returned the cached status.
    pub probed: bool,
    /// True when this check moved the status from down to up.
    pub recovered: bool,
}

#[derive(Debug)]
struct ConnectivityState {
    status: ConnectivityStatus,
    last_checked_at: Option<Instant>,
}

/// Tracks believed connectivity and drives periodic checks.
pub struct LivenessMonitor<T: Transport> {
    config: MonitorConfig,
    transport: Arc<T>,
    runtime: Handle,
    listener: Arc<dyn RecoveryListener>,
    state: Mutex<ConnectivityState>,
    loop_running: AtomicBool,
    cancel_token: CancellationToken,
}

impl<T: Transport> LivenessMonitor<T> {
    /// Creates a monitor that starts out `Up`.
    pub fn new(
        config: MonitorConfig,
        transport: Arc<T>,
        runtime: Handle,
        listener: Arc<dyn RecoveryListener>,
    ) -> Self {
        LivenessMonitor {
            config,
            transport,
            runtime,
            listener,
            state: Mutex::new(ConnectivityState {
                status: ConnectivityStatus::Up,
                last_checked_at: None,
            }),
            loop_running: AtomicBool::new(false),
            cancel_token: CancellationToken::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConnectivityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.lock().status
    }

    pub fn is_up(&self) -> bool {
        self.status() == ConnectivityStatus::Up
    }

    pub fn phase(&self) -> Phase {
        match self.status() {
            ConnectivityStatus::Up => Phase::Up,
            ConnectivityStatus::Down if self.is_monitoring() => Phase::CheckingWhileDown,
            ConnectivityStatus::Down => Phase::Down,
        }
    }

    pub fn last_checked_at(&self) -> Option<Instant> {
        self.lock().last_checked_at
    }

    /// True while the monitoring loop task is running.
    pub fn is_monitoring(&self) -> bool {
        self.loop_running.load(Ordering::Acquire)
    }

    /// Checks connectivity.
    ///
    /// Unless `force` is set, a check within `check_interval` of the previous
    /// one returns the cached status without touching the network. Probe
    /// failures only change the status; they are never returned as errors.
    pub async fn check(self: &Arc<Self>, force: bool) -> CheckResult {
        {
            let mut state = self.lock();
            if let Some(last) = state.last_checked_at {
                if !force && last.elapsed() < self.config.check_interval {
                    tracing::debug!(status = %state.status, "check rate-limited");
                    return CheckResult { status: state.status, probed: false, recovered: false };
                }
            }
            // Claim the slot before probing so concurrent unforced checks back off.
            state.last_checked_at = Some(Instant::now());
        }

        let observed = match &self.config.probe_url {
            None => ConnectivityStatus::Up,
            Some(url) => match self.transport.invoke(RequestDescriptor::get(url.as_str())).await {
                Ok(_) => ConnectivityStatus::Up,
                Err(err) => {
                    tracing::debug!(probe = %url, error = %err, "probe failed");
                    ConnectivityStatus::Down
                }
            },
        };

        let previous = {
            let mut state = self.lock();
            let previous = state.status;
            state.status = observed;
            state.last_checked_at = Some(Instant::now());
            previous
        };

        let recovered =
            previous == ConnectivityStatus::Down && observed == ConnectivityStatus::Up;
        if recovered {
            tracing::info!("connectivity recovered");
            self.listener.on_recovered();
        } else if previous == ConnectivityStatus::Up && observed == ConnectivityStatus::Down {
            tracing::warn!("connectivity lost (probe failed)");
            self.monitor_loop(false);
        }

        CheckResult { status: observed, probed: true, recovered }
    }

    /// Flips the status to `Down` and makes sure the monitoring loop runs.
    ///
    /// Counts as an observation: the next unforced check waits a full interval.
    pub fn mark_down(self: &Arc<Self>) {
        let previous = {
            let mut state = self.lock();
            let previous = state.status;
            state.status = ConnectivityStatus::Down;
            state.last_checked_at = Some(Instant::now());
            previous
        };

        if previous == ConnectivityStatus::Up {
            tracing::warn!("connectivity lost");
        }
        self.monitor_loop(false);
    }

    /// Starts the monitoring loop unless one is already running.
    ///
    /// The loop checks every `check_interval` and stops once the status is
    /// `Up`, unless `run_even_if_up` is set. Returns true if a loop was started.
    pub fn monitor_loop(self: &Arc<Self>, run_even_if_up: bool) -> bool {
        if self.cancel_token.is_cancelled() {
            return false;
        }
        if self.loop_running.swap(true, Ordering::AcqRel) {
            return false;
        }

        tracing::debug!(
            interval_ms = self.loop_interval().as_millis() as u64,
            run_even_if_up,
            "monitor loop started"
        );

        let monitor = Arc::clone(self);
        self.runtime.spawn(async move {
            monitor.run_loop(run_even_if_up).await;
        });
        true
    }

    async fn run_loop(self: Arc<Self>, run_even_if_up: bool) {
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = tokio::time::sleep(self.loop_interval()) => {}
            }

            let result = self.check(false).await;
            if result.status == ConnectivityStatus::Up && !run_even_if_up {
                self.loop_running.store(false, Ordering::Release);
                // A failure may have marked us down between the check and the
                // flag reset; its own monitor_loop call saw the flag still set.
                if !self.is_up()
                    && self
                        .loop_running
                        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                {
                    continue;
                }
                tracing::debug!("monitor loop stopped");
                return;
            }
        }

        self.loop_running.store(false, Ordering::Release);
        tracing::debug!("monitor loop cancelled");
    }

    fn loop_interval(&self) -> Duration {
        self.config.check_interval.max(MIN_LOOP_INTERVAL)
    }

    /// Stops the monitoring loop for good.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
