// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! redial-core: connection tracking and request replay.
//!
//! This crate sits in front of an HTTP transport and keeps requests alive
//! across connectivity loss. Equivalent idempotent requests share one pending
//! entry, failed requests stay queued, and everything still pending is
//! replayed in submission order once the connection comes back.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Client    │────►│  Registry   │────►│  Transport  │
//! │  (facade)   │     │ (dedup map) │     │   (trait)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   ▲
//!        ▼                   │
//! ┌─────────────┐     ┌─────────────┐
//! │  Liveness   │────►│   Replay    │
//! │  Monitor    │     │   Engine    │
//! └─────────────┘     └─────────────┘
//! ```

pub mod client;
pub mod error;
pub mod handle;
pub mod method;
pub mod monitor;
pub mod registry;
pub mod replay;
pub mod request;
pub mod transport;

pub use client::{Client, RequestHandle};
pub use error::{Error, Result};
pub use handle::{ExecutionHandle, Outcome, Subscription};
pub use method::Method;
pub use monitor::{CheckResult, ConnectivityStatus, LivenessMonitor, MonitorConfig, Phase};
pub use registry::{DedupKey, PendingRequest, Registry};
pub use replay::{RecoveryListener, ReplayEngine, ReplayReport};
pub use request::{RequestDescriptor, RequestOptions};
pub use transport::{Response, Transport, TransportError, TransportFuture, TransportResult};

#[cfg(test)]
mod test_helpers;
