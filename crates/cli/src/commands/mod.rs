// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod pending;
pub mod replay;
pub mod request;
pub mod status;

use tokio::time::{timeout_at, Instant};

use redial_core::{Client, Outcome, RequestDescriptor, RequestHandle, Transport};

use crate::config::Config;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::store::PendingStore;

/// A client wired to the pending-request store.
pub struct Session<T: Transport> {
    config: Config,
    client: Client<T>,
    store: PendingStore,
}

impl Session<HttpTransport> {
    /// Opens a session that talks HTTP with the configured timeout and headers.
    pub fn open(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout(), config.headers.clone())?;
        Session::with_transport(config, transport)
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(config: Config, transport: T) -> Result<Self> {
        let store = PendingStore::open(&config.store_path())?;
        let client = Client::new(config.monitor_config(), transport)?;
        Ok(Session {
            config,
            client,
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn store(&self) -> &PendingStore {
        &self.store
    }

    /// Hands saved requests back to the client, in saved order.
    pub fn restore(&self) -> Result<Vec<Tracked>> {
        let saved = self.store.load()?;
        Ok(self
            .client
            .restore_pending(saved)
            .into_iter()
            .map(Tracked::new)
            .collect())
    }

    /// Writes whatever is still pending back to the store.
    pub fn save(&self) -> Result<usize> {
        let pending = self.client.snapshot_pending();
        self.store.save(&pending)?;
        Ok(pending.len())
    }
}

/// A request handle being waited on.
pub struct Tracked {
    pub handle: RequestHandle,
}

impl Tracked {
    pub fn new(handle: RequestHandle) -> Self {
        Tracked { handle }
    }

    /// Waits until the entry leaves the registry: a success, or a failure
    /// that will not be resent.
    pub async fn settle(&mut self) -> Option<Outcome> {
        loop {
            let outcome = self.handle.recv().await?;
            match &outcome {
                Outcome::Success(_) => return Some(outcome),
                Outcome::Failure(_) if !self.handle.resend() => return Some(outcome),
                Outcome::Failure(err) => {
                    tracing::info!(request = %self.handle.key(), error = %err, "queued for replay");
                }
            }
        }
    }
}

/// Counts of how tracked requests ended before a deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub completed: usize,
    pub dropped: usize,
    pub unsettled: usize,
}

/// Settles each newly registered entry until `deadline`.
///
/// Handles that joined an entry already tracked earlier in the list are
/// skipped so shared entries count once.
pub async fn drain(tracked: &mut [Tracked], deadline: Instant) -> Tally {
    let mut tally = Tally::default();
    let mut expired = false;
    for entry in tracked.iter_mut().filter(|t| t.handle.is_new()) {
        if expired {
            tally.unsettled += 1;
            continue;
        }
        match timeout_at(deadline, entry.settle()).await {
            Ok(Some(Outcome::Success(_))) => tally.completed += 1,
            Ok(Some(Outcome::Failure(_))) | Ok(None) => tally.dropped += 1,
            Err(_) => {
                expired = true;
                tally.unsettled += 1;
            }
        }
    }
    tally
}

pub(crate) fn describe(descriptor: &RequestDescriptor) -> String {
    format!("{} {}", descriptor.method, descriptor.url)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub(crate) mod testing;
