// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio::time::Instant;

use redial_core::Transport;

use crate::config::Config;
use crate::error::Result;

use super::{drain, Session};

/// Result of a replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub restored: usize,
    pub completed: usize,
    pub dropped: usize,
    pub remaining: usize,
}

pub async fn run(config: Config, wait: u64) -> Result<()> {
    let session = Session::open(config)?;
    let summary = replay_impl(&session, Duration::from_secs(wait)).await?;

    if summary.restored == 0 {
        println!("No pending requests");
        return Ok(());
    }
    println!(
        "Replayed {} request(s): {} completed, {} dropped, {} still pending",
        summary.restored, summary.completed, summary.dropped, summary.remaining
    );
    Ok(())
}

pub(crate) async fn replay_impl<T: Transport>(
    session: &Session<T>,
    wait: Duration,
) -> Result<ReplaySummary> {
    let deadline = Instant::now() + wait;
    let mut restored = session.restore()?;
    let count = restored.iter().filter(|t| t.handle.is_new()).count();

    let tally = drain(&mut restored, deadline).await;
    let remaining = session.save()?;

    Ok(ReplaySummary {
        restored: count,
        completed: tally.completed,
        dropped: tally.dropped,
        remaining,
    })
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
