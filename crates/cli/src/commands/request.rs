// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use redial_core::{Method, Outcome, RequestDescriptor, Response, Transport};

use crate::cli::{parse_body, RequestArgs};
use crate::config::Config;
use crate::error::{Error, Result};

use super::{describe, drain, Session, Tracked};

pub async fn run(
    config: Config,
    method: Method,
    url: &str,
    body: Option<&str>,
    args: &RequestArgs,
) -> Result<()> {
    let session = Session::open(config)?;
    let descriptor = RequestDescriptor::new(method, session.config().resolve_url(url)?)
        .with_body(parse_body(body)?)
        .with_options(args.options()?);

    let response = send_impl(&session, descriptor, args.wait()).await?;
    tracing::debug!(status = response.status, "request completed");
    if !response.body.is_empty() {
        println!("{}", response.body);
    }
    Ok(())
}

/// Sends one request after restoring saved ones, then saves what is left.
///
/// Saved requests go first so they keep their place in the replay order.
/// Whatever remains of `wait` after this request settles is spent letting
/// the restored requests finish.
pub(crate) async fn send_impl<T: Transport>(
    session: &Session<T>,
    descriptor: RequestDescriptor,
    wait: Duration,
) -> Result<Response> {
    let deadline = Instant::now() + wait;
    let mut restored = session.restore()?;

    let label = describe(&descriptor);
    let mut tracked = Tracked::new(session.client().request(descriptor));

    let settled = timeout_at(deadline, tracked.settle()).await;
    drain(&mut restored, deadline).await;
    let remaining = session.save()?;
    if remaining > 0 {
        tracing::info!(count = remaining, path = %session.store().path().display(), "saved pending requests");
    }

    match settled {
        Ok(Some(Outcome::Success(response))) => Ok(response),
        Ok(Some(Outcome::Failure(err))) => Err(Error::RequestFailed {
            request: label,
            reason: err.to_string(),
        }),
        Ok(None) => Err(Error::RequestFailed {
            request: label,
            reason: "no outcome was delivered".to_string(),
        }),
        Err(_) if remaining > 0 => Err(Error::StillPending { count: remaining }),
        Err(_) => Err(Error::RequestFailed {
            request: label,
            reason: format!("no response within {}s", wait.as_secs()),
        }),
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
