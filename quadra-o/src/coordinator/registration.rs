/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Registration window: accept the submitter, then every worker that joins
//! before the window expires.
//!
//! Two tasks cooperate:
//!
//! ```text
//! timer task   ──(sleep until deadline)──► closed.cancel()
//! accept task  ──select! { closed.cancelled() => stop, listener.accept() => register }
//! ```
//!
//! `TcpListener::accept` is cancel-safe, so dropping the pending accept when
//! the window closes never loses a half-registered connection.  Connections
//! still queued in the kernel backlog at that point are never accepted and are
//! reset when the listener is dropped.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::IntegrationJob;
use crate::wire;

use super::error::CoordinatorError;

/// Interval between "window still open" progress events.
const PROGRESS_TICK: Duration = Duration::from_secs(1);

/// Pause after a failed accept so a persistent error (e.g. fd exhaustion)
/// does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

// ── WorkerHandle ──────────────────────────────────────────────────────────────

/// One registered worker connection.
///
/// Owned exclusively by the coordinator.  Dropping it closes the connection.
#[derive(Debug)]
pub struct WorkerHandle {
    order: usize,
    peer: SocketAddr,
    pub(crate) stream: TcpStream,
}

impl WorkerHandle {
    fn new(order: usize, peer: SocketAddr, stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(worker = order, error = %e, "Could not set TCP_NODELAY");
        }
        Self {
            order,
            peer,
            stream,
        }
    }

    /// Registration order; `0` is the submitter.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Frozen outcome of the registration window.
///
/// Produced once and moved into dispatch; nothing mutates the worker list
/// after the window closes.
#[derive(Debug)]
pub struct Registration {
    pub job: IntegrationJob,
    /// Workers in registration order.  Never empty: the submitter is first.
    pub workers: Vec<WorkerHandle>,
}

/// Accept the submitter, read and validate its job, then accept further
/// workers until `window` has elapsed.
///
/// # Errors
/// Every error is fatal: a failed accept or read of the submitter, a malformed
/// job frame, or a job that violates its invariants.
pub async fn open_registration(
    listener: &TcpListener,
    window: Duration,
) -> Result<Registration, CoordinatorError> {
    info!("Waiting for the first worker to submit the integration job...");

    let (mut stream, peer) = listener
        .accept()
        .await
        .map_err(CoordinatorError::SubmitterAccept)?;
    info!(peer = %peer, "Submitting worker connected, waiting for job parameters");

    let job = wire::read_job(&mut stream)
        .await
        .map_err(CoordinatorError::from_submission)?;
    job.validate()?;
    info!(
        lower = job.lower_bound,
        upper = job.upper_bound,
        step = job.step,
        method = %job.method,
        "Integration job received"
    );

    let mut workers = vec![WorkerHandle::new(0, peer, stream)];

    info!(
        window_secs = window.as_secs_f64(),
        "Registration window open for additional workers"
    );
    let (closed, timer) = spawn_window_timer(window);

    loop {
        tokio::select! {
            biased;

            _ = closed.cancelled() => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let order = workers.len();
                    workers.push(WorkerHandle::new(order, peer, stream));
                    info!(
                        worker = order,
                        peer = %peer,
                        total = workers.len(),
                        "Worker registered"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Failed to accept worker connection, skipping");
                    tokio::select! {
                        _ = closed.cancelled() => break,
                        _ = sleep(ACCEPT_ERROR_BACKOFF) => {}
                    }
                }
            },
        }
    }

    if let Err(e) = timer.await {
        warn!(error = %e, "Registration timer task ended abnormally");
    }

    info!(
        workers = workers.len(),
        "Registration window closed, worker set frozen"
    );
    Ok(Registration { job, workers })
}

/// Start the window timer.  The returned token is cancelled once `window` has
/// elapsed.
fn spawn_window_timer(window: Duration) -> (CancellationToken, JoinHandle<()>) {
    let closed = CancellationToken::new();
    let signal = closed.clone();

    let handle = tokio::spawn(async move {
        let started = Instant::now();
        let deadline = started + window;
        let mut ticker = interval(PROGRESS_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                _ = ticker.tick() => {
                    debug!(
                        elapsed_secs = started.elapsed().as_secs(),
                        "Registration window open"
                    );
                }
            }
        }

        info!("Registration window expired");
        signal.cancel();
    });

    (closed, handle)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
