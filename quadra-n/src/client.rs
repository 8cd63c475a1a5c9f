/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Worker side of the protocol: connect, optionally submit, compute, report.
//!
//! ```text
//! connect_with_retry ──► [submit job] ──► read assignment ──► integrate ──► write result
//! ```

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::{info, warn};

use quadra_o::job::{IntegrationJob, JobError, WorkAssignment};
use quadra_o::quadrature::integrate_assignment;
use quadra_o::wire::{self, WireError};

use crate::prompt::JobSource;

/// Default coordinator endpoint.
pub const DEFAULT_SERVER: &str = "127.0.0.1:12345";

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that end a worker run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Every connection attempt failed.
    #[error("could not connect to {endpoint} after {attempts} attempt(s): {source}")]
    Connection {
        endpoint: String,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    /// The job could not be read from the operator.
    #[error("failed to read the job parameters: {0}")]
    JobInput(#[source] io::Error),

    #[error("failed to submit the job: {0}")]
    Submit(#[source] WireError),

    #[error("failed to receive the work assignment: {0}")]
    Receive(#[source] WireError),

    /// The coordinator sent an assignment the quadrature rules cannot process.
    #[error("received an invalid work assignment: {0}")]
    Protocol(#[from] JobError),

    #[error("failed to report the partial result: {0}")]
    Report(#[source] WireError),
}

// ── Options ───────────────────────────────────────────────────────────────────

/// How often and how patiently to dial the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total connection attempts, including the first.
    pub attempts: u32,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Coordinator `host:port`.
    pub server: String,
    pub retry: RetryPolicy,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// What one worker run computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerOutcome {
    /// The job this worker submitted, if it was the submitter.
    pub submitted: Option<IntegrationJob>,
    pub assignment: WorkAssignment,
    pub partial: f64,
}

// ── Connection ────────────────────────────────────────────────────────────────

/// Dial `endpoint` up to `policy.attempts` times, `policy.delay` apart.
pub async fn connect_with_retry(
    endpoint: &str,
    policy: &RetryPolicy,
) -> Result<TcpStream, ClientError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match TcpStream::connect(endpoint).await {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(error = %e, "Could not set TCP_NODELAY");
                }
                info!(endpoint, attempt, "Connected to coordinator");
                return Ok(stream);
            }
            Err(source) if attempt >= attempts => {
                return Err(ClientError::Connection {
                    endpoint: endpoint.to_string(),
                    attempts,
                    source,
                });
            }
            Err(e) => {
                warn!(
                    endpoint,
                    attempt,
                    error = %e,
                    "Connection attempt failed, retrying in {:.1}s",
                    policy.delay.as_secs_f64()
                );
                sleep(policy.delay).await;
            }
        }
    }
}

// ── Worker run ────────────────────────────────────────────────────────────────

/// Run one worker to completion.
///
/// With a `job_source` this worker is the submitter: the job is obtained
/// after the connection is up (so this worker is registered first) and sent
/// before the assignment is awaited.
pub async fn run_worker(
    options: &WorkerOptions,
    job_source: Option<Box<dyn JobSource>>,
) -> Result<WorkerOutcome, ClientError> {
    let mut stream = connect_with_retry(&options.server, &options.retry).await?;

    let submitted = match job_source {
        Some(source) => {
            let job = obtain_job(source).await?;
            wire::write_job(&mut stream, &job)
                .await
                .map_err(ClientError::Submit)?;
            info!(%job, "Integration job submitted");
            Some(job)
        }
        None => None,
    };

    info!("Waiting for a work assignment...");
    let assignment = wire::read_assignment(&mut stream)
        .await
        .map_err(ClientError::Receive)?;
    assignment.validate()?;
    info!(range = %assignment, "Assignment received");

    let partial = integrate_assignment(&assignment);
    info!(method = %assignment.method, partial, "Partial result computed");

    wire::write_result(&mut stream, partial)
        .await
        .map_err(ClientError::Report)?;
    info!("Partial result reported");

    Ok(WorkerOutcome {
        submitted,
        assignment,
        partial,
    })
}

/// Run the (possibly blocking) job source on the blocking pool.
async fn obtain_job(mut source: Box<dyn JobSource>) -> Result<IntegrationJob, ClientError> {
    tokio::task::spawn_blocking(move || source.next_job())
        .await
        .map_err(|e| ClientError::JobInput(io::Error::new(io::ErrorKind::Other, e)))?
        .map_err(ClientError::JobInput)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use quadra_o::job::Method;
    use tokio::net::TcpListener;

    struct Given(IntegrationJob);

    impl JobSource for Given {
        fn next_job(&mut self) -> io::Result<IntegrationJob> {
            Ok(self.0)
        }
    }

    async fn loopback() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    fn options(server: String) -> WorkerOptions {
        WorkerOptions {
            server,
            retry: RetryPolicy {
                attempts: 3,
                delay: Duration::from_millis(20),
            },
        }
    }

    // ── Connection ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn retries_are_exhausted_against_closed_port() {
        let (listener, addr) = loopback().await;
        drop(listener);

        let err = connect_with_retry(&addr, &options(addr.clone()).retry)
            .await
            .unwrap_err();
        match err {
            ClientError::Connection { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_policy_is_five_attempts_two_seconds_apart() {
        let p = RetryPolicy::default();
        assert_eq!(p.attempts, 5);
        assert_eq!(p.delay, Duration::from_secs(2));
        assert_eq!(WorkerOptions::default().server, "127.0.0.1:12345");
    }

    // ── Protocol ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn submitter_sends_job_then_reports_result() {
        let (listener, addr) = loopback().await;
        let job = IntegrationJob::new(2.0, 4.0, 0.01, Method::Trapezoidal).unwrap();

        let coordinator = tokio::spawn(async move {
            let (mut s, _) = listener.accept().await.unwrap();
            let received = wire::read_job(&mut s).await.unwrap();
            let assignment = WorkAssignment {
                sub_start: received.lower_bound,
                sub_end: received.upper_bound,
                step: received.step,
                method: received.method,
            };
            wire::write_assignment(&mut s, &assignment).await.unwrap();
            (received, wire::read_result(&mut s).await.unwrap())
        });

        let outcome = run_worker(&options(addr), Some(Box::new(Given(job))))
            .await
            .unwrap();
        let (received, reported) = coordinator.await.unwrap();

        assert_eq!(received, job);
        assert_eq!(outcome.submitted, Some(job));
        assert_eq!(outcome.partial, reported);
        assert_eq!(
            reported,
            integrate_assignment(&outcome.assignment)
        );
    }

    #[tokio::test]
    async fn invalid_assignment_is_a_protocol_error() {
        let (listener, addr) = loopback().await;
        let coordinator = tokio::spawn(async move {
            let (mut s, _) = listener.accept().await.unwrap();
            let reversed = WorkAssignment {
                sub_start: 6.0,
                sub_end: 4.0,
                step: 0.1,
                method: Method::Rectangle,
            };
            wire::write_assignment(&mut s, &reversed).await.unwrap();
            s
        });

        let err = run_worker(&options(addr), None).await.unwrap_err();
        let _keep_open = coordinator.await.unwrap();
        assert!(matches!(
            err,
            ClientError::Protocol(JobError::EmptyInterval { .. })
        ));
    }

    #[tokio::test]
    async fn unbounded_assignment_is_refused_before_computing() {
        let (listener, addr) = loopback().await;
        let coordinator = tokio::spawn(async move {
            let (mut s, _) = listener.accept().await.unwrap();
            let unbounded = WorkAssignment {
                sub_start: 2.0,
                sub_end: f64::INFINITY,
                step: 0.01,
                method: Method::Rectangle,
            };
            wire::write_assignment(&mut s, &unbounded).await.unwrap();
            s
        });

        let err = run_worker(&options(addr), None).await.unwrap_err();
        let _keep_open = coordinator.await.unwrap();
        assert!(matches!(
            err,
            ClientError::Protocol(JobError::NonFiniteBounds { .. })
        ));
    }

    #[tokio::test]
    async fn coordinator_closing_early_is_a_receive_error() {
        let (listener, addr) = loopback().await;
        tokio::spawn(async move {
            let (s, _) = listener.accept().await.unwrap();
            drop(s);
        });

        let err = run_worker(&options(addr), None).await.unwrap_err();
        assert!(matches!(err, ClientError::Receive(_)));
    }
}
