/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Quadra-O coordinator: registration, partitioning, dispatch, aggregation.
//!
//! [`Coordinator::run`] performs exactly one job:
//!
//! ```text
//! open_registration ──► distribute ──► dispatch ──► collect ──► JobReport
//!   (fatal errors)        (pure)      (per-worker failures isolated)
//! ```
//!
//! The worker list is frozen into a [`Registration`] when the window closes
//! and moved by value into dispatch.  The [`Aggregator`] is shared only with
//! the collection tasks of this run.
//!
//! # Example
//! ```rust,ignore
//! let coordinator = Coordinator::new(CoordinatorConfig::default());
//! let report = coordinator.run().await?;
//! println!("{report}");
//! ```

pub mod aggregate;
pub mod error;
pub mod partition;
pub mod registration;

pub use aggregate::{AggregateResult, Aggregator};
pub use error::{CoordinatorError, FailureReason, Stage, WorkerFailure};
pub use partition::distribute;
pub use registration::{open_registration, Registration, WorkerHandle};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::CoordinatorConfig;
use crate::job::{IntegrationJob, WorkAssignment};
use crate::wire;

// ── JobReport ─────────────────────────────────────────────────────────────────

/// Everything the operator needs to know about a finished run.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: IntegrationJob,
    /// One assignment per registered worker, in registration order.
    pub assignments: Vec<WorkAssignment>,
    pub result: AggregateResult,
    /// Workers excluded from the sum, ordered by worker id.
    pub failures: Vec<WorkerFailure>,
}

impl JobReport {
    /// Number of workers the job was partitioned across.
    pub fn registered(&self) -> usize {
        self.assignments.len()
    }

    /// `true` when every registered worker contributed.
    pub fn is_complete(&self) -> bool {
        self.result.contributors == self.registered()
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Job: {}", self.job)?;
        writeln!(
            f,
            "Final integration result: {} ({} of {} workers contributed)",
            self.result.sum,
            self.result.contributors,
            self.registered()
        )?;
        if !self.is_complete() {
            writeln!(f, "Partial sum – missing contributions:")?;
            for failure in &self.failures {
                writeln!(f, "  {failure}")?;
            }
        }
        Ok(())
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Runs one distributed integration job.
pub struct Coordinator {
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Bind the configured endpoint and run the job.
    pub async fn run(&self) -> Result<JobReport, CoordinatorError> {
        let listener = TcpListener::bind(&self.config.listen)
            .await
            .map_err(|source| CoordinatorError::Bind {
                endpoint: self.config.listen.clone(),
                source,
            })?;
        info!(endpoint = %self.config.listen, "Quadra-O listening");
        self.run_on(listener).await
    }

    /// Run the job on an already bound listener.
    ///
    /// The listener is dropped as soon as the registration window closes, so
    /// late connection attempts are refused rather than left hanging.
    pub async fn run_on(&self, listener: TcpListener) -> Result<JobReport, CoordinatorError> {
        let registration =
            open_registration(&listener, self.config.registration_window).await?;
        drop(listener);

        let Registration { job, workers } = registration;
        let assignments = distribute(&job, workers.len())?;

        info!(
            workers = workers.len(),
            width = job.width() / workers.len() as f64,
            "=== Distributing job ==="
        );

        let mut failures = Vec::new();
        let contributing = dispatch(workers, &assignments, &mut failures).await;

        let aggregator = Arc::new(Aggregator::new());
        collect(
            contributing,
            Arc::clone(&aggregator),
            self.config.result_timeout,
            &mut failures,
        )
        .await;

        failures.sort_by_key(|f| f.worker);
        let result = aggregator.snapshot();

        info!(
            sum = result.sum,
            contributors = result.contributors,
            registered = assignments.len(),
            "=== Job complete ==="
        );

        Ok(JobReport {
            job,
            assignments,
            result,
            failures,
        })
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Send each worker its assignment, in registration order.
///
/// Returns the workers that received their assignment.  A failed send drops
/// that worker's handle (closing its connection) and records a failure.
async fn dispatch(
    workers: Vec<WorkerHandle>,
    assignments: &[WorkAssignment],
    failures: &mut Vec<WorkerFailure>,
) -> Vec<WorkerHandle> {
    let mut contributing = Vec::with_capacity(workers.len());

    for (mut worker, assignment) in workers.into_iter().zip(assignments) {
        match wire::write_assignment(&mut worker.stream, assignment).await {
            Ok(()) => {
                info!(
                    worker = worker.order(),
                    peer = %worker.peer(),
                    range = %assignment,
                    "Assignment sent"
                );
                contributing.push(worker);
            }
            Err(e) => {
                let failure = WorkerFailure {
                    worker: worker.order(),
                    stage: Stage::Dispatch,
                    reason: e.into(),
                };
                warn!(peer = %worker.peer(), "{failure}");
                failures.push(failure);
            }
        }
    }

    contributing
}

// ── Collection ────────────────────────────────────────────────────────────────

/// Read one partial result from every worker concurrently.
///
/// Every worker ends up either in the aggregator or in `failures`, including
/// workers whose collection task panicked or was aborted.
async fn collect(
    workers: Vec<WorkerHandle>,
    aggregator: Arc<Aggregator>,
    timeout: Option<Duration>,
    failures: &mut Vec<WorkerFailure>,
) {
    let mut pending: BTreeSet<usize> = workers.iter().map(WorkerHandle::order).collect();
    let mut abnormal = None;

    let mut tasks = JoinSet::new();
    for worker in workers {
        tasks.spawn(collect_one(worker, Arc::clone(&aggregator), timeout));
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(order)) => {
                pending.remove(&order);
            }
            Ok(Err(failure)) => {
                pending.remove(&failure.worker);
                warn!("{failure}");
                failures.push(failure);
            }
            Err(e) => {
                warn!(error = %e, "Result collection task ended abnormally");
                abnormal = Some(e.to_string());
            }
        }
    }

    failures.extend(unaccounted(pending, abnormal));
}

/// Failures for workers whose collection task never reported back.
fn unaccounted(pending: BTreeSet<usize>, cause: Option<String>) -> Vec<WorkerFailure> {
    let cause = cause.unwrap_or_else(|| "collection task ended without a result".to_string());
    pending
        .into_iter()
        .map(|worker| {
            let failure = WorkerFailure {
                worker,
                stage: Stage::Collect,
                reason: FailureReason::TaskAborted(cause.clone()),
            };
            warn!("{failure}");
            failure
        })
        .collect()
}

async fn collect_one(
    mut worker: WorkerHandle,
    aggregator: Arc<Aggregator>,
    timeout: Option<Duration>,
) -> Result<usize, WorkerFailure> {
    let read = wire::read_result(&mut worker.stream);
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(r) => r.map_err(FailureReason::from),
            Err(_) => Err(FailureReason::TimedOut(limit)),
        },
        None => read.await.map_err(FailureReason::from),
    };

    match outcome {
        Ok(value) => {
            aggregator.add(value);
            info!(
                worker = worker.order(),
                peer = %worker.peer(),
                partial = value,
                "Partial result received"
            );
            Ok(worker.order())
        }
        Err(reason) => Err(WorkerFailure {
            worker: worker.order(),
            stage: Stage::Collect,
            reason,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
