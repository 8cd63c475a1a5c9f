/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the Quadra-O coordinator.
//!
//! Two types model the two failure layers:
//!
//! * [`CoordinatorError`]: fatal; returned from
//!   [`Coordinator::run()`](super::Coordinator::run) before any work was
//!   distributed.
//! * [`WorkerFailure`]: isolated to one worker after distribution began.
//!   Collected into the final [`JobReport`](super::JobReport) instead of
//!   aborting the run.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::job::JobError;
use crate::wire::WireError;

// ── Per-worker failures ───────────────────────────────────────────────────────

/// Protocol stage during which a worker was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Sending the [`WorkAssignment`](crate::job::WorkAssignment).
    Dispatch,
    /// Waiting for the partial result.
    Collect,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Dispatch => f.write_str("dispatch"),
            Stage::Collect => f.write_str("collect"),
        }
    }
}

/// Why a worker stopped contributing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureReason {
    /// The connection failed or closed (the `ConnectionError` class).
    #[error("connection error: {0}")]
    Connection(String),

    /// The peer sent a malformed payload (the `ProtocolError` class).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No partial result arrived within the configured result timeout.
    #[error("no result after {:.1}s", .0.as_secs_f64())]
    TimedOut(Duration),

    /// The task collecting this worker's result panicked or was aborted.
    #[error("collection aborted: {0}")]
    TaskAborted(String),
}

impl From<WireError> for FailureReason {
    fn from(err: WireError) -> Self {
        if err.is_transport() {
            FailureReason::Connection(err.to_string())
        } else {
            FailureReason::Protocol(err.to_string())
        }
    }
}

/// A worker excluded from the sum, with enough context to diagnose it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("worker {worker} lost during {stage}: {reason}")]
pub struct WorkerFailure {
    /// Registration order of the worker (0 = submitter).
    pub worker: usize,
    pub stage: Stage,
    pub reason: FailureReason,
}

// ── Fatal coordinator errors ──────────────────────────────────────────────────

/// Errors that abort the whole run.
///
/// All of them happen before a valid job exists or before any assignment was
/// sent; nothing has been distributed, so there is no partial sum to report.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The listen endpoint could not be bound.
    #[error("failed to listen on {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Accepting the submitter's connection failed.
    #[error("failed to accept the submitting worker: {0}")]
    SubmitterAccept(#[source] io::Error),

    /// The submitter disconnected before a full job frame arrived.
    #[error("failed to receive the job from the submitting worker: {0}")]
    SubmitterRead(#[source] io::Error),

    /// The submitted frame was malformed (e.g. an unknown method id).
    #[error("submitted job frame is malformed: {0}")]
    Protocol(#[source] WireError),

    /// The submitted job violates an invariant (the `InvalidJobError` class).
    #[error("submitted job is invalid: {0}")]
    InvalidJob(#[from] JobError),

    /// Partitioning was asked to split the job across zero workers.
    #[error("no registered workers to distribute the job to")]
    EmptyRegistry,
}

impl CoordinatorError {
    /// Classify a failure to read the submitter's frame.
    pub(crate) fn from_submission(err: WireError) -> Self {
        match err {
            WireError::Io(io) => CoordinatorError::SubmitterRead(io),
            other => CoordinatorError::Protocol(other),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
