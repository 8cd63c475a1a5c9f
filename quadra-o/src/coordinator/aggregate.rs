/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Thread-safe accumulator for partial results.
//!
//! [`Aggregator`] is an owned value handed (behind an `Arc`) to whichever tasks
//! collect results.  Each [`add`](Aggregator::add) is one atomic mutation;
//! [`snapshot`](Aggregator::snapshot) reads a consistent copy.
//!
//! The sum is compensated (Neumaier), which keeps the result stable regardless
//! of the order in which workers happen to report.

use std::sync::{Mutex, PoisonError};

/// Final or intermediate result of the job.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregateResult {
    pub sum: f64,
    /// Number of workers whose partial result was folded into `sum`.
    pub contributors: usize,
}

#[derive(Debug, Default)]
struct State {
    sum: f64,
    compensation: f64,
    contributors: usize,
}

/// Accumulates partial results under mutual exclusion.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<State>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one worker's contribution into the total.
    pub fn add(&self, contribution: f64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let t = state.sum + contribution;
        if state.sum.abs() >= contribution.abs() {
            state.compensation += (state.sum - t) + contribution;
        } else {
            state.compensation += (contribution - t) + state.sum;
        }
        state.sum = t;
        state.contributors += 1;
    }

    /// Consistent copy of the current total.
    pub fn snapshot(&self) -> AggregateResult {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        AggregateResult {
            sum: state.sum + state.compensation,
            contributors: state.contributors,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
