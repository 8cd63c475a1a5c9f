/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core job data structures shared by Quadra-O and Quadra-N.
//!
//! Two distinct types model the two sides of the distribution pipeline:
//!
//! ```text
//! submitter ──(JobSubmission)──►  IntegrationJob  ──(partition)──►  WorkAssignment  ──(wire)──►  worker
//!                                  ↑ input, validated once          ↑ output, one per worker
//! ```
//!
//! # Ownership model
//! `IntegrationJob` is `Copy` and immutable once validated.  The coordinator
//! receives it from the submitter, checks it with [`IntegrationJob::validate`]
//! and from then on only derives [`WorkAssignment`]s from it.

use std::fmt;

use thiserror::Error;

/// Smallest admissible lower bound.
///
/// The integrand `1 / ln(x)` is singular at `x = 1` and negative below it, so
/// jobs are restricted to `[2, ∞)`.
pub const MIN_LOWER_BOUND: f64 = 2.0;

// ── Quadrature method ─────────────────────────────────────────────────────────

/// Numerical quadrature rule applied to a sub-interval.
///
/// Carried as a typed enum through the whole pipeline; the integer form only
/// exists at the wire boundary (`1` = Rectangle, `2` = Trapezoidal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Left-endpoint rectangle rule.
    #[default]
    Rectangle,
    /// Trapezoidal rule.
    Trapezoidal,
}

impl Method {
    /// Convert to the integer value carried on the wire.
    pub fn to_wire_int(self) -> i32 {
        match self {
            Method::Rectangle => 1,
            Method::Trapezoidal => 2,
        }
    }

    /// Parse the wire integer.  Unlike the job bounds there is no sensible
    /// default here, so unknown values return `None` and the caller decides
    /// how to report the protocol violation.
    pub fn from_wire_int(v: i32) -> Option<Self> {
        match v {
            1 => Some(Method::Rectangle),
            2 => Some(Method::Trapezoidal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Rectangle => "Rectangle",
            Method::Trapezoidal => "Trapezoidal",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Validation errors ─────────────────────────────────────────────────────────

/// Why a job or an assignment failed validation.
///
/// Every variant carries the offending values so the caller can log them
/// without re-deriving anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    /// `step` is zero, negative or NaN.
    #[error("step must be positive (got {step})")]
    NonPositiveStep { step: f64 },

    /// The interval is empty, reversed or contains NaN.
    #[error("lower bound {lower} must be less than upper bound {upper}")]
    EmptyInterval { lower: f64, upper: f64 },

    /// The lower bound is outside the integrand's domain.
    #[error("lower bound {lower} must be >= {}", MIN_LOWER_BOUND)]
    LowerBoundOutOfDomain { lower: f64 },

    /// A bound is infinite.
    #[error("bounds must be finite (got [{lower}, {upper}])")]
    NonFiniteBounds { lower: f64, upper: f64 },
}

// ── IntegrationJob ────────────────────────────────────────────────────────────

/// The single job a coordinator run computes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationJob {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub step: f64,
    pub method: Method,
}

impl IntegrationJob {
    /// Build a job and validate it in one go.
    pub fn new(
        lower_bound: f64,
        upper_bound: f64,
        step: f64,
        method: Method,
    ) -> Result<Self, JobError> {
        let job = Self {
            lower_bound,
            upper_bound,
            step,
            method,
        };
        job.validate()?;
        Ok(job)
    }

    /// Check the job invariants.
    ///
    /// The comparisons are written in negated form so that NaN fails every
    /// check instead of slipping through.
    pub fn validate(&self) -> Result<(), JobError> {
        if !(self.step > 0.0) {
            return Err(JobError::NonPositiveStep { step: self.step });
        }
        if !(self.lower_bound >= MIN_LOWER_BOUND) {
            return Err(JobError::LowerBoundOutOfDomain {
                lower: self.lower_bound,
            });
        }
        if !(self.lower_bound < self.upper_bound) {
            return Err(JobError::EmptyInterval {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        if !self.upper_bound.is_finite() {
            return Err(JobError::NonFiniteBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        Ok(())
    }

    /// Width of the whole integration interval.
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

impl fmt::Display for IntegrationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] step={} method={}",
            self.lower_bound, self.upper_bound, self.step, self.method
        )
    }
}

// ── WorkAssignment ────────────────────────────────────────────────────────────

/// The contiguous slice of the job handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkAssignment {
    pub sub_start: f64,
    pub sub_end: f64,
    pub step: f64,
    pub method: Method,
}

impl WorkAssignment {
    /// Check an assignment received from the coordinator.
    ///
    /// Weaker than [`IntegrationJob::validate`]: only the quadrature
    /// preconditions (positive step, finite non-empty range) are enforced.
    pub fn validate(&self) -> Result<(), JobError> {
        if !(self.step > 0.0) {
            return Err(JobError::NonPositiveStep { step: self.step });
        }
        if !(self.sub_start < self.sub_end) {
            return Err(JobError::EmptyInterval {
                lower: self.sub_start,
                upper: self.sub_end,
            });
        }
        if !self.sub_start.is_finite() || !self.sub_end.is_finite() {
            return Err(JobError::NonFiniteBounds {
                lower: self.sub_start,
                upper: self.sub_end,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.sub_end - self.sub_start
    }
}

impl fmt::Display for WorkAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] step={} method={}",
            self.sub_start, self.sub_end, self.step, self.method
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
