/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Even, contiguous partitioning of the job interval.
//!
//! For `n` workers, `width = (upper - lower) / n` and worker `i` receives
//! `[lower + i * width, lower + (i + 1) * width)`.  The last assignment's end
//! is pinned to `upper` exactly, so rounding drift never leaves a gap or an
//! overshoot at the boundary.  Adjacent assignments share their boundary value
//! bit-for-bit because each `sub_end` is the next `sub_start`.

use crate::job::{IntegrationJob, WorkAssignment};

use super::error::CoordinatorError;

/// Split `job` into `worker_count` assignments in registration order.
///
/// Deterministic: the same `(job, worker_count)` always yields the same
/// assignments.
///
/// # Errors
/// [`CoordinatorError::EmptyRegistry`] when `worker_count == 0`.
pub fn distribute(
    job: &IntegrationJob,
    worker_count: usize,
) -> Result<Vec<WorkAssignment>, CoordinatorError> {
    if worker_count == 0 {
        return Err(CoordinatorError::EmptyRegistry);
    }

    let width = job.width() / worker_count as f64;
    let last = worker_count - 1;

    let mut assignments = Vec::with_capacity(worker_count);
    let mut sub_start = job.lower_bound;
    for i in 0..worker_count {
        let sub_end = if i == last {
            job.upper_bound
        } else {
            job.lower_bound + (i + 1) as f64 * width
        };
        assignments.push(WorkAssignment {
            sub_start,
            sub_end,
            step: job.step,
            method: job.method,
        });
        sub_start = sub_end;
    }
    Ok(assignments)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Method;
    use proptest::prelude::*;

    fn job(lower: f64, upper: f64) -> IntegrationJob {
        IntegrationJob::new(lower, upper, 0.01, Method::Rectangle).unwrap()
    }

    // ── Fixed cases ───────────────────────────────────────────────────────────

    #[test]
    fn four_workers_get_width_two_each() {
        let a = distribute(&job(2.0, 10.0), 4).unwrap();
        assert_eq!(a.len(), 4);
        let bounds: Vec<(f64, f64)> = a.iter().map(|x| (x.sub_start, x.sub_end)).collect();
        assert_eq!(
            bounds,
            vec![(2.0, 4.0), (4.0, 6.0), (6.0, 8.0), (8.0, 10.0)]
        );
        for x in &a {
            assert_eq!(x.width(), 2.0);
            assert_eq!(x.step, 0.01);
            assert_eq!(x.method, Method::Rectangle);
        }
    }

    #[test]
    fn single_worker_gets_whole_interval() {
        let a = distribute(&job(2.0, 10.0), 1).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].sub_start, 2.0);
        assert_eq!(a[0].sub_end, 10.0);
    }

    #[test]
    fn zero_workers_is_an_error() {
        assert!(matches!(
            distribute(&job(2.0, 10.0), 0),
            Err(CoordinatorError::EmptyRegistry)
        ));
    }

    #[test]
    fn last_end_is_pinned_despite_drift() {
        // 0.1 is not representable; 3 × (0.3 / 3) drifts without pinning.
        let a = distribute(&job(2.0, 2.3), 3).unwrap();
        assert_eq!(a[2].sub_end, 2.3);
    }

    // ── Properties ────────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn assignments_tile_the_interval(
            lower in 2.0f64..1_000.0,
            span in 1e-3f64..1_000.0,
            n in 1usize..64,
        ) {
            let j = job(lower, lower + span);
            let a = distribute(&j, n).unwrap();

            prop_assert_eq!(a.len(), n);
            prop_assert_eq!(a[0].sub_start, j.lower_bound);
            prop_assert_eq!(a[n - 1].sub_end, j.upper_bound);
            for pair in a.windows(2) {
                prop_assert_eq!(pair[0].sub_end, pair[1].sub_start);
            }

            let total: f64 = a.iter().map(WorkAssignment::width).sum();
            prop_assert!((total - j.width()).abs() <= 1e-9 * j.width().max(1.0));
        }

        #[test]
        fn partitioning_is_idempotent(
            lower in 2.0f64..100.0,
            span in 1e-3f64..100.0,
            n in 1usize..32,
        ) {
            let j = job(lower, lower + span);
            prop_assert_eq!(distribute(&j, n).unwrap(), distribute(&j, n).unwrap());
        }
    }
}
