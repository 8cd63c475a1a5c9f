/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure quadrature rules over the integrand `f(x) = 1 / ln(x)`.
//!
//! These are free functions rather than methods so they can be used and tested
//! independently of the worker client.
//!
//! Sample points are derived from an integer index (`start + i * step`) rather
//! than by repeatedly adding `step`, so rounding error does not accumulate
//! across a long sub-interval.  The final slice is clipped to `end`.

use crate::job::{Method, WorkAssignment};

/// The integrand.
pub fn integrand(x: f64) -> f64 {
    1.0 / x.ln()
}

/// Number of slices of width `step` needed to cover `[start, end)`.
fn slice_count(start: f64, end: f64, step: f64) -> u64 {
    if !(step > 0.0) || !(start < end) {
        return 0;
    }
    ((end - start) / step).ceil() as u64
}

/// Left-endpoint rectangle rule on `[start, end)`.
///
/// Returns `0.0` when `step <= 0` or the interval is empty.
pub fn rectangle(start: f64, end: f64, step: f64) -> f64 {
    let n = slice_count(start, end, step);
    let mut sum = 0.0;
    for i in 0..n {
        let x = start + i as f64 * step;
        if x >= end {
            break;
        }
        let width = step.min(end - x);
        sum += integrand(x) * width;
    }
    sum
}

/// Trapezoidal rule on `[start, end)`.
///
/// Returns `0.0` when `step <= 0` or the interval is empty.
pub fn trapezoidal(start: f64, end: f64, step: f64) -> f64 {
    let n = slice_count(start, end, step);
    let mut sum = 0.0;
    for i in 0..n {
        let x = start + i as f64 * step;
        if x >= end {
            break;
        }
        let next = (x + step).min(end);
        sum += (integrand(x) + integrand(next)) * (next - x) / 2.0;
    }
    sum
}

/// Dispatch on `method`.
pub fn integrate(start: f64, end: f64, step: f64, method: Method) -> f64 {
    match method {
        Method::Rectangle => rectangle(start, end, step),
        Method::Trapezoidal => trapezoidal(start, end, step),
    }
}

/// Compute the partial result for one assignment.
pub fn integrate_assignment(assignment: &WorkAssignment) -> f64 {
    integrate(
        assignment.sub_start,
        assignment.sub_end,
        assignment.step,
        assignment.method,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// li(10) − li(2), the exact value of ∫₂¹⁰ dx / ln x.
    const EXACT_2_10: f64 = 5.120_435_724_669_805;

    // ── rectangle ─────────────────────────────────────────────────────────────

    #[test]
    fn rectangle_approximates_log_integral() {
        let v = rectangle(2.0, 10.0, 0.01);
        // f is decreasing, so the left rule overestimates by about
        // h/2 * (f(2) - f(10)) ≈ 0.005.
        assert!(v > EXACT_2_10);
        assert!((v - EXACT_2_10).abs() < 0.01, "got {v}");
    }

    #[test]
    fn rectangle_single_slice() {
        let v = rectangle(2.0, 3.0, 1.0);
        assert!((v - integrand(2.0)).abs() < 1e-12);
    }

    #[test]
    fn rectangle_clips_last_slice() {
        // Two slices: [2, 2.75) full width, [2.75, 3) clipped to 0.25.
        let v = rectangle(2.0, 3.0, 0.75);
        let expected = integrand(2.0) * 0.75 + integrand(2.75) * 0.25;
        assert!((v - expected).abs() < 1e-12);
    }

    // ── trapezoidal ───────────────────────────────────────────────────────────

    #[test]
    fn trapezoidal_is_more_accurate_than_rectangle() {
        let r = rectangle(2.0, 10.0, 0.01);
        let t = trapezoidal(2.0, 10.0, 0.01);
        assert!((t - EXACT_2_10).abs() < (r - EXACT_2_10).abs());
        assert!((t - EXACT_2_10).abs() < 1e-4, "got {t}");
    }

    // ── preconditions ─────────────────────────────────────────────────────────

    #[test]
    fn degenerate_inputs_return_zero() {
        assert_eq!(rectangle(2.0, 10.0, 0.0), 0.0);
        assert_eq!(trapezoidal(2.0, 10.0, -1.0), 0.0);
        assert_eq!(rectangle(5.0, 5.0, 0.1), 0.0);
        assert_eq!(trapezoidal(6.0, 5.0, 0.1), 0.0);
    }

    // ── additivity ────────────────────────────────────────────────────────────

    #[test]
    fn split_interval_sums_to_whole() {
        // With a step that divides both halves exactly the split is lossless.
        let whole = trapezoidal(2.0, 10.0, 0.5);
        let split = trapezoidal(2.0, 6.0, 0.5) + trapezoidal(6.0, 10.0, 0.5);
        assert!((whole - split).abs() < 1e-12);
    }

    #[test]
    fn integrate_dispatches_on_method() {
        assert_eq!(
            integrate(2.0, 4.0, 0.1, Method::Rectangle),
            rectangle(2.0, 4.0, 0.1)
        );
        assert_eq!(
            integrate(2.0, 4.0, 0.1, Method::Trapezoidal),
            trapezoidal(2.0, 4.0, 0.1)
        );
    }
}
