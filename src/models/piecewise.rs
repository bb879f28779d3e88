//! Piecewise-linear model evaluation.
//!
//! The fitter relies on two primitive operations:
//! - split a sorted x slice into one contiguous index range per segment
//! - evaluate `intercept + slope * x` for every point given a flat parameter vector
//!
//! The parameter vector holds consecutive `(intercept, slope)` pairs, one per
//! segment in ascending x order.

use std::ops::Range;

use crate::domain::ParamLayout;
use crate::models::Breakpoints;

/// Split sorted `x` into `breakpoints.segment_count()` contiguous ranges.
///
/// Each breakpoint `b` cuts `x` at its leftmost insertion point, i.e. the number
/// of points strictly less than `b`. Ranges may be empty and together cover
/// `0..x.len()` in order.
///
/// `x` must be sorted ascending; unsorted input still yields contiguous ranges
/// but they no longer match x-range membership.
pub fn partition(x: &[f64], breakpoints: &Breakpoints) -> Vec<Range<usize>> {
    let mut out = Vec::with_capacity(breakpoints.segment_count());
    let mut start = 0;
    for &b in breakpoints.as_slice() {
        let end = x.partition_point(|&v| v < b).max(start);
        out.push(start..end);
        start = end;
    }
    out.push(start..x.len());
    out
}

/// Read the `(intercept, slope)` pair stored at `slot`.
pub fn segment_line(params: &[f64], slot: usize) -> (f64, f64) {
    (params[2 * slot], params[2 * slot + 1])
}

/// Evaluate the piecewise-linear model at every point of sorted `x`.
///
/// # Panics
/// Panics if `params` is shorter than `breakpoints.param_len()`.
pub fn evaluate(x: &[f64], params: &[f64], breakpoints: &Breakpoints, layout: ParamLayout) -> Vec<f64> {
    let mut out = Vec::with_capacity(x.len());
    let mut packed_slot = 0;

    for (segment, range) in partition(x, breakpoints).into_iter().enumerate() {
        let slot = match layout {
            ParamLayout::PerSegment => segment,
            ParamLayout::Packed => {
                if range.is_empty() {
                    continue;
                }
                packed_slot += 1;
                packed_slot - 1
            }
        };
        let (intercept, slope) = segment_line(params, slot);
        out.extend(x[range].iter().map(|&v| intercept + slope * v));
    }

    out
}
