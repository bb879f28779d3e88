//! Structured model summary.
//!
//! Segment `i` (zero-based) reads its intercept from slot `2i` and its slope
//! from slot `2i + 1` of the coefficient vector, whatever layout was used to fit.

use crate::models::{Breakpoints, SegmentRange, segment_line};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    /// One-based segment number, as printed.
    pub number: usize,
    pub range: SegmentRange,
    pub intercept: f64,
    pub slope: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub segments: Vec<SegmentSummary>,
}

impl SummaryReport {
    pub fn new(breakpoints: &Breakpoints, coefficients: &[f64]) -> Self {
        let segments = (0..breakpoints.segment_count())
            .map(|i| {
                let (intercept, slope) = segment_line(coefficients, i);
                SegmentSummary {
                    number: i + 1,
                    range: breakpoints.range_of(i),
                    intercept,
                    slope,
                }
            })
            .collect();
        Self { segments }
    }
}

impl std::fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Segmented Regression Model Summary")?;
        writeln!(f, "=================================")?;
        for s in &self.segments {
            writeln!(
                f,
                "Segment {} ({}): Intercept = {:.4}, Slope = {:.4}",
                s.number, s.range, s.intercept, s.slope
            )?;
        }
        Ok(())
    }
}
