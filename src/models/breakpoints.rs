//! Breakpoints and the segments they induce on the x-axis.
//!
//! `k` breakpoints `b_1 <= ... <= b_k` give `k + 1` segments. A point `x`
//! belongs to the segment whose index equals the number of breakpoints `<= x`,
//! so a point sitting exactly on a breakpoint starts the next segment.

use serde::{Deserialize, Serialize};

use crate::error::RegressionError;

/// Sorted, finite breakpoints. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Breakpoints(Vec<f64>);

impl Breakpoints {
    /// Build from breakpoints in any order.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, RegressionError> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(RegressionError::InvalidBreakpoint { value });
        }
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.0.len() + 1
    }

    /// Length of a parameter vector for these breakpoints: one (intercept, slope) pair per segment.
    pub fn param_len(&self) -> usize {
        2 * self.segment_count()
    }

    /// Segment index of a single x value.
    pub fn segment_of(&self, x: f64) -> usize {
        self.0.partition_point(|&b| b <= x)
    }

    /// Describe the x-range covered by segment `index`.
    pub fn range_of(&self, index: usize) -> SegmentRange {
        let last = self.segment_count() - 1;
        match (index, self.0.as_slice()) {
            (_, []) => SegmentRange::All,
            (0, [first, ..]) => SegmentRange::AtMost(*first),
            (i, bps) if i >= last => SegmentRange::Above(bps[bps.len() - 1]),
            (i, bps) => SegmentRange::Between(bps[i - 1], bps[i]),
        }
    }
}

impl TryFrom<Vec<f64>> for Breakpoints {
    type Error = RegressionError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Breakpoints> for Vec<f64> {
    fn from(value: Breakpoints) -> Self {
        value.0
    }
}

impl std::str::FromStr for Breakpoints {
    type Err = String;

    /// Parse a comma-separated list such as `4,7`. An empty string means no breakpoints.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|e| format!("invalid breakpoint '{part}': {e}"))
            })
            .collect::<Result<Vec<f64>, String>>()?;
        Breakpoints::new(values).map_err(|e| e.to_string())
    }
}

/// Label for the x-range of one segment, as shown in the model summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentRange {
    /// The only segment when there are no breakpoints.
    All,
    /// First segment: `X <= b_1`.
    AtMost(f64),
    /// Interior segment: `b_{i-1} < X <= b_i`.
    Between(f64, f64),
    /// Last segment: `X > b_k`.
    Above(f64),
}

impl std::fmt::Display for SegmentRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentRange::All => write!(f, "all X"),
            SegmentRange::AtMost(b) => write!(f, "X <= {b}"),
            SegmentRange::Between(lo, hi) => write!(f, "{lo} < X <= {hi}"),
            SegmentRange::Above(b) => write!(f, "X > {b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_are_sorted_and_keep_duplicates() {
        let bps = Breakpoints::new([7.0, 4.0, 7.0]).unwrap();
        assert_eq!(bps.as_slice(), &[4.0, 7.0, 7.0]);
        assert_eq!(bps.segment_count(), 4);
        assert_eq!(bps.param_len(), 8);
    }

    #[test]
    fn non_finite_breakpoint_is_rejected() {
        let err = Breakpoints::new([1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, RegressionError::InvalidBreakpoint { .. }));
    }

    #[test]
    fn point_on_breakpoint_starts_next_segment() {
        let bps = Breakpoints::new([4.0, 7.0]).unwrap();
        assert_eq!(bps.segment_of(3.999), 0);
        assert_eq!(bps.segment_of(4.0), 1);
        assert_eq!(bps.segment_of(6.5), 1);
        assert_eq!(bps.segment_of(7.0), 2);
        assert_eq!(bps.segment_of(100.0), 2);
    }

    #[test]
    fn range_labels() {
        let bps = Breakpoints::new([4.0, 7.5]).unwrap();
        assert_eq!(bps.range_of(0).to_string(), "X <= 4");
        assert_eq!(bps.range_of(1).to_string(), "4 < X <= 7.5");
        assert_eq!(bps.range_of(2).to_string(), "X > 7.5");

        let none = Breakpoints::new(Vec::<f64>::new()).unwrap();
        assert_eq!(none.range_of(0), SegmentRange::All);
    }

    #[test]
    fn parse_comma_separated() {
        let bps: Breakpoints = "7, 4".parse().unwrap();
        assert_eq!(bps.as_slice(), &[4.0, 7.0]);
        let empty: Breakpoints = "".parse().unwrap();
        assert!(empty.is_empty());
        assert!("4,abc".parse::<Breakpoints>().is_err());
    }
}
