//! Model fitting.
//!
//! Responsibilities:
//!
//! - least-squares objective over a piecewise-linear parameter vector
//! - `SegmentedRegressor`: validation, minimization, fitted-state tracking
//! - structured per-segment summary

pub mod objective;
pub mod regressor;
pub mod summary;

pub use objective::*;
pub use regressor::*;
pub use summary::*;
