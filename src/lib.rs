//! `segmented-regression` library crate.
//!
//! Piecewise-linear least squares with fixed breakpoints. The binary
//! (`segreg`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the regressor can be embedded without the CLI layers

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod models;
pub mod optim;
pub mod plot;
pub mod report;

pub use error::{AppError, RegressionError};
pub use fit::{FitState, FittedModel, SegmentedRegressor, SummaryReport};
pub use models::Breakpoints;
