//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`MinimizerKind`, `ParamLayout`)
//! - observation points and residuals (`Observation`, `ObservationResidual`)
//! - run configuration and saved-model schema (`FitConfig`, `ModelFile`)

pub mod types;

pub use types::*;
