//! Piecewise-linear model primitives.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic over the minimizer.

pub mod breakpoints;
pub mod piecewise;

pub use breakpoints::*;
pub use piecewise::*;
