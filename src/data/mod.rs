//! Data sources for the pipeline.
//!
//! - synthetic demo samples (`sample`)

pub mod sample;

pub use sample::*;
