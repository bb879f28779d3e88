//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for prediction

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::Breakpoints;

/// Which minimizer backend drives the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MinimizerKind {
    /// Quasi-Newton with finite-difference gradients.
    Bfgs,
    /// Derivative-free downhill simplex.
    NelderMead,
    /// Damped Newton with a finite-difference Hessian.
    Newton,
}

impl MinimizerKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            MinimizerKind::Bfgs => "BFGS",
            MinimizerKind::NelderMead => "Nelder-Mead",
            MinimizerKind::Newton => "Damped Newton",
        }
    }
}

/// How (intercept, slope) pairs in the parameter vector map onto segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ParamLayout {
    /// Segment `i` always reads slots `2i` and `2i + 1`, whether or not it has points.
    #[default]
    PerSegment,
    /// Pairs are consumed in order by non-empty segments only.
    ///
    /// With an empty interior segment the later segments read pairs meant for
    /// earlier ones. Only useful to reproduce results produced that way.
    Packed,
}

/// A single (x, y) observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

/// A per-observation fitted result (used for exports and plots).
#[derive(Debug, Clone, Copy)]
pub struct ObservationResidual {
    pub point: Observation,
    pub y_fit: f64,
    pub residual: f64,
    /// Zero-based segment index the point falls into.
    pub segment: usize,
}

/// Summary stats about the points actually used for fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DatasetStats {
    /// Ranges over `points`; `None` if there are no points or a value is not finite.
    pub fn from_points(points: &[Observation]) -> Option<Self> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for p in points {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }

        if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }

        Some(Self {
            n_points: points.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
    pub iterations: usize,
    pub converged: bool,
}

/// A full fit run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub breakpoints: Breakpoints,
    pub minimizer: MinimizerKind,
    pub layout: ParamLayout,
    /// Override for the minimizer's iteration cap.
    pub max_iter: Option<usize>,
    /// Override for the minimizer's convergence tolerance.
    pub tolerance: Option<f64>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_predictions: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

/// Settings for the synthetic demo sample.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub n: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the Gaussian noise added to y.
    pub noise: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            n: 100,
            x_min: 0.0,
            x_max: 10.0,
            noise: 0.5,
            seed: 42,
        }
    }
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub fitted_at: DateTime<Utc>,
    pub breakpoints: Breakpoints,
    pub layout: ParamLayout,
    pub minimizer: MinimizerKind,
    pub coefficients: Vec<f64>,
    pub fit_quality: FitQuality,
    pub grid: ModelGrid,
}

/// Fitted values on an evenly spaced x grid, for quick plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
