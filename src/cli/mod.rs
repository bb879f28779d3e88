//! Command-line parsing for the segmented regression tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{MinimizerKind, ParamLayout};
use crate::models::Breakpoints;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "segreg", version, about = "Segmented linear regression with fixed breakpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a CSV of (x, y) observations, print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Fit a seeded synthetic three-segment sample.
    Demo(DemoArgs),
    /// Evaluate a saved model JSON at x values read from a CSV.
    Predict(PredictArgs),
}

/// Options for fitting a CSV file.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Input CSV with a header row.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Comma-separated breakpoints, e.g. `4,7`. An empty string fits a single line.
    #[arg(short, long, allow_hyphen_values = true)]
    pub breakpoints: Breakpoints,

    /// Column holding x.
    #[arg(long, default_value = "x")]
    pub x_col: String,

    /// Column holding y.
    #[arg(long, default_value = "y")]
    pub y_col: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Options for the synthetic demo.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of sample points.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub n: usize,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Smallest sampled x.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub x_min: f64,

    /// Largest sampled x.
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    pub x_max: f64,

    /// Breakpoints used for the fit (the sample itself always breaks at 4 and 7).
    #[arg(short, long, default_value = "4,7", allow_hyphen_values = true)]
    pub breakpoints: Breakpoints,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Fit options shared by `fit` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Minimizer backend.
    #[arg(long, value_enum, default_value_t = MinimizerKind::Bfgs)]
    pub minimizer: MinimizerKind,

    /// How (intercept, slope) pairs map onto segments.
    #[arg(long, value_enum, default_value_t = ParamLayout::PerSegment)]
    pub layout: ParamLayout,

    /// Override the minimizer's iteration cap.
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Override the minimizer's convergence tolerance.
    #[arg(long = "tol")]
    pub tolerance: Option<f64>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-observation fitted values and residuals to CSV.
    #[arg(long)]
    pub export_predictions: Option<PathBuf>,

    /// Export the model (breakpoints + coefficients + fitted grid) to JSON.
    #[arg(long)]
    pub export_model: Option<PathBuf>,
}

/// Options for predicting from a saved model.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Model JSON produced by `segreg fit --export-model`.
    #[arg(short, long, value_name = "JSON")]
    pub model: PathBuf,

    /// CSV with the x values to evaluate.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Column holding x.
    #[arg(long, default_value = "x")]
    pub x_col: String,

    /// Output CSV (`x,y_fit`); printed to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
