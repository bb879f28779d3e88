//! Shared "fit pipeline" logic used by the `fit` and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! observations -> fit -> residuals -> diagnostics -> summary
//!
//! The command handlers can then focus on presentation and exports.

use log::info;

use crate::data::{SampleData, generate_sample, linspace};
use crate::domain::{FitConfig, FitQuality, ModelFile, ObservationResidual, SampleConfig};
use crate::error::AppError;
use crate::fit::{FittedModel, SegmentedRegressor, SummaryReport};
use crate::io::ingest::IngestedData;
use crate::io::model::build_model_file;
use crate::report::{compute_residuals, fit_quality};

/// Number of x values used to draw the fitted curve.
const CURVE_POINTS: usize = 201;

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub model: FittedModel,
    pub residuals: Vec<ObservationResidual>,
    pub quality: FitQuality,
    pub summary: SummaryReport,
    /// `(x, y_fit)` across the data's x range, for plotting.
    pub curve: Vec<(f64, f64)>,
}

impl RunOutput {
    /// Portable model file for this run.
    pub fn model_file(&self, config: &FitConfig) -> ModelFile {
        build_model_file(
            &config.breakpoints,
            config.layout,
            config.minimizer,
            self.model.coefficients(),
            self.quality.clone(),
            self.ingest.stats.x_min,
            self.ingest.stats.x_max,
        )
    }
}

/// Fit already-ingested observations.
pub fn run_fit(ingest: IngestedData, config: &FitConfig) -> Result<RunOutput, AppError> {
    let minimizer = config.minimizer.build(config.max_iter, config.tolerance);
    let mut regressor =
        SegmentedRegressor::with_minimizer(config.breakpoints.clone(), minimizer).with_layout(config.layout);

    info!(
        "fitting {} points with {} breakpoints using {}",
        ingest.points.len(),
        config.breakpoints.len(),
        config.minimizer.display_name()
    );
    regressor.fit(&ingest.xs(), &ingest.ys())?;

    let model = regressor.fitted()?.clone();
    let residuals = compute_residuals(&ingest.points, &regressor)?;
    let quality = fit_quality(&residuals, model.run());
    let summary = regressor.summary()?;
    info!(
        "fit done: sse={:.6} r2={:.4} iterations={} converged={}",
        quality.sse, quality.r_squared, quality.iterations, quality.converged
    );

    let curve_x = linspace(ingest.stats.x_min, ingest.stats.x_max, CURVE_POINTS);
    let curve_y = regressor.predict(&curve_x)?;
    let curve = curve_x.into_iter().zip(curve_y).collect();

    Ok(RunOutput {
        ingest,
        model,
        residuals,
        quality,
        summary,
        curve,
    })
}

/// Generate the synthetic sample and fit it.
pub fn run_demo(sample_config: &SampleConfig, config: &FitConfig) -> Result<(SampleData, RunOutput), AppError> {
    info!(
        "generating {} sample points (seed={}, noise={})",
        sample_config.n, sample_config.seed, sample_config.noise
    );
    let sample = generate_sample(sample_config)?;
    let ingest = IngestedData::from_points(sample.points.clone())?;
    let run = run_fit(ingest, config)?;
    Ok((sample, run))
}

/// Evaluate a saved model at sorted `xs`.
pub fn run_predict(model: &ModelFile, xs: &[f64]) -> Result<Vec<f64>, AppError> {
    let regressor = SegmentedRegressor::restore(
        model.breakpoints.clone(),
        model.layout,
        model.coefficients.clone(),
        model.minimizer.build(None, None),
    )?;
    info!("predicting {} x values", xs.len());
    Ok(regressor.predict(xs)?)
}
