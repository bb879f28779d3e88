//! Reporting utilities: residuals, fit diagnostics, and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitQuality, Observation, ObservationResidual};
use crate::error::AppError;
use crate::fit::{FitRun, SegmentedRegressor};
use crate::optim::Minimizer;

/// Compute fitted values and residuals for each (x-sorted) observation.
pub fn compute_residuals<M: Minimizer>(
    points: &[Observation],
    model: &SegmentedRegressor<M>,
) -> Result<Vec<ObservationResidual>, AppError> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let fitted = model.predict(&xs)?;

    let breakpoints = model.breakpoints();
    let mut out = Vec::with_capacity(points.len());
    for (p, y_fit) in points.iter().zip(fitted) {
        if !y_fit.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(ObservationResidual {
            point: *p,
            y_fit,
            residual: p.y - y_fit,
            segment: breakpoints.segment_of(p.x),
        });
    }
    Ok(out)
}

/// SSE, RMSE and R² over `residuals`, plus the minimizer's run info if any.
///
/// R² is 1 when y is constant and fit exactly, 0 when y is constant and it is not.
pub fn fit_quality(residuals: &[ObservationResidual], run: Option<&FitRun>) -> FitQuality {
    let n = residuals.len();
    let sse: f64 = residuals.iter().map(|r| r.residual * r.residual).sum();
    let rmse = if n > 0 { (sse / n as f64).sqrt() } else { 0.0 };

    let mean = if n > 0 {
        residuals.iter().map(|r| r.point.y).sum::<f64>() / n as f64
    } else {
        0.0
    };
    let sst: f64 = residuals.iter().map(|r| (r.point.y - mean).powi(2)).sum();
    let r_squared = if sst > 0.0 {
        1.0 - sse / sst
    } else if sse == 0.0 {
        1.0
    } else {
        0.0
    };

    FitQuality {
        sse,
        rmse,
        r_squared,
        n,
        iterations: run.map_or(0, |r| r.iterations),
        converged: run.is_none_or(|r| r.converged),
    }
}
