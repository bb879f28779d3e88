//! CSV exports.
//!
//! Both exports are plain CSV with a header row, meant to be easy to consume in
//! spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ObservationResidual;
use crate::error::AppError;

/// Write per-observation fitted values and residuals.
pub fn write_predictions_csv(path: &Path, residuals: &[ObservationResidual]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_predictions(&mut file, residuals)
}

/// Write predictions for bare x values (the `predict` command).
pub fn write_fitted_csv(path: &Path, x: &[f64], y_fit: &[f64]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_fitted(&mut file, x, y_fit)
}

pub fn write_predictions<W: Write>(out: &mut W, residuals: &[ObservationResidual]) -> Result<(), AppError> {
    writeln!(out, "x,y_obs,y_fit,residual,segment")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writeln!(
            out,
            "{},{},{:.6},{:.6},{}",
            r.point.x, r.point.y, r.y_fit, r.residual, r.segment
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

pub fn write_fitted<W: Write>(out: &mut W, x: &[f64], y_fit: &[f64]) -> Result<(), AppError> {
    writeln!(out, "x,y_fit").map_err(|e| AppError::new(2, format!("Failed to write output CSV header: {e}")))?;
    for (x, y) in x.iter().zip(y_fit) {
        writeln!(out, "{x},{y:.6}").map_err(|e| AppError::new(2, format!("Failed to write output CSV row: {e}")))?;
    }
    Ok(())
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}
