//! Read/write model JSON files.
//!
//! Model JSON is the portable representation of a fitted segmented line:
//! - breakpoints, parameter layout and coefficients
//! - fit diagnostics and the minimizer that produced them
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::data::linspace;
use crate::domain::{FitQuality, MinimizerKind, ModelFile, ModelGrid, ParamLayout};
use crate::error::AppError;
use crate::models::{Breakpoints, evaluate};

pub const TOOL_NAME: &str = "segreg";

/// Number of x values stored in the fitted grid.
pub const GRID_POINTS: usize = 101;

/// Assemble a model file for a fit over `[x_min, x_max]`.
pub fn build_model_file(
    breakpoints: &Breakpoints,
    layout: ParamLayout,
    minimizer: MinimizerKind,
    coefficients: &[f64],
    fit_quality: FitQuality,
    x_min: f64,
    x_max: f64,
) -> ModelFile {
    ModelFile {
        tool: TOOL_NAME.to_string(),
        fitted_at: Utc::now(),
        breakpoints: breakpoints.clone(),
        layout,
        minimizer,
        coefficients: coefficients.to_vec(),
        fit_quality,
        grid: build_grid(breakpoints, layout, coefficients, x_min, x_max, GRID_POINTS),
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model: &ModelFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))
}

fn build_grid(
    breakpoints: &Breakpoints,
    layout: ParamLayout,
    coefficients: &[f64],
    x_min: f64,
    x_max: f64,
    n: usize,
) -> ModelGrid {
    let (mut x0, mut x1) = (x_min, x_max);
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-9 {
        x0 -= 0.5;
        x1 += 0.5;
    }

    let x = linspace(x0, x1, n.max(2));
    let y = evaluate(&x, coefficients, breakpoints, layout);
    ModelGrid { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality() -> FitQuality {
        FitQuality {
            sse: 0.0,
            rmse: 0.0,
            r_squared: 1.0,
            n: 4,
            iterations: 3,
            converged: true,
        }
    }

    #[test]
    fn grid_spans_the_data_range() {
        let bp = Breakpoints::new([5.0]).unwrap();
        let model = build_model_file(
            &bp,
            ParamLayout::PerSegment,
            MinimizerKind::Bfgs,
            &[0.0, 1.0, 10.0, -1.0],
            quality(),
            0.0,
            10.0,
        );
        assert_eq!(model.tool, TOOL_NAME);
        assert_eq!(model.grid.x.len(), GRID_POINTS);
        assert_eq!(model.grid.x[0], 0.0);
        assert_eq!(model.grid.y[0], 0.0);
        assert!((model.grid.y[GRID_POINTS - 1] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_range_is_widened() {
        let bp = Breakpoints::new(Vec::<f64>::new()).unwrap();
        let grid = build_grid(&bp, ParamLayout::PerSegment, &[1.0, 0.0], 2.0, 2.0, 5);
        assert_eq!(grid.x.first().copied(), Some(1.5));
        assert_eq!(grid.x.last().copied(), Some(2.5));
        assert!(grid.y.iter().all(|&y| y == 1.0));
    }

    #[test]
    fn json_round_trip_keeps_the_model() {
        let bp = Breakpoints::new([1.0, 2.0]).unwrap();
        let model = build_model_file(
            &bp,
            ParamLayout::Packed,
            MinimizerKind::NelderMead,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            quality(),
            0.0,
            3.0,
        );
        let path = std::env::temp_dir().join(format!("segreg-model-{}.json", std::process::id()));
        write_model_json(&path, &model).unwrap();
        let back = read_model_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.breakpoints, bp);
        assert_eq!(back.layout, ParamLayout::Packed);
        assert_eq!(back.minimizer, MinimizerKind::NelderMead);
        assert_eq!(back.coefficients, model.coefficients);
        assert_eq!(back.fitted_at, model.fitted_at);
    }

    #[test]
    fn breakpoints_are_sorted_on_load() {
        let json = r#"{"tool":"segreg","fitted_at":"2024-01-01T00:00:00Z","breakpoints":[3.0,1.0],
            "layout":"per-segment","minimizer":"bfgs","coefficients":[],
            "fit_quality":{"sse":0,"rmse":0,"r_squared":1,"n":0,"iterations":0,"converged":true},
            "grid":{"x":[],"y":[]}}"#;
        let parsed: ModelFile = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.breakpoints.as_slice(), &[1.0, 3.0]);

        let bad = json.replace("[3.0,1.0]", "[1.0,null]");
        assert!(serde_json::from_str::<ModelFile>(&bad).is_err());
    }
}
