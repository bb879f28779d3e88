//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates observations
//! - runs the segmented fit
//! - prints reports/plots
//! - writes optional exports

use std::io::Write;

use clap::Parser;
use log::{info, warn};

use crate::cli::{Cli, Command, DemoArgs, FitArgs, ModelArgs, PredictArgs};
use crate::domain::{FitConfig, SampleConfig};
use crate::error::AppError;
use crate::models::Breakpoints;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `segreg` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Predict(args) => handle_predict(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args.breakpoints.clone(), &args.model);

    info!("loading observations from {}", args.input.display());
    let ingest = crate::io::load_observations(&args.input, &args.x_col, &args.y_col)?;
    if !ingest.row_errors.is_empty() {
        warn!(
            "skipped {} of {} rows in {}",
            ingest.row_errors.len(),
            ingest.rows_read,
            args.input.display()
        );
    }

    let source = format!(
        "{} (rows read={}, used={})",
        args.input.display(),
        ingest.rows_read,
        ingest.rows_used
    );
    let run = pipeline::run_fit(ingest, &config)?;
    present(&run, &config, &source)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args.breakpoints.clone(), &args.model);
    let sample_config = sample_config_from_args(&args);

    let (_, run) = pipeline::run_demo(&sample_config, &config)?;
    let source = format!(
        "synthetic sample (n={}, seed={}, noise={})",
        sample_config.n, sample_config.seed, sample_config.noise
    );
    present(&run, &config, &source)
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let model = crate::io::read_model_json(&args.model)?;
    let ingested = crate::io::load_xs(&args.input, &args.x_col)?;
    if !ingested.row_errors.is_empty() {
        warn!("skipped {} rows in {}", ingested.row_errors.len(), args.input.display());
    }
    if ingested.xs.is_empty() {
        return Err(AppError::new(3, "No valid x values to predict."));
    }

    let y_fit = pipeline::run_predict(&model, &ingested.xs)?;

    match &args.output {
        Some(path) => crate::io::write_fitted_csv(path, &ingested.xs, &y_fit)?,
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::write_fitted(&mut lock, &ingested.xs, &y_fit)?;
            lock.flush()
                .map_err(|e| AppError::new(2, format!("Failed to flush stdout: {e}")))?;
        }
    }
    Ok(())
}

/// Print the report and plot, then write any requested exports.
fn present(run: &RunOutput, config: &FitConfig, source: &str) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(source, &run.ingest.stats, config, &run.quality, &run.summary)
    );

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.curve,
            &config.breakpoints,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_predictions {
        crate::io::write_predictions_csv(path, &run.residuals)?;
        info!("wrote predictions to {}", path.display());
    }
    if let Some(path) = &config.export_model {
        crate::io::write_model_json(path, &run.model_file(config))?;
        info!("wrote model to {}", path.display());
    }

    Ok(())
}

pub fn fit_config_from_args(breakpoints: Breakpoints, args: &ModelArgs) -> FitConfig {
    FitConfig {
        breakpoints,
        minimizer: args.minimizer,
        layout: args.layout,
        max_iter: args.max_iter,
        tolerance: args.tolerance,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_predictions: args.export_predictions.clone(),
        export_model: args.export_model.clone(),
    }
}

pub fn sample_config_from_args(args: &DemoArgs) -> SampleConfig {
    SampleConfig {
        n: args.n,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        seed: args.seed,
    }
}
