//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{DatasetStats, FitConfig, FitQuality};
use crate::fit::SummaryReport;

/// Format the full run summary (dataset stats + fit diagnostics + model summary).
pub fn format_run_summary(
    source: &str,
    stats: &DatasetStats,
    config: &FitConfig,
    quality: &FitQuality,
    summary: &SummaryReport,
) -> String {
    let mut out = String::new();

    out.push_str("=== segreg - Segmented Regression ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Points: n={} | x=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));
    out.push_str(&format!(
        "Breakpoints: {} ({} segments, {:?} layout)\n",
        fmt_vec(config.breakpoints.as_slice()),
        config.breakpoints.segment_count(),
        config.layout,
    ));

    out.push_str("\nFit diagnostics:\n");
    out.push_str(&format!("- minimizer : {}\n", config.minimizer.display_name()));
    out.push_str(&format!(
        "- converged : {}\n",
        if quality.converged { "yes" } else { "no" }
    ));
    out.push_str(&format!("- iterations: {}\n", quality.iterations));
    out.push_str(&format!(
        "- SSE={:.4} RMSE={:.4} R^2={:.4}\n",
        quality.sse, quality.rmse, quality.r_squared
    ));
    out.push('\n');

    out.push_str(&summary.to_string());
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MinimizerKind, ParamLayout};
    use crate::models::Breakpoints;

    #[test]
    fn summary_contains_diagnostics_and_segments() {
        let breakpoints = Breakpoints::new([4.0, 7.0]).unwrap();
        let config = FitConfig {
            breakpoints: breakpoints.clone(),
            minimizer: MinimizerKind::NelderMead,
            layout: ParamLayout::PerSegment,
            max_iter: None,
            tolerance: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_predictions: None,
            export_model: None,
        };
        let stats = DatasetStats {
            n_points: 3,
            x_min: 0.0,
            x_max: 10.0,
            y_min: -1.0,
            y_max: 2.5,
        };
        let quality = FitQuality {
            sse: 0.5,
            rmse: 0.25,
            r_squared: 0.9,
            n: 3,
            iterations: 12,
            converged: false,
        };
        let summary = SummaryReport::new(&breakpoints, &[2.0, 0.5, 4.0, 1.5, 7.0, -0.5]);

        let text = format_run_summary("data.csv", &stats, &config, &quality, &summary);
        assert!(text.contains("Source: data.csv"));
        assert!(text.contains("Points: n=3 | x=[0.000, 10.000] | y=[-1.000, 2.500]"));
        assert!(text.contains("Breakpoints: [4, 7] (3 segments, PerSegment layout)"));
        assert!(text.contains("- minimizer : Nelder-Mead"));
        assert!(text.contains("- converged : no"));
        assert!(text.contains("- SSE=0.5000 RMSE=0.2500 R^2=0.9000"));
        assert!(text.ends_with("Segment 3 (X > 7): Intercept = 7.0000, Slope = -0.5000\n"));
    }
}
