//! Synthetic piecewise-linear samples for the demo.
//!
//! The ground truth is a three-segment line with breakpoints at 4 and 7:
//!
//! - `2 + 0.5x` for `x < 4`
//! - `4 + 1.5x` for `4 <= x < 7`
//! - `7 - 0.5x` for `x >= 7`
//!
//! evaluated on an evenly spaced grid, plus seeded Gaussian noise.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{DatasetStats, Observation, ParamLayout, SampleConfig};
use crate::error::AppError;
use crate::models::{Breakpoints, evaluate};

/// Breakpoints of the demo ground truth.
pub const DEMO_BREAKPOINTS: [f64; 2] = [4.0, 7.0];

/// `(intercept, slope)` pairs of the demo ground truth.
pub const DEMO_COEFFICIENTS: [f64; 6] = [2.0, 0.5, 4.0, 1.5, 7.0, -0.5];

#[derive(Debug, Clone)]
pub struct SampleData {
    /// Noisy observations, sorted by x.
    pub points: Vec<Observation>,
    /// Noise-free ground truth at each point's x.
    pub truth: Vec<f64>,
    pub stats: DatasetStats,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.n < 2 {
        return Err(AppError::new(2, "Sample size must be >= 2."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(
            2,
            format!(
                "Invalid sample x range: min={}, max={} (must be finite and max>min).",
                config.x_min, config.x_max
            ),
        ));
    }

    // `Normal::new` accepts a negative standard deviation.
    if !(config.noise >= 0.0 && config.noise.is_finite()) {
        return Err(AppError::new(
            2,
            format!("Invalid noise level: {} (must be finite and >= 0).", config.noise),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let x = linspace(config.x_min, config.x_max, config.n);
    let truth = ground_truth(&x)?;

    let points: Vec<Observation> = x
        .iter()
        .zip(&truth)
        .map(|(&x, &y)| Observation {
            x,
            y: y + normal.sample(&mut rng),
        })
        .collect();

    let stats = DatasetStats::from_points(&points)
        .ok_or_else(|| AppError::new(4, "Failed to compute sample stats."))?;

    Ok(SampleData {
        points,
        truth,
        stats,
    })
}

/// Noise-free demo curve at sorted `x`.
pub fn ground_truth(x: &[f64]) -> Result<Vec<f64>, AppError> {
    let breakpoints = Breakpoints::new(DEMO_BREAKPOINTS)?;
    Ok(evaluate(x, &DEMO_COEFFICIENTS, &breakpoints, ParamLayout::PerSegment))
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.0, 10.0, 101);
        assert_eq!(v.len(), 101);
        assert_eq!(v[0], 0.0);
        assert!((v[100] - 10.0).abs() < 1e-12);
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ground_truth_switches_at_breakpoints() {
        let y = ground_truth(&[0.0, 3.0, 4.0, 6.0, 7.0, 10.0]).unwrap();
        assert_eq!(y, vec![2.0, 3.5, 10.0, 13.0, 3.5, 2.0]);
    }

    #[test]
    fn same_seed_same_sample() {
        let config = SampleConfig::default();
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a.points, b.points);
        assert_eq!(a.points.len(), 100);

        let other = generate_sample(&SampleConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a.points, other.points);
    }

    #[test]
    fn zero_noise_reproduces_truth() {
        let config = SampleConfig {
            noise: 0.0,
            ..SampleConfig::default()
        };
        let sample = generate_sample(&config).unwrap();
        for (p, t) in sample.points.iter().zip(&sample.truth) {
            assert_eq!(p.y, *t);
        }
    }

    #[test]
    fn rejects_bad_config() {
        let err = generate_sample(&SampleConfig {
            n: 1,
            ..SampleConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = generate_sample(&SampleConfig {
            noise: -1.0,
            ..SampleConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("noise"));

        let err = generate_sample(&SampleConfig {
            noise: f64::NAN,
            ..SampleConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
