//! Nelder-Mead downhill simplex, backed by `argmin`.
//!
//! Derivative-free, so it tolerates objectives with kinks or noise at the cost of
//! slower convergence in higher dimensions. A simplex can collapse onto a
//! non-stationary point, so a run that meets the spread tolerance is restarted
//! from its best vertex with a fresh simplex. Convergence is only reported once
//! a restart no longer improves the objective.

use argmin::core::{Executor, State};
use argmin::solver::neldermead::NelderMead as ArgminNelderMead;
use log::debug;

use crate::error::RegressionError;
use crate::optim::problem::{Problem, solver_converged, solver_error, trivial};
use crate::optim::{Minimization, Minimizer};

/// Relative perturbation for non-zero coordinates of a new simplex.
const NONZERO_DELTA: f64 = 0.05;
/// Absolute perturbation for zero coordinates of a new simplex.
const ZERO_DELTA: f64 = 0.00025;
/// Relative improvement below which a restart counts as "no progress".
const RESTART_RTOL: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Standard deviation of the vertex costs at which one simplex run stops.
    pub sd_tolerance: f64,
    /// Iteration cap shared by all restarts; `None` means `2000 * n_params`.
    pub max_iter: Option<usize>,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            sd_tolerance: 1e-12,
            max_iter: None,
        }
    }
}

impl Minimizer for NelderMead {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> Result<Minimization, RegressionError> {
        let problem = Problem::new(objective);
        let n = initial.len();
        if n == 0 {
            return Ok(trivial(&problem));
        }
        let budget = self.max_iter.unwrap_or(2000 * n);

        let mut best = initial.to_vec();
        let mut best_value = problem.value(&best);
        let mut iterations = 0;
        let mut converged = false;
        let mut restarts = 0;

        while iterations < budget {
            let solver = ArgminNelderMead::new(simplex_around(&best))
                .with_sd_tolerance(self.sd_tolerance)
                .map_err(|e| solver_error("nelder-mead", e))?;
            let remaining = (budget - iterations) as u64;
            let result = Executor::new(problem, solver)
                .configure(|state| state.max_iters(remaining))
                .run()
                .map_err(|e| solver_error("nelder-mead", e))?;

            let state = result.state();
            iterations += state.get_iter() as usize;
            let run_converged = solver_converged(state.get_termination_status());
            let candidate = state.get_best_param().cloned().unwrap_or_else(|| best.clone());
            let candidate_value = problem.value(&candidate);

            let improved = candidate_value < best_value
                && best_value - candidate_value > RESTART_RTOL * (1.0 + best_value.abs());
            if candidate_value < best_value {
                best = candidate;
                best_value = candidate_value;
            }
            if !run_converged {
                break;
            }
            if !improved && restarts > 0 {
                converged = true;
                break;
            }
            restarts += 1;
        }

        debug!("nelder-mead: {iterations} iterations, {restarts} restarts, f = {best_value:.6e}");
        Ok(Minimization {
            params: best,
            value: best_value,
            iterations,
            converged,
        })
    }
}

/// `n + 1` vertices: `center` plus one perturbed copy per coordinate.
fn simplex_around(center: &[f64]) -> Vec<Vec<f64>> {
    let mut vertices = Vec::with_capacity(center.len() + 1);
    vertices.push(center.to_vec());
    for i in 0..center.len() {
        let mut vertex = center.to_vec();
        vertex[i] = if vertex[i] != 0.0 {
            vertex[i] * (1.0 + NONZERO_DELTA)
        } else {
            ZERO_DELTA
        };
        vertices.push(vertex);
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_a_line_without_derivatives() {
        // Sum of squares for y = 1 + 2x.
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let sse = |p: &[f64]| -> f64 {
            xs.iter()
                .map(|&x| {
                    let r = 1.0 + 2.0 * x - (p[0] + p[1] * x);
                    r * r
                })
                .sum()
        };

        let result = NelderMead::default().minimize(&sse, &[0.0, 0.0]).unwrap();
        assert!(result.converged);
        assert!((result.params[0] - 1.0).abs() < 1e-3, "{:?}", result.params);
        assert!((result.params[1] - 2.0).abs() < 1e-3, "{:?}", result.params);
    }

    #[test]
    fn nan_vertices_are_pushed_out() {
        let f = |p: &[f64]| if p[0] < 0.0 { f64::NAN } else { (p[0] - 3.0).powi(2) };
        let result = NelderMead::default().minimize(&f, &[1.0]).unwrap();
        assert!((result.params[0] - 3.0).abs() < 1e-2, "{:?}", result.params);
        assert!(result.value.is_finite());
    }

    #[test]
    fn iteration_cap_is_respected() {
        let f = |p: &[f64]| (p[0] - 100.0).powi(2);
        let nm = NelderMead {
            max_iter: Some(3),
            ..NelderMead::default()
        };
        let result = nm.minimize(&f, &[0.0]).unwrap();
        assert!(result.iterations <= 3);
        assert!(!result.converged);
    }

    #[test]
    fn simplex_has_one_vertex_per_coordinate_plus_center() {
        let vertices = simplex_around(&[0.0, 2.0]);
        assert_eq!(vertices, vec![vec![0.0, 2.0], vec![ZERO_DELTA, 2.0], vec![0.0, 2.1]]);
    }
}
