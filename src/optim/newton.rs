//! Damped Newton minimizer, backed by `argmin`.
//!
//! Each iteration hands argmin's Newton solver the finite-difference gradient
//! and the Hessian shifted by `λI`, and lets it take one step. A step that
//! lowers the objective is accepted and `λ` shrinks toward plain Newton; a
//! rejected step grows `λ` toward a short gradient step. For a sum-of-squares
//! objective over a linear model `H` is constant, so this converges in a
//! handful of iterations.

use argmin::core::{Error, Executor, Gradient, Hessian, State};
use argmin::solver::newton::Newton;
use argmin_math::{ArgminDot, ArgminInv};
use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::RegressionError;
use crate::optim::problem::{Problem, l2_norm, solver_error, trivial};
use crate::optim::{Minimization, Minimizer};

/// Number of damping increases tried before giving up on an iteration.
const MAX_DAMPING_TRIES: usize = 30;
/// Smallest damping factor kept after a run of accepted steps.
const MIN_LAMBDA: f64 = 1e-12;
/// Relative step for differencing the gradient into a Hessian.
const HESSIAN_STEP: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct DampedNewton {
    /// Gradient norm tolerance.
    pub gtol: f64,
    /// Iteration cap; `None` means 100.
    pub max_iter: Option<usize>,
    /// Starting damping factor.
    pub lambda: f64,
}

impl Default for DampedNewton {
    fn default() -> Self {
        Self {
            gtol: 1e-5,
            max_iter: None,
            lambda: 1e-3,
        }
    }
}

impl Minimizer for DampedNewton {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> Result<Minimization, RegressionError> {
        let problem = Problem::new(objective);
        if initial.is_empty() {
            return Ok(trivial(&problem));
        }
        let max_iter = self.max_iter.unwrap_or(100);

        let mut x = initial.to_vec();
        let mut fx = problem.value(&x);
        let mut gradient = problem.gradient_at(&x);
        let mut lambda = self.lambda;
        let mut iterations = 0;
        let mut converged = l2_norm(&gradient) <= self.gtol;

        while !converged && iterations < max_iter && fx.is_finite() {
            let hessian = hessian_at(&problem, &x);

            let mut accepted = None;
            for _ in 0..MAX_DAMPING_TRIES {
                let step = FixedQuadratic {
                    gradient: gradient.clone(),
                    hessian: hessian.damped(lambda),
                };
                match newton_step(step, &x) {
                    Ok(candidate) => {
                        let fc = problem.value(&candidate);
                        if fc.is_finite() && fc <= fx {
                            lambda = (lambda * 0.1).max(MIN_LAMBDA);
                            accepted = Some((candidate, fc));
                            break;
                        }
                    }
                    Err(err) => debug!("newton: step failed at lambda = {lambda:.3e}: {err}"),
                }
                lambda *= 10.0;
            }

            let Some((x_new, f_new)) = accepted else {
                debug!("newton: no acceptable step at iteration {iterations} (lambda = {lambda:.3e})");
                break;
            };
            x = x_new;
            fx = f_new;
            gradient = problem.gradient_at(&x);
            iterations += 1;
            converged = l2_norm(&gradient) <= self.gtol;
        }

        debug!(
            "newton: {} after {iterations} iterations (f = {fx:.6e})",
            if converged { "converged" } else { "stopped" }
        );

        Ok(Minimization {
            params: x,
            value: fx,
            iterations,
            converged,
        })
    }
}

/// One argmin Newton iteration from `x` on the local quadratic model.
fn newton_step(model: FixedQuadratic, x: &[f64]) -> Result<Vec<f64>, RegressionError> {
    let result = Executor::new(model, Newton::<f64>::new())
        .configure(|state| state.param(x.to_vec()).max_iters(1))
        .run()
        .map_err(|e| solver_error("newton", e))?;
    result
        .state()
        .get_param()
        .cloned()
        .ok_or_else(|| RegressionError::MinimizerFailed {
            message: "newton: step produced no parameters".to_string(),
        })
}

/// Gradient and Hessian frozen at the current iterate.
struct FixedQuadratic {
    gradient: Vec<f64>,
    hessian: SquareMatrix,
}

impl Gradient for FixedQuadratic {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, _param: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.gradient.clone())
    }
}

impl Hessian for FixedQuadratic {
    type Param = Vec<f64>;
    type Hessian = SquareMatrix;

    fn hessian(&self, _param: &Self::Param) -> Result<Self::Hessian, Error> {
        Ok(self.hessian.clone())
    }
}

/// Dense row-major matrix handed to argmin as the Hessian type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SquareMatrix(Vec<Vec<f64>>);

impl SquareMatrix {
    fn damped(&self, lambda: f64) -> Self {
        let mut rows = self.0.clone();
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] += lambda;
        }
        SquareMatrix(rows)
    }

    fn to_nalgebra(&self) -> DMatrix<f64> {
        let n = self.0.len();
        DMatrix::from_fn(n, n, |i, j| self.0[i][j])
    }
}

impl ArgminInv<SquareMatrix> for SquareMatrix {
    /// Inverse, falling back to the SVD pseudo-inverse when `H` is singular.
    fn inv(&self) -> Result<SquareMatrix, Error> {
        let m = self.to_nalgebra();
        let inverse = match m.clone().try_inverse() {
            Some(inverse) => inverse,
            None => m.pseudo_inverse(1e-12).map_err(Error::msg)?,
        };
        let n = inverse.nrows();
        Ok(SquareMatrix(
            (0..n).map(|i| inverse.row(i).iter().copied().collect()).collect(),
        ))
    }
}

impl ArgminDot<Vec<f64>, Vec<f64>> for SquareMatrix {
    fn dot(&self, other: &Vec<f64>) -> Vec<f64> {
        self.0
            .iter()
            .map(|row| row.iter().zip(other).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// Symmetrized Hessian from central differences of the gradient.
fn hessian_at(problem: &Problem<'_>, x: &[f64]) -> SquareMatrix {
    let n = x.len();
    let mut shifted = x.to_vec();
    let columns: Vec<Vec<f64>> = (0..n)
        .map(|j| {
            let h = HESSIAN_STEP * x[j].abs().max(1.0);
            shifted[j] = x[j] + h;
            let up = problem.gradient_at(&shifted);
            shifted[j] = x[j] - h;
            let down = problem.gradient_at(&shifted);
            shifted[j] = x[j];
            up.iter().zip(&down).map(|(u, d)| (u - d) / (2.0 * h)).collect()
        })
        .collect();
    SquareMatrix(
        (0..n)
            .map(|i| (0..n).map(|j| 0.5 * (columns[j][i] + columns[i][j])).collect())
            .collect(),
    )
}
