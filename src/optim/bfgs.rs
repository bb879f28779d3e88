//! BFGS quasi-Newton minimizer, backed by `argmin`.
//!
//! - gradients by central differences (`finitediff`)
//! - More-Thuente line search
//! - starts from the identity inverse Hessian
//! - stops when the gradient norm drops below `gtol`

use argmin::core::{Executor, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::BFGS;
use log::debug;

use crate::error::RegressionError;
use crate::optim::problem::{Problem, best_of, solver_error, trivial};
use crate::optim::{Minimization, Minimizer};

#[derive(Debug, Clone)]
pub struct Bfgs {
    /// Gradient norm tolerance.
    pub gtol: f64,
    /// Iteration cap; `None` means `200 * n_params`.
    pub max_iter: Option<usize>,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            gtol: 1e-5,
            max_iter: None,
        }
    }
}

impl Minimizer for Bfgs {
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
        let max_iter = self.max_iter.unwrap_or(200 * n);

        let linesearch = MoreThuenteLineSearch::new();
        let solver = BFGS::new(linesearch)
            .with_tolerance_grad(self.gtol)
            .map_err(|e| solver_error("bfgs", e))?;
        let inv_hessian = identity(n);

        let result = Executor::new(problem, solver)
            .configure(|state| {
                state
                    .param(initial.to_vec())
                    .inv_hessian(inv_hessian)
                    .max_iters(max_iter as u64)
            })
            .run()
            .map_err(|e| solver_error("bfgs", e))?;

        let state = result.state();
        debug!(
            "bfgs: {} iterations, {:?}",
            state.get_iter(),
            state.get_termination_status()
        );
        Ok(best_of(state, &problem, initial))
    }
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}
