//! Bridge between a plain `Fn(&[f64]) -> f64` objective and argmin's problem traits.

use argmin::core::{CostFunction, Error, Gradient, State, TerminationReason, TerminationStatus};
use finitediff::FiniteDiff;

use crate::error::RegressionError;
use crate::optim::Minimization;

/// Borrowed objective exposed to argmin solvers, with finite-difference gradients.
///
/// NaN objective values are reported as `+inf` so solvers that order vertices or
/// compare costs treat them as the worst possible point.
#[derive(Clone, Copy)]
pub struct Problem<'a> {
    objective: &'a dyn Fn(&[f64]) -> f64,
}

impl<'a> Problem<'a> {
    pub fn new(objective: &'a dyn Fn(&[f64]) -> f64) -> Self {
        Self { objective }
    }

    pub fn value(&self, params: &[f64]) -> f64 {
        let v = (self.objective)(params);
        if v.is_nan() { f64::INFINITY } else { v }
    }

    /// Central-difference gradient.
    pub fn gradient_at(&self, params: &[f64]) -> Vec<f64> {
        params
            .to_vec()
            .central_diff(&|p: &Vec<f64>| self.value(p))
    }
}

impl CostFunction for Problem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.value(param))
    }
}

impl Gradient for Problem<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(self.gradient_at(param))
    }
}

/// Result for a zero-length parameter vector, which no solver needs to touch.
pub fn trivial(problem: &Problem<'_>) -> Minimization {
    Minimization {
        params: Vec::new(),
        value: problem.value(&[]),
        iterations: 0,
        converged: true,
    }
}

/// Whether argmin stopped because the solver's own criterion was met.
pub fn solver_converged(status: &TerminationStatus) -> bool {
    matches!(
        status,
        TerminationStatus::Terminated(
            TerminationReason::SolverConverged | TerminationReason::TargetCostReached
        )
    )
}

/// Read the best point out of a finished argmin state.
///
/// The objective is re-evaluated at the returned point so `value` never depends
/// on whether the solver recorded a best cost before stopping.
pub fn best_of<S>(state: &S, problem: &Problem<'_>, initial: &[f64]) -> Minimization
where
    S: State<Param = Vec<f64>, Float = f64>,
{
    let params = state
        .get_best_param()
        .or_else(|| state.get_param())
        .cloned()
        .unwrap_or_else(|| initial.to_vec());
    Minimization {
        value: problem.value(&params),
        params,
        iterations: state.get_iter() as usize,
        converged: solver_converged(state.get_termination_status()),
    }
}

pub fn solver_error(backend: &str, err: Error) -> RegressionError {
    RegressionError::MinimizerFailed {
        message: format!("{backend}: {err}"),
    }
}

/// Euclidean norm.
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|g| g * g).sum::<f64>().sqrt()
}
