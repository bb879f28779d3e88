//! Unconstrained minimizers.
//!
//! The regressor only needs "objective in, parameter vector out", expressed by
//! the [`Minimizer`] trait. Any data the objective depends on (x, y,
//! breakpoints) is captured by the closure rather than passed separately.
//!
//! Backends are thin adapters over `argmin` solvers, fed finite-difference
//! derivatives from `finitediff`:
//! - [`Bfgs`]: quasi-Newton with a More-Thuente line search, the default
//! - [`NelderMead`]: derivative-free simplex, restarted until it stops improving
//! - [`DampedNewton`]: Newton steps with Levenberg-style damping

pub mod bfgs;
pub mod nelder_mead;
pub mod newton;
pub mod problem;

pub use bfgs::*;
pub use nelder_mead::*;
pub use newton::*;

use crate::domain::MinimizerKind;
use crate::error::RegressionError;

/// Outcome of a minimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimization {
    /// Best parameter vector found.
    pub params: Vec<f64>,
    /// Objective value at `params`.
    pub value: f64,
    pub iterations: usize,
    /// Whether the backend's own stopping criterion was met.
    ///
    /// `false` means the run hit its iteration cap or stalled; `params` is still
    /// the best point seen.
    pub converged: bool,
}

/// Minimize a scalar objective starting from `initial`.
///
/// Running out of iterations is reported through [`Minimization::converged`];
/// `Err` is reserved for a solver that could not produce a point at all.
pub trait Minimizer {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> Result<Minimization, RegressionError>;
}

impl<M: Minimizer + ?Sized> Minimizer for Box<M> {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> Result<Minimization, RegressionError> {
        (**self).minimize(objective, initial)
    }
}

impl<M: Minimizer + ?Sized> Minimizer for &M {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
    ) -> Result<Minimization, RegressionError> {
        (**self).minimize(objective, initial)
    }
}

impl MinimizerKind {
    /// Build the backend, applying optional overrides of its iteration cap and tolerance.
    pub fn build(self, max_iter: Option<usize>, tolerance: Option<f64>) -> Box<dyn Minimizer> {
        match self {
            MinimizerKind::Bfgs => {
                let mut m = Bfgs::default();
                m.max_iter = max_iter.or(m.max_iter);
                m.gtol = tolerance.unwrap_or(m.gtol);
                Box::new(m)
            }
            MinimizerKind::NelderMead => {
                let mut m = NelderMead::default();
                m.max_iter = max_iter.or(m.max_iter);
                m.sd_tolerance = tolerance.unwrap_or(m.sd_tolerance);
                Box::new(m)
            }
            MinimizerKind::Newton => {
                let mut m = DampedNewton::default();
                m.max_iter = max_iter.or(m.max_iter);
                m.gtol = tolerance.unwrap_or(m.gtol);
                Box::new(m)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowl(p: &[f64]) -> f64 {
        (p[0] - 1.0).powi(2) + 10.0 * (p[1] + 2.0).powi(2)
    }

    #[test]
    fn every_backend_finds_a_simple_minimum() {
        for kind in [MinimizerKind::Bfgs, MinimizerKind::NelderMead, MinimizerKind::Newton] {
            let result = kind.build(None, None).minimize(&bowl, &[0.0, 0.0]).unwrap();
            assert!(result.converged, "{} did not converge", kind.display_name());
            assert!((result.params[0] - 1.0).abs() < 1e-2, "{kind:?}: {:?}", result.params);
            assert!((result.params[1] + 2.0).abs() < 1e-2, "{kind:?}: {:?}", result.params);
        }
    }

    fn rosenbrock(p: &[f64]) -> f64 {
        (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2)
    }

    #[test]
    fn iteration_cap_reaches_every_backend() {
        for kind in [MinimizerKind::Bfgs, MinimizerKind::NelderMead, MinimizerKind::Newton] {
            let result = kind.build(Some(1), None).minimize(&rosenbrock, &[-1.2, 1.0]).unwrap();
            assert!(result.iterations <= 1, "{kind:?}: {} iterations", result.iterations);
            assert!(!result.converged, "{kind:?} claimed convergence after one step");
        }
    }

    #[test]
    fn every_backend_accepts_an_empty_parameter_vector() {
        let constant = |_: &[f64]| 4.0;
        for kind in [MinimizerKind::Bfgs, MinimizerKind::NelderMead, MinimizerKind::Newton] {
            let result = kind.build(None, None).minimize(&constant, &[]).unwrap();
            assert!(result.params.is_empty());
            assert_eq!(result.value, 4.0);
            assert!(result.converged);
        }
    }
}
