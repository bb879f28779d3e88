//! Segmented linear regression with fixed breakpoints.
//!
//! Every segment gets its own intercept and slope. All pairs are fit jointly
//! by handing the sum-of-squares objective to a [`Minimizer`], starting from
//! the zero vector.
//!
//! The regressor is a two-state machine: [`FitState::Unfitted`] until the first
//! successful `fit`, then [`FitState::Fitted`] for good (refitting replaces the
//! coefficients in place).

use log::{debug, warn};

use crate::domain::ParamLayout;
use crate::error::RegressionError;
use crate::fit::objective::sum_of_squares;
use crate::fit::summary::SummaryReport;
use crate::models::{Breakpoints, evaluate};
use crate::optim::{Bfgs, Minimizer};

/// Minimizer outcome recorded alongside fitted coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct FitRun {
    /// Sum of squared residuals at the returned coefficients.
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    coefficients: Vec<f64>,
    /// `None` when the coefficients were restored rather than fit.
    run: Option<FitRun>,
}

impl FittedModel {
    /// Flat `(intercept, slope)` pairs, `2 * segment_count` long.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn run(&self) -> Option<&FitRun> {
        self.run.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitState {
    Unfitted,
    Fitted(FittedModel),
}

#[derive(Debug, Clone)]
pub struct SegmentedRegressor<M = Bfgs> {
    breakpoints: Breakpoints,
    layout: ParamLayout,
    minimizer: M,
    state: FitState,
}

impl SegmentedRegressor<Bfgs> {
    /// Create an unfitted regressor using BFGS. Breakpoints may be given in any order.
    pub fn new(breakpoints: impl IntoIterator<Item = f64>) -> Result<Self, RegressionError> {
        Ok(Self::with_minimizer(Breakpoints::new(breakpoints)?, Bfgs::default()))
    }
}

impl<M: Minimizer> SegmentedRegressor<M> {
    pub fn with_minimizer(breakpoints: Breakpoints, minimizer: M) -> Self {
        Self {
            breakpoints,
            layout: ParamLayout::default(),
            minimizer,
            state: FitState::Unfitted,
        }
    }

    pub fn with_layout(mut self, layout: ParamLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Build an already-fitted regressor from known coefficients (e.g. a saved model).
    pub fn restore(
        breakpoints: Breakpoints,
        layout: ParamLayout,
        coefficients: Vec<f64>,
        minimizer: M,
    ) -> Result<Self, RegressionError> {
        let expected = breakpoints.param_len();
        if coefficients.len() != expected {
            return Err(RegressionError::ParameterCount {
                expected,
                actual: coefficients.len(),
            });
        }
        if let Some(index) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(RegressionError::NonFiniteCoefficient { index });
        }
        Ok(Self {
            breakpoints,
            layout,
            minimizer,
            state: FitState::Fitted(FittedModel {
                coefficients,
                run: None,
            }),
        })
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn layout(&self) -> ParamLayout {
        self.layout
    }

    pub fn state(&self) -> &FitState {
        &self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, FitState::Fitted(_))
    }

    /// The fitted model, or `NotFitted`.
    pub fn fitted(&self) -> Result<&FittedModel, RegressionError> {
        match &self.state {
            FitState::Fitted(model) => Ok(model),
            FitState::Unfitted => Err(RegressionError::NotFitted),
        }
    }

    /// Fit all segments jointly.
    ///
    /// `x` must be sorted ascending and the same length as `y`; both must be
    /// finite and non-empty. A minimizer that stops without converging is not
    /// an error: its best point is stored and the outcome is available through
    /// [`FittedModel::run`]. A backend failure, or a result of the wrong length,
    /// leaves the regressor in its previous state.
    pub fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), RegressionError> {
        validate_observations(x, y)?;

        let breakpoints = &self.breakpoints;
        let layout = self.layout;
        let objective = |params: &[f64]| sum_of_squares(params, x, y, breakpoints, layout);
        let initial = vec![0.0; breakpoints.param_len()];

        debug!(
            "fitting {} segments to {} points ({:?} layout)",
            breakpoints.segment_count(),
            x.len(),
            layout
        );
        let result = self.minimizer.minimize(&objective, &initial)?;
        if result.params.len() != initial.len() {
            return Err(RegressionError::ParameterCount {
                expected: initial.len(),
                actual: result.params.len(),
            });
        }

        if !result.converged {
            warn!(
                "minimizer stopped without converging after {} iterations (sse = {:.6})",
                result.iterations, result.value
            );
        }

        self.state = FitState::Fitted(FittedModel {
            coefficients: result.params,
            run: Some(FitRun {
                sse: result.value,
                iterations: result.iterations,
                converged: result.converged,
            }),
        });
        Ok(())
    }

    /// Fitted values for sorted `x`, in input order.
    pub fn predict(&self, x: &[f64]) -> Result<Vec<f64>, RegressionError> {
        let model = self.fitted()?;
        validate_x(x)?;
        Ok(evaluate(x, &model.coefficients, &self.breakpoints, self.layout))
    }

    /// Per-segment intercepts and slopes.
    pub fn summary(&self) -> Result<SummaryReport, RegressionError> {
        let model = self.fitted()?;
        Ok(SummaryReport::new(&self.breakpoints, &model.coefficients))
    }
}

fn validate_observations(x: &[f64], y: &[f64]) -> Result<(), RegressionError> {
    if x.len() != y.len() {
        return Err(RegressionError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.is_empty() {
        return Err(RegressionError::EmptyInput);
    }
    if let Some(index) = y.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFiniteInput { index });
    }
    validate_x(x)
}

fn validate_x(x: &[f64]) -> Result<(), RegressionError> {
    if let Some(index) = x.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFiniteInput { index });
    }
    if let Some(pos) = x.windows(2).position(|w| w[1] < w[0]) {
        return Err(RegressionError::UnsortedInput { index: pos + 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::{DampedNewton, Minimization, NelderMead};

    /// Returns a fixed parameter vector regardless of the objective.
    struct Fixed(Vec<f64>);

    impl Minimizer for Fixed {
        fn minimize(
            &self,
            objective: &dyn Fn(&[f64]) -> f64,
            _initial: &[f64],
        ) -> Result<Minimization, RegressionError> {
            Ok(Minimization {
                value: objective(&self.0),
                params: self.0.clone(),
                iterations: 1,
                converged: true,
            })
        }
    }

    const TRUE_PARAMS: [f64; 6] = [2.0, 0.5, 4.0, 1.5, 7.0, -0.5];

    fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| start + (stop - start) * i as f64 / (n as f64 - 1.0))
            .collect()
    }

    fn truth(x: f64) -> f64 {
        if x < 4.0 {
            2.0 + 0.5 * x
        } else if x < 7.0 {
            4.0 + 1.5 * x
        } else {
            7.0 - 0.5 * x
        }
    }

    fn noiseless() -> (Vec<f64>, Vec<f64>) {
        let x = linspace(0.0, 10.0, 100);
        let y = x.iter().map(|&v| truth(v)).collect();
        (x, y)
    }

    #[test]
    fn predict_and_summary_require_fit() {
        let model = SegmentedRegressor::new([4.0, 7.0]).unwrap();
        assert!(!model.is_fitted());
        assert_eq!(model.predict(&[1.0, 2.0]), Err(RegressionError::NotFitted));
        assert_eq!(model.predict(&[]), Err(RegressionError::NotFitted));
        assert_eq!(model.summary(), Err(RegressionError::NotFitted));
    }

    #[test]
    fn recovers_noiseless_piecewise_line() {
        let (x, y) = noiseless();
        let mut model = SegmentedRegressor::new([7.0, 4.0]).unwrap();
        model.fit(&x, &y).unwrap();

        let y_hat = model.predict(&x).unwrap();
        for (a, b) in y_hat.iter().zip(&y) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }

        let summary = model.summary().unwrap();
        assert_eq!(summary.segments.len(), 3);
        for (i, s) in summary.segments.iter().enumerate() {
            assert!((s.intercept - TRUE_PARAMS[2 * i]).abs() < 1e-3, "{s:?}");
            assert!((s.slope - TRUE_PARAMS[2 * i + 1]).abs() < 1e-3, "{s:?}");
        }
        assert!(model.fitted().unwrap().run().unwrap().converged);
    }

    #[test]
    fn damped_newton_recovers_noiseless_piecewise_line() {
        let (x, y) = noiseless();
        let bps = Breakpoints::new([4.0, 7.0]).unwrap();
        let mut model = SegmentedRegressor::with_minimizer(bps, DampedNewton::default());
        model.fit(&x, &y).unwrap();

        for (c, t) in model.fitted().unwrap().coefficients().iter().zip(TRUE_PARAMS) {
            assert!((c - t).abs() < 1e-3, "{c} vs {t}");
        }
    }

    #[test]
    fn nelder_mead_fits_a_single_segment() {
        let x = linspace(0.0, 4.0, 20);
        let y: Vec<f64> = x.iter().map(|&v| 1.0 - 0.5 * v).collect();
        let mut model = SegmentedRegressor::with_minimizer(
            Breakpoints::new(Vec::<f64>::new()).unwrap(),
            NelderMead::default(),
        );
        model.fit(&x, &y).unwrap();

        let c = model.fitted().unwrap().coefficients();
        assert!((c[0] - 1.0).abs() < 1e-2, "{c:?}");
        assert!((c[1] + 0.5).abs() < 1e-2, "{c:?}");
    }

    #[test]
    fn nelder_mead_recovers_noiseless_piecewise_line() {
        let (x, y) = noiseless();
        let bps = Breakpoints::new([4.0, 7.0]).unwrap();
        let mut model = SegmentedRegressor::with_minimizer(bps, NelderMead::default());
        model.fit(&x, &y).unwrap();

        let run = model.fitted().unwrap().run().unwrap().clone();
        assert!(run.converged, "{run:?}");
        assert!(run.sse < 1e-4, "{run:?}");
        let y_hat = model.predict(&x).unwrap();
        for (a, b) in y_hat.iter().zip(&y) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
    }

    #[test]
    fn wrong_length_from_the_minimizer_is_an_error() {
        let (x, y) = noiseless();
        let bps = Breakpoints::new([4.0, 7.0]).unwrap();
        let mut model = SegmentedRegressor::with_minimizer(bps, Fixed(vec![1.0, 2.0]));
        assert_eq!(
            model.fit(&x, &y),
            Err(RegressionError::ParameterCount { expected: 6, actual: 2 })
        );
        assert!(!model.is_fitted());
    }

    #[test]
    fn repeated_fits_are_identical() {
        let (x, y) = noiseless();
        let mut a = SegmentedRegressor::new([4.0, 7.0]).unwrap();
        let mut b = SegmentedRegressor::new([4.0, 7.0]).unwrap();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let first = a.fitted().unwrap().clone();
        a.fit(&x, &y).unwrap();

        assert_eq!(a.fitted().unwrap(), &first);
        assert_eq!(b.fitted().unwrap(), &first);
    }

    #[test]
    fn coefficient_count_follows_breakpoints() {
        let x = linspace(0.0, 10.0, 30);
        let y: Vec<f64> = x.iter().map(|&v| v.sin()).collect();
        for bps in [vec![], vec![5.0], vec![2.0, 5.0, 8.0], vec![3.0, 3.0]] {
            let k = bps.len();
            let mut model = SegmentedRegressor::new(bps).unwrap();
            model.fit(&x, &y).unwrap();
            assert_eq!(model.fitted().unwrap().coefficients().len(), 2 * (k + 1));
            assert_eq!(model.summary().unwrap().segments.len(), k + 1);
        }
    }

    #[test]
    fn empty_interior_segment_keeps_neighbours_aligned() {
        // No points in [4, 7).
        let x: Vec<f64> = linspace(0.0, 10.0, 101)
            .into_iter()
            .filter(|&v| !(4.0..7.0).contains(&v))
            .collect();
        let y: Vec<f64> = x.iter().map(|&v| truth(v)).collect();

        let mut model = SegmentedRegressor::new([4.0, 7.0]).unwrap();
        model.fit(&x, &y).unwrap();
        let c = model.fitted().unwrap().coefficients();

        assert!((c[0] - 2.0).abs() < 1e-3 && (c[1] - 0.5).abs() < 1e-3, "{c:?}");
        // The unused pair stays at the zero starting point.
        assert!(c[2].abs() < 1e-9 && c[3].abs() < 1e-9, "{c:?}");
        assert!((c[4] - 7.0).abs() < 1e-3 && (c[5] + 0.5).abs() < 1e-3, "{c:?}");

        let y_hat = model.predict(&[1.0, 5.0, 8.0]).unwrap();
        assert!((y_hat[0] - 2.5).abs() < 1e-3);
        assert!(y_hat[1].abs() < 1e-9);
        assert!((y_hat[2] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn packed_layout_fills_pairs_in_order_of_non_empty_segments() {
        let x: Vec<f64> = linspace(0.0, 10.0, 101)
            .into_iter()
            .filter(|&v| !(4.0..7.0).contains(&v))
            .collect();
        let y: Vec<f64> = x.iter().map(|&v| truth(v)).collect();

        let mut model = SegmentedRegressor::new([4.0, 7.0])
            .unwrap()
            .with_layout(ParamLayout::Packed);
        model.fit(&x, &y).unwrap();
        let c = model.fitted().unwrap().coefficients();

        // The last segment's line lands in the second pair; the summary still
        // reads segment i from slots 2i and 2i+1.
        assert!((c[2] - 7.0).abs() < 1e-3 && (c[3] + 0.5).abs() < 1e-3, "{c:?}");
        let summary = model.summary().unwrap();
        assert!((summary.segments[1].intercept - 7.0).abs() < 1e-3);
    }

    #[test]
    fn input_validation() {
        let mut model = SegmentedRegressor::new([1.0]).unwrap();
        assert_eq!(
            model.fit(&[0.0, 1.0], &[0.0]),
            Err(RegressionError::LengthMismatch { x: 2, y: 1 })
        );
        assert_eq!(model.fit(&[], &[]), Err(RegressionError::EmptyInput));
        assert_eq!(
            model.fit(&[0.0, 2.0, 1.0], &[0.0, 0.0, 0.0]),
            Err(RegressionError::UnsortedInput { index: 2 })
        );
        assert_eq!(
            model.fit(&[0.0, 1.0], &[0.0, f64::INFINITY]),
            Err(RegressionError::NonFiniteInput { index: 1 })
        );
        assert!(!model.is_fitted());

        model.fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(
            model.predict(&[3.0, f64::NAN]),
            Err(RegressionError::NonFiniteInput { index: 1 })
        );
        assert_eq!(model.predict(&[]), Ok(vec![]));
    }

    #[test]
    fn restore_checks_coefficient_count() {
        let bps = Breakpoints::new([4.0, 7.0]).unwrap();
        let err = SegmentedRegressor::restore(bps.clone(), ParamLayout::PerSegment, vec![1.0; 4], Bfgs::default())
            .unwrap_err();
        assert_eq!(err, RegressionError::ParameterCount { expected: 6, actual: 4 });

        let mut bad = TRUE_PARAMS.to_vec();
        bad[3] = f64::NAN;
        let err = SegmentedRegressor::restore(bps.clone(), ParamLayout::PerSegment, bad, Bfgs::default())
            .unwrap_err();
        assert_eq!(err, RegressionError::NonFiniteCoefficient { index: 3 });
        assert_eq!(err.to_string(), "Non-finite value at coefficient 3.");

        let model =
            SegmentedRegressor::restore(bps, ParamLayout::PerSegment, TRUE_PARAMS.to_vec(), Bfgs::default()).unwrap();
        assert!(model.fitted().unwrap().run().is_none());
        assert_eq!(model.predict(&[0.0, 4.0, 10.0]).unwrap(), vec![2.0, 10.0, 2.0]);
    }
}
