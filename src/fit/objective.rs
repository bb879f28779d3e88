//! Least-squares objective over a piecewise-linear model.

use crate::domain::ParamLayout;
use crate::models::{Breakpoints, evaluate};

/// Sum of squared residuals `Σ (y_i - ŷ_i)^2` for a candidate parameter vector.
///
/// No weighting or regularization. Non-finite parameters propagate into the
/// result; minimizers are expected to back away from them.
pub fn sum_of_squares(
    params: &[f64],
    x: &[f64],
    y: &[f64],
    breakpoints: &Breakpoints,
    layout: ParamLayout,
) -> f64 {
    evaluate(x, params, breakpoints, layout)
        .iter()
        .zip(y)
        .map(|(y_fit, y_obs)| {
            let r = y_obs - y_fit;
            r * r
        })
        .sum()
}
