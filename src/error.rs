//! Error types.
//!
//! - `RegressionError`: failures of the regression library itself (bad input,
//!   calling `predict`/`summary` before `fit`).
//! - `AppError`: what the `segreg` binary reports, carrying a process exit code.
//!
//! Exit codes:
//! - 2: invalid input, configuration, or I/O
//! - 3: no usable data
//! - 4: fitting or model failure

#[derive(Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// `predict` or `summary` was called before a successful `fit`.
    NotFitted,
    /// X and y have different lengths.
    LengthMismatch { x: usize, y: usize },
    /// No observations were supplied to `fit`.
    EmptyInput,
    /// An x or y value is NaN or infinite.
    NonFiniteInput { index: usize },
    /// X is not sorted ascending; `index` is the first point smaller than its predecessor.
    UnsortedInput { index: usize },
    /// A breakpoint is NaN or infinite.
    InvalidBreakpoint { value: f64 },
    /// A coefficient vector (restored or returned by a minimizer) has the wrong
    /// length for the breakpoints.
    ParameterCount { expected: usize, actual: usize },
    /// A restored coefficient is NaN or infinite.
    NonFiniteCoefficient { index: usize },
    /// The minimizer backend failed before producing a point.
    MinimizerFailed { message: String },
}

impl std::fmt::Display for RegressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegressionError::NotFitted => {
                write!(f, "Model is not fitted yet. Call the 'fit' method first.")
            }
            RegressionError::LengthMismatch { x, y } => {
                write!(f, "X and y must have the same length (got {x} and {y}).")
            }
            RegressionError::EmptyInput => write!(f, "Cannot fit a model to zero observations."),
            RegressionError::NonFiniteInput { index } => {
                write!(f, "Non-finite value at observation {index}.")
            }
            RegressionError::UnsortedInput { index } => write!(
                f,
                "X must be sorted ascending (x[{index}] is smaller than x[{}]).",
                index - 1
            ),
            RegressionError::InvalidBreakpoint { value } => {
                write!(f, "Breakpoints must be finite (got {value}).")
            }
            RegressionError::ParameterCount { expected, actual } => write!(
                f,
                "Expected {expected} coefficients for the given breakpoints, got {actual}."
            ),
            RegressionError::NonFiniteCoefficient { index } => {
                write!(f, "Non-finite value at coefficient {index}.")
            }
            RegressionError::MinimizerFailed { message } => {
                write!(f, "Minimizer failed: {message}")
            }
        }
    }
}

impl std::error::Error for RegressionError {}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        let exit_code = match err {
            RegressionError::NotFitted
            | RegressionError::ParameterCount { .. }
            | RegressionError::NonFiniteCoefficient { .. }
            | RegressionError::MinimizerFailed { .. } => 4,
            RegressionError::EmptyInput => 3,
            _ => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}
