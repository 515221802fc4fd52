//! Error types for the valuation estimator.

use thiserror::Error;

/// Type alias for Result using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for fitting, prediction and the surrounding glue.
#[derive(Error, Debug)]
pub enum Error {
    /// A query or training field is non-finite or outside its domain.
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The centered design matrix does not have full column rank.
    #[error("singular training matrix, cannot fit: rank {rank} of {required} features")]
    SingularTrainingMatrix { rank: usize, required: usize },

    /// The weighted sum left the range of finite reals.
    #[error("prediction overflowed to {value} for the given query")]
    NonFiniteResult { value: f64 },

    #[error("shape mismatch for {what}: got {got}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("dataset must contain at least one sample")]
    EmptyDataset,

    #[error("model not fitted, call fit() first")]
    NotFitted,

    #[error("singular value decomposition did not converge after {sweeps} sweeps")]
    NoConvergence { sweeps: usize },

    #[error("invalid configuration value for {key}: {value:?}")]
    InvalidConfigValue { key: &'static str, value: String },

    #[error("{0}")]
    Usage(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
