//! Error types for the retail forecasting pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Broad classification of a [`ForecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or inconsistent input; aborts the run.
    Data,
    /// Numerical trouble with a documented fallback; reported as a warning.
    Numerical,
    /// Artifacts could not be written or read back.
    Persistence,
}

/// Errors that can occur while aggregating, fitting, forecasting or saving.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A required input column is absent.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// The input has no rows.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Regressor count differs between two stages.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Regressor names or order differ between two stages.
    #[error("regressor schema mismatch: expected [{expected}], got [{got}]")]
    SchemaMismatch { expected: String, got: String },

    /// Actual and predicted sequences do not line up.
    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    /// Monthly rows are not strictly increasing by month.
    #[error("months out of order: {0}")]
    Unordered(String),

    /// MAPE is undefined when an actual value is zero.
    #[error("MAPE undefined: actual value at index {index} is zero")]
    UndefinedMape { index: usize },

    /// A series or regressor holds NaN or infinity.
    #[error("non-finite values in {0}")]
    NonFinite(String),

    /// A field could not be parsed.
    #[error("parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    /// A configuration value no run could satisfy.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The optimizer stopped before meeting its tolerance.
    #[error("{target} model did not converge after {iterations} iterations (CSS = {objective:.6})")]
    ConvergenceFailure {
        target: String,
        iterations: usize,
        objective: f64,
    },

    /// A regressor has zero variance over the training window.
    #[error("regressor '{0}' is constant over the training window; scaling disabled for it")]
    DegenerateColumn(String),

    /// Writing or reading an artifact failed.
    #[error("serialization error for {path}: {message}")]
    Serialization { path: String, message: String },
}

impl ForecastError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::ConvergenceFailure { .. } | ForecastError::DegenerateColumn(_) => {
                ErrorKind::Numerical
            }
            ForecastError::Serialization { .. } => ErrorKind::Persistence,
            _ => ErrorKind::Data,
        }
    }

    /// Whether the run can continue past this error with a fallback.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Numerical
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        let row = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        match err.kind() {
            csv::ErrorKind::Io(io) => ForecastError::Io(io.to_string()),
            _ => ForecastError::Parse {
                row,
                message: err.to_string(),
            },
        }
    }
}
