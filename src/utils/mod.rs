//! Numerical utilities shared by the models and the evaluator.

pub mod metrics;
pub mod ols;
pub mod optimization;

pub use metrics::{calculate_metrics, mae, mape, rmse, AccuracyMetrics};
pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
