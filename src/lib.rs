//! # retail-forecast
//!
//! Monthly sales and revenue forecasting for retail transaction data.
//!
//! Transactions are aggregated into calendar months, split into a training
//! window and a holdout, and each target is modelled as a regression on
//! standardized operational drivers (promotions, holidays, weekends,
//! discounts) with seasonal ARIMA errors. Forecasts are scored against the
//! holdout and the fitted models are saved as JSON artifacts.
//!
//! ```no_run
//! use retail_forecast::prelude::*;
//!
//! let rows = generate_transactions(&SyntheticConfig::default());
//! let report = pipeline::run(&rows, &PipelineConfig::default())?;
//! println!("{}", summary_line("Sales Model", &report.sales_outcome.evaluation.metrics));
//! # Ok::<(), ForecastError>(())
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod models;
pub mod persist;
pub mod pipeline;
pub mod report;
pub mod transform;
pub mod utils;

pub use error::{ErrorKind, ForecastError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::data::{
        generate_transactions, load_transactions, ExogMatrix, MonthlySeries, MonthlyTable,
        RegressorSchema, SyntheticConfig, TransactionRow,
    };
    pub use crate::error::{ErrorKind, ForecastError, Result};
    pub use crate::evaluate::EvaluationRecord;
    pub use crate::models::{Forecaster, RevenueModel, SalesModel, Target};
    pub use crate::persist::{load_artifacts, save_artifacts};
    pub use crate::pipeline::{self, PipelineReport};
    pub use crate::report::summary_line;
    pub use crate::transform::StandardScaler;
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
