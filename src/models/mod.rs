//! Forecasting models.

mod traits;

pub mod arima;
pub mod baseline;
pub mod sarimax;
pub mod targets;

pub use baseline::SeasonalNaive;
pub use sarimax::{Sarimax, SarimaxCoefficients, SarimaxOrder};
pub use targets::{RevenueModel, SalesModel, Target, REVENUE_ORDER, SALES_ORDER};
pub use traits::{BoxedForecaster, Forecaster};
