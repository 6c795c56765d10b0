//! Baseline forecasting models.
//!
//! Simple methods that serve as benchmarks for the SARIMAX targets.

mod seasonal_naive;

pub use seasonal_naive::SeasonalNaive;
