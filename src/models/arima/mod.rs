//! Differencing for seasonal ARIMA error models.

pub mod diff;

pub use diff::{apply_polynomial, differencing_polynomial, integrate, poly_mul};
