//! Data transformations applied before model fitting.
//!
//! # Example
//!
//! ```
//! use retail_forecast::data::{ExogMatrix, RegressorSchema};
//! use retail_forecast::transform::{expm1, log1p, StandardScaler};
//!
//! let schema = RegressorSchema::new(["discount_pct", "footfall"]);
//! let train = ExogMatrix::new(schema, vec![vec![1.0, 5.0], vec![3.0, 15.0]]).unwrap();
//! let scaler = StandardScaler::fit(&train).unwrap();
//! let scaled = scaler.transform(&train).unwrap();
//! assert_eq!(scaled.row(0), &[-1.0, -1.0]);
//!
//! let logged = log1p(&[99.0]);
//! assert!((expm1(&logged)[0] - 99.0).abs() < 1e-9);
//! ```

pub mod log;
pub mod scale;

pub use log::{expm1, log1p};
pub use scale::StandardScaler;
