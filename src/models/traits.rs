//! Forecaster trait defining the common interface for fitted models.

use crate::data::exog::ExogMatrix;
use crate::error::Result;

/// Common interface for fitted forecasting models.
///
/// Models are fitted by their constructors and immutable afterwards, so
/// the trait only covers prediction and in-sample diagnostics. It is
/// object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Generate predictions for `horizon` steps past the training window.
    ///
    /// Models with regressors require `exog` with one row per step.
    fn predict(&self, horizon: usize, exog: Option<&ExogMatrix>) -> Result<Vec<f64>>;

    /// In-sample predictions, starting at [`Forecaster::residual_offset`].
    fn fitted_values(&self) -> &[f64];

    /// In-sample residuals (actual - fitted), aligned with `fitted_values`.
    fn residuals(&self) -> &[f64];

    /// Index into the training series of the first residual.
    fn residual_offset(&self) -> usize {
        0
    }

    /// Get the model name.
    fn name(&self) -> &str;
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::baseline::SeasonalNaive;

    fn series(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i % 12) as f64 + 1.0).collect()
    }

    #[test]
    fn boxed_forecaster() {
        let model: BoxedForecaster = Box::new(SeasonalNaive::fit(&series(24), 12).unwrap());
        assert_eq!(model.name(), "SeasonalNaive");
        assert_eq!(model.predict(5, None).unwrap().len(), 5);
    }

    #[test]
    fn residuals_cover_training_window() {
        let values = series(30);
        let model: BoxedForecaster = Box::new(SeasonalNaive::fit(&values, 12).unwrap());
        assert_eq!(
            model.residual_offset() + model.residuals().len(),
            values.len()
        );
        assert_eq!(model.fitted_values().len(), model.residuals().len());
    }
}
