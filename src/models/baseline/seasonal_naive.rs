//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same season in the previous cycle.

use crate::data::exog::ExogMatrix;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Seasonal Naive forecaster.
///
/// Each forecast is equal to the observation from the same season
/// in the previous year (or previous seasonal period). Regressors are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalNaive {
    period: usize,
    last_season: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl SeasonalNaive {
    /// Fit on `values`, which must cover at least one full period.
    pub fn fit(values: &[f64], period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }
        if values.len() < period {
            return Err(ForecastError::InsufficientData {
                needed: period,
                got: values.len(),
            });
        }

        // Fitted values: y_hat[t] = y[t - period]
        let fitted = values[..values.len() - period].to_vec();
        let residuals = values[period..]
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        Ok(Self {
            period,
            last_season: values[values.len() - period..].to_vec(),
            fitted,
            residuals,
        })
    }

    /// Get the seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Mean squared in-sample residual, if any residuals exist.
    pub fn residual_variance(&self) -> Option<f64> {
        if self.residuals.is_empty() {
            return None;
        }
        Some(self.residuals.iter().map(|r| r * r).sum::<f64>() / self.residuals.len() as f64)
    }
}

impl Forecaster for SeasonalNaive {
    fn predict(&self, horizon: usize, _exog: Option<&ExogMatrix>) -> Result<Vec<f64>> {
        Ok((0..horizon)
            .map(|h| self.last_season[h % self.period])
            .collect())
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn residual_offset(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn repeats_seasonal_pattern() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0];
        let model = SeasonalNaive::fit(&values, 4).unwrap();
        assert_eq!(model.predict(4, None).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn repeats_last_cycle() {
        let values = vec![10.0, 20.0, 30.0, 40.0, 11.0, 21.0, 31.0, 41.0];
        let model = SeasonalNaive::fit(&values, 4).unwrap();
        assert_eq!(model.predict(4, None).unwrap(), vec![11.0, 21.0, 31.0, 41.0]);
    }

    #[test]
    fn requires_full_season() {
        assert!(matches!(
            SeasonalNaive::fit(&[1.0, 2.0, 3.0], 4),
            Err(ForecastError::InsufficientData { needed: 4, got: 3 })
        ));
    }

    #[test]
    fn forecast_beyond_one_season() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let model = SeasonalNaive::fit(&values, 4).unwrap();
        let preds = model.predict(8, None).unwrap();
        assert_eq!(&preds[0..4], &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(&preds[4..8], &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn fitted_values_and_residuals() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 2.0, 3.0, 4.0, 5.0];
        let model = SeasonalNaive::fit(&values, 4).unwrap();

        assert_eq!(model.residual_offset(), 4);
        assert_eq!(model.fitted_values(), &[1.0, 2.0, 3.0, 4.0]);
        for r in model.residuals() {
            assert_relative_eq!(*r, 1.0, epsilon = 1e-10);
        }
        assert_relative_eq!(model.residual_variance().unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn single_season_has_no_residuals() {
        let model = SeasonalNaive::fit(&[3.0; 12], 12).unwrap();
        assert!(model.residuals().is_empty());
        assert!(model.residual_variance().is_none());
        assert_eq!(model.predict(2, None).unwrap(), vec![3.0, 3.0]);
    }
}
