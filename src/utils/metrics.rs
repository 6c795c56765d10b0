//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Accuracy of one forecast against the holdout values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Absolute Percentage Error, in percent
    pub mape: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(ForecastError::EmptyInput(
            "no values to evaluate".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::LengthMismatch(format!(
            "{} actual values but {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Mean of `|actual - predicted|`.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Mean of `|actual - predicted| / |actual|`, times 100.
///
/// Undefined when any actual value is exactly zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    if let Some(index) = actual.iter().position(|&a| a == 0.0) {
        return Err(ForecastError::UndefinedMape { index });
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    Ok(100.0 * sum / actual.len() as f64)
}

/// Square root of the mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}

/// Calculate all accuracy metrics between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    Ok(AccuracyMetrics {
        mae: mae(actual, predicted)?,
        mape: mape(actual, predicted)?,
        rmse: rmse(actual, predicted)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_prediction() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let metrics = calculate_metrics(&actual, &actual).unwrap();
        assert_relative_eq!(metrics.mae, 0.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.mape, 0.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.rmse, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn known_values() {
        let actual = vec![100.0, 200.0, 400.0];
        let predicted = vec![110.0, 180.0, 400.0];
        assert_relative_eq!(mae(&actual, &predicted).unwrap(), 10.0, epsilon = 1e-12);
        // (10% + 10% + 0%) / 3
        assert_relative_eq!(
            mape(&actual, &predicted).unwrap(),
            20.0 / 3.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            rmse(&actual, &predicted).unwrap(),
            (500.0_f64 / 3.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn mape_undefined_with_zero_actual() {
        let result = mape(&[3.0, 0.0, 1.0], &[3.0, 0.1, 1.0]);
        assert_eq!(result, Err(ForecastError::UndefinedMape { index: 1 }));
        // MAE is still defined.
        assert!(mae(&[3.0, 0.0, 1.0], &[3.0, 0.1, 1.0]).is_ok());
    }

    #[test]
    fn length_mismatch() {
        assert!(matches!(
            mae(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(ForecastError::LengthMismatch(_))
        ));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(mae(&[], &[]), Err(ForecastError::EmptyInput(_))));
    }

    #[test]
    fn negative_actuals_use_absolute_denominator() {
        let value = mape(&[-10.0], &[-12.0]).unwrap();
        assert_relative_eq!(value, 20.0, epsilon = 1e-12);
    }
}
