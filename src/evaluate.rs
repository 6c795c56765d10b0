//! Holdout evaluation: accuracy metrics and residual diagnostics.
//!
//! Training residuals come from the model's in-sample fit on the log scale.
//! Test residuals are `actual - predicted` on the original scale. Every
//! pairing is checked month by month.

use crate::data::aggregate::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::{Forecaster, Target};
use crate::utils::metrics::{calculate_metrics, mape, AccuracyMetrics};
use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Location and spread of a residual series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub max_abs: f64,
}

impl ResidualSummary {
    /// `None` for an empty series.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev: values.iter().population_std_dev(),
            max_abs: values.iter().map(|v| v.abs()).fold(0.0, f64::max),
        })
    }
}

/// Evaluation of one target over the test window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub target: Target,
    pub metrics: AccuracyMetrics,
    /// MAPE of the seasonal-naive benchmark, when one was evaluated.
    pub baseline_mape: Option<f64>,
    /// In-sample residuals on the log scale, dated by training month.
    pub train_residuals: MonthlySeries,
    /// Holdout residuals on the original scale, dated by test month.
    pub test_residuals: MonthlySeries,
    pub train_summary: Option<ResidualSummary>,
    pub test_summary: Option<ResidualSummary>,
}

/// Date the model's in-sample residuals with the training months.
pub fn train_residuals(model: &dyn Forecaster, train_months: &[NaiveDate]) -> Result<MonthlySeries> {
    let offset = model.residual_offset();
    let residuals = model.residuals();
    if offset + residuals.len() != train_months.len() {
        return Err(ForecastError::LengthMismatch(format!(
            "{} residuals from index {} do not cover {} training months",
            residuals.len(),
            offset,
            train_months.len()
        )));
    }
    MonthlySeries::new(train_months[offset..].to_vec(), residuals.to_vec())
}

/// `actual - forecast` per test month.
pub fn test_residuals(actual: &MonthlySeries, forecast: &MonthlySeries) -> Result<MonthlySeries> {
    actual.ensure_aligned(forecast)?;
    let values = actual
        .values()
        .iter()
        .zip(forecast.values())
        .map(|(a, p)| a - p)
        .collect();
    MonthlySeries::new(actual.months().to_vec(), values)
}

/// Score `forecast` against `actual` and collect residual diagnostics.
pub fn evaluate(
    target: Target,
    model: &dyn Forecaster,
    train_months: &[NaiveDate],
    actual: &MonthlySeries,
    forecast: &MonthlySeries,
    baseline: Option<&MonthlySeries>,
) -> Result<EvaluationRecord> {
    let test = test_residuals(actual, forecast)?;
    let metrics = calculate_metrics(actual.values(), forecast.values())?;

    let baseline_mape = match baseline {
        Some(b) => {
            actual.ensure_aligned(b)?;
            Some(mape(actual.values(), b.values())?)
        }
        None => None,
    };

    let train = train_residuals(model, train_months)?;
    log::info!(
        "{}: MAE {:.2}, MAPE {:.2}%, RMSE {:.2}",
        target,
        metrics.mae,
        metrics.mape,
        metrics.rmse
    );

    Ok(EvaluationRecord {
        target,
        metrics,
        baseline_mape,
        train_summary: ResidualSummary::from_values(train.values()),
        test_summary: ResidualSummary::from_values(test.values()),
        train_residuals: train,
        test_residuals: test,
    })
}
