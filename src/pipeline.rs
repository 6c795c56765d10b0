//! End-to-end forecasting run.
//!
//! Each stage returns an owned value that the next stage consumes; the
//! whole run is summarized in a [`PipelineReport`]. Data errors abort the
//! run. Numerical fallbacks are collected as warnings. A failure to save
//! artifacts is recorded without discarding the fitted results.

use crate::config::PipelineConfig;
use crate::data::aggregate::{aggregate_monthly, aggregate_monthly_for_store_type};
use crate::data::{train_test_split, MonthlySeries, MonthlyTable, TrainTestSplit, TransactionRow};
use crate::error::{ForecastError, Result};
use crate::evaluate::{evaluate, EvaluationRecord};
use crate::models::{Forecaster, RevenueModel, SalesModel, SeasonalNaive, Target};
use crate::persist::{save_artifacts, ArtifactPaths};
use crate::transform::StandardScaler;

/// Forecast and evaluation of one target over the test window.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub target: Target,
    /// Original-scale forecast, dated by test month.
    pub forecast: MonthlySeries,
    /// Seasonal-naive benchmark over the same months.
    pub baseline: MonthlySeries,
    pub evaluation: EvaluationRecord,
}

/// Results of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub monthly: MonthlyTable,
    pub split: TrainTestSplit,
    pub scaler: StandardScaler,
    pub sales: SalesModel,
    pub revenue: RevenueModel,
    pub sales_outcome: TargetOutcome,
    pub revenue_outcome: TargetOutcome,
    /// Recoverable numerical problems met along the way.
    pub warnings: Vec<ForecastError>,
    /// Where artifacts were written, if saving was requested and succeeded.
    pub artifacts: Option<ArtifactPaths>,
    pub persistence_error: Option<ForecastError>,
}

impl PipelineReport {
    pub fn outcome(&self, target: Target) -> &TargetOutcome {
        match target {
            Target::NetUnits => &self.sales_outcome,
            Target::NetRevenue => &self.revenue_outcome,
        }
    }
}

/// Aggregate `rows` and run the pipeline on the monthly table.
pub fn run(rows: &[TransactionRow], config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let monthly = match &config.store_type {
        Some(store_type) => {
            log::info!("aggregating transactions of store type '{store_type}'");
            aggregate_monthly_for_store_type(rows, store_type)?
        }
        None => aggregate_monthly(rows)?,
    };
    log::info!("aggregated {} transactions into {} months", rows.len(), monthly.len());
    run_monthly(monthly, config)
}

/// Split, scale, fit, forecast, evaluate and save.
pub fn run_monthly(monthly: MonthlyTable, config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let schema = config.schema();
    let split = train_test_split(&monthly, config.horizon)?;

    let train_exog = split.train.exog(&schema)?;
    let test_exog = split.test.exog(&schema)?;
    let scaler = StandardScaler::fit(&train_exog)?;
    let mut warnings = scaler.warnings();
    let train_scaled = scaler.transform(&train_exog)?;
    let test_scaled = scaler.transform(&test_exog)?;

    log::info!("fitting {} with {}", Target::NetUnits.label(), config.sales_order);
    let sales = SalesModel::fit_with(
        &Target::NetUnits.values(&split.train),
        &train_scaled,
        config.sales_order,
        &config.optimizer,
    )?;
    warnings.extend(sales.sarimax().convergence_warning());

    log::info!("fitting {} with {}", Target::NetRevenue.label(), config.revenue_order);
    let revenue = RevenueModel::fit_with(
        &Target::NetRevenue.values(&split.train),
        &train_scaled,
        config.revenue_order,
        &config.optimizer,
    )?;
    warnings.extend(revenue.sarimax().convergence_warning());

    let sales_outcome = score(
        Target::NetUnits,
        &sales,
        sales.forecast(&test_scaled)?,
        &split,
        config.seasonal_period,
    )?;
    let revenue_outcome = score(
        Target::NetRevenue,
        &revenue,
        revenue.forecast(&test_scaled)?,
        &split,
        config.seasonal_period,
    )?;

    let (artifacts, persistence_error) = match &config.artifact_dir {
        Some(dir) => match save_artifacts(dir, &sales, &revenue, &scaler) {
            Ok(paths) => (Some(paths), None),
            Err(err) => {
                log::error!("{err}; fitted results are kept in memory");
                (None, Some(err))
            }
        },
        None => (None, None),
    };

    Ok(PipelineReport {
        monthly,
        split,
        scaler,
        sales,
        revenue,
        sales_outcome,
        revenue_outcome,
        warnings,
        artifacts,
        persistence_error,
    })
}

fn score(
    target: Target,
    model: &dyn Forecaster,
    forecast: Vec<f64>,
    split: &TrainTestSplit,
    period: usize,
) -> Result<TargetOutcome> {
    let actual = split.test.series(target.values(&split.test))?;
    let forecast = split.test.series(forecast)?;

    let naive = SeasonalNaive::fit(&target.values(&split.train), period)?;
    let baseline = split.test.series(naive.predict(split.horizon(), None)?)?;

    let evaluation = evaluate(
        target,
        model,
        &split.train.months(),
        &actual,
        &forecast,
        Some(&baseline),
    )?;

    Ok(TargetOutcome {
        target,
        forecast,
        baseline,
        evaluation,
    })
}
