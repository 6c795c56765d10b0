//! Standardization of exogenous regressors.
//!
//! Statistics are fitted on the training window only and reused for every
//! later transform, so test-window values never influence the scaling.

use crate::data::exog::{ExogMatrix, RegressorSchema};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Below this the training standard deviation is treated as zero.
const DEGENERATE_STD: f64 = 1e-12;

/// Per-column z-score scaler, `x_scaled = (x - mean) / std`.
///
/// Uses the population standard deviation. A column that is constant over
/// the training window keeps `std = 1` and is listed in
/// [`StandardScaler::degenerate_columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    schema: RegressorSchema,
    means: Vec<f64>,
    stds: Vec<f64>,
    degenerate: Vec<String>,
}

impl StandardScaler {
    /// Fit column statistics on training regressors.
    pub fn fit(train: &ExogMatrix) -> Result<Self> {
        if train.n_rows() == 0 {
            return Err(ForecastError::EmptyInput(
                "cannot fit scaler on zero training rows".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(train.n_cols());
        let mut stds = Vec::with_capacity(train.n_cols());
        let mut degenerate = Vec::new();

        for (j, name) in train.schema().names().iter().enumerate() {
            let column = train.column(j);
            let mean = column.iter().mean();
            let std = column.iter().population_std_dev();

            if !std.is_finite() || std < DEGENERATE_STD {
                log::warn!("{}", ForecastError::DegenerateColumn(name.clone()));
                degenerate.push(name.clone());
                stds.push(1.0);
            } else {
                stds.push(std);
            }
            means.push(mean);
        }

        Ok(Self {
            schema: train.schema().clone(),
            means,
            stds,
            degenerate,
        })
    }

    /// Scale a matrix with the fitted statistics.
    pub fn transform(&self, exog: &ExogMatrix) -> Result<ExogMatrix> {
        self.schema.ensure_matches(exog.schema())?;
        Ok(exog.map_columns(|j, x| (x - self.means[j]) / self.stds[j]))
    }

    /// Undo [`StandardScaler::transform`].
    pub fn inverse_transform(&self, exog: &ExogMatrix) -> Result<ExogMatrix> {
        self.schema.ensure_matches(exog.schema())?;
        Ok(exog.map_columns(|j, z| z * self.stds[j] + self.means[j]))
    }

    pub fn schema(&self) -> &RegressorSchema {
        &self.schema
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Standard deviations actually used, with 1.0 for degenerate columns.
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn degenerate_columns(&self) -> &[String] {
        &self.degenerate
    }

    /// One `DegenerateColumn` warning per constant training column.
    pub fn warnings(&self) -> Vec<ForecastError> {
        self.degenerate
            .iter()
            .cloned()
            .map(ForecastError::DegenerateColumn)
            .collect()
    }
}
