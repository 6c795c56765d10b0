//! Pipeline configuration.
//!
//! Defaults reproduce the fixed setup: a six-month holdout, monthly data
//! with yearly seasonality, and one fixed SARIMAX order per target. A JSON
//! file may override any subset of fields.

use crate::data::exog::{RegressorSchema, DEFAULT_REGRESSORS};
use crate::error::{ForecastError, Result};
use crate::models::sarimax::SarimaxOrder;
use crate::models::{REVENUE_ORDER, SALES_ORDER};
use crate::utils::optimization::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Months held out for testing.
pub const DEFAULT_HORIZON: usize = 6;

/// Months per seasonal cycle.
pub const SEASONAL_PERIOD: usize = 12;

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub horizon: usize,
    pub seasonal_period: usize,
    pub sales_order: SarimaxOrder,
    pub revenue_order: SarimaxOrder,
    /// Regressor columns in model order.
    pub regressors: Vec<String>,
    /// Where to write artifacts; `None` skips saving.
    pub artifact_dir: Option<PathBuf>,
    /// Restrict the run to one store type.
    pub store_type: Option<String>,
    pub optimizer: NelderMeadConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            seasonal_period: SEASONAL_PERIOD,
            sales_order: SALES_ORDER,
            revenue_order: REVENUE_ORDER,
            regressors: DEFAULT_REGRESSORS.iter().map(|s| s.to_string()).collect(),
            artifact_dir: Some(PathBuf::from("artifacts")),
            store_type: None,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ForecastError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text).map_err(|e| match e {
            ForecastError::Parse { row, message } => ForecastError::Parse {
                row,
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| ForecastError::Parse {
            row: e.line(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidConfig(
                "horizon must be at least 1".to_string(),
            ));
        }
        for order in [&self.sales_order, &self.revenue_order] {
            if order.period != self.seasonal_period {
                return Err(ForecastError::InvalidConfig(format!(
                    "{} does not use the configured seasonal period {}",
                    order, self.seasonal_period
                )));
            }
        }
        Ok(())
    }

    pub fn schema(&self) -> RegressorSchema {
        RegressorSchema::new(self.regressors.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_setup() {
        let config = PipelineConfig::default();
        assert_eq!(config.horizon, 6);
        assert_eq!(config.seasonal_period, 12);
        assert_eq!(config.sales_order, SarimaxOrder::new((1, 1, 0), (0, 1, 1, 12)));
        assert_eq!(config.revenue_order, SarimaxOrder::new((1, 0, 1), (0, 1, 1, 12)));
        assert_eq!(config.schema(), RegressorSchema::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides() {
        let config = PipelineConfig::from_json_str(
            r#"{ "horizon": 3, "artifact_dir": null, "optimizer": { "max_iter": 500 } }"#,
        )
        .unwrap();
        assert_eq!(config.horizon, 3);
        assert!(config.artifact_dir.is_none());
        assert_eq!(config.optimizer.max_iter, 500);
        assert_eq!(config.optimizer.max_restarts, 1);
        assert_eq!(config.sales_order, SALES_ORDER);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            PipelineConfig::from_json_str("{ horizon: }"),
            Err(ForecastError::Parse { .. })
        ));
    }

    #[test]
    fn zero_horizon_rejected() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{ "horizon": 0 }"#),
            Err(ForecastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn period_mismatch_rejected() {
        let config = PipelineConfig {
            seasonal_period: 4,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(&err, ForecastError::InvalidConfig(msg) if msg.contains("period 4")));
        assert_eq!(err.kind(), crate::error::ErrorKind::Data);
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "store_type": "urban" }"#).unwrap();
        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.store_type.as_deref(), Some("urban"));

        let missing = PipelineConfig::from_json_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ForecastError::Io(_))));
    }
}
