//! The two forecast targets and their fixed model specifications.
//!
//! Each target model fits a [`Sarimax`] on `log1p` of the monthly target
//! and returns forecasts on the original scale, clamped at zero. In-sample
//! fitted values and residuals stay on the log scale the model was
//! estimated on.

use crate::data::aggregate::MonthlyTable;
use crate::data::exog::ExogMatrix;
use crate::error::Result;
use crate::models::sarimax::{Sarimax, SarimaxOrder};
use crate::models::Forecaster;
use crate::transform::log::{expm1, log1p};
use crate::utils::optimization::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sales volume: SARIMAX(1,1,0)(0,1,1)[12].
pub const SALES_ORDER: SarimaxOrder = SarimaxOrder::new((1, 1, 0), (0, 1, 1, 12));

/// Revenue: SARIMAX(1,0,1)(0,1,1)[12].
pub const REVENUE_ORDER: SarimaxOrder = SarimaxOrder::new((1, 0, 1), (0, 1, 1, 12));

/// A forecast target column of the monthly table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    NetUnits,
    NetRevenue,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::NetUnits, Target::NetRevenue];

    /// Column name in the input data.
    pub fn column(&self) -> &'static str {
        match self {
            Target::NetUnits => "net_units",
            Target::NetRevenue => "net_revenue",
        }
    }

    /// Display label used in the console summary.
    pub fn label(&self) -> &'static str {
        match self {
            Target::NetUnits => "Sales Model",
            Target::NetRevenue => "Revenue Model",
        }
    }

    pub fn default_order(&self) -> SarimaxOrder {
        match self {
            Target::NetUnits => SALES_ORDER,
            Target::NetRevenue => REVENUE_ORDER,
        }
    }

    /// Target values of every month in `table`.
    pub fn values(&self, table: &MonthlyTable) -> Vec<f64> {
        match self {
            Target::NetUnits => table.net_units(),
            Target::NetRevenue => table.net_revenue(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

macro_rules! target_model {
    ($(#[$meta:meta])* $name:ident, $target:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            model: Sarimax,
        }

        impl $name {
            pub const TARGET: Target = $target;

            /// Fit with the target's fixed order and default optimizer settings.
            pub fn fit(values: &[f64], exog: &ExogMatrix) -> Result<Self> {
                Self::fit_with(
                    values,
                    exog,
                    Self::TARGET.default_order(),
                    &NelderMeadConfig::default(),
                )
            }

            /// Fit on original-scale `values` with scaled regressors `exog`.
            pub fn fit_with(
                values: &[f64],
                exog: &ExogMatrix,
                order: SarimaxOrder,
                config: &NelderMeadConfig,
            ) -> Result<Self> {
                let model =
                    Sarimax::fit(Self::TARGET.column(), &log1p(values), exog, order, config)?;
                Ok(Self { model })
            }

            /// Original-scale forecast, one value per row of `exog`.
            pub fn forecast(&self, exog: &ExogMatrix) -> Result<Vec<f64>> {
                Ok(expm1(&self.model.forecast(exog)?))
            }

            /// The underlying log-scale model.
            pub fn sarimax(&self) -> &Sarimax {
                &self.model
            }
        }

        impl Forecaster for $name {
            fn predict(&self, horizon: usize, exog: Option<&ExogMatrix>) -> Result<Vec<f64>> {
                Ok(expm1(&self.model.predict(horizon, exog)?))
            }

            fn fitted_values(&self) -> &[f64] {
                self.model.fitted_values()
            }

            fn residuals(&self) -> &[f64] {
                self.model.residuals()
            }

            fn residual_offset(&self) -> usize {
                self.model.residual_offset()
            }

            fn name(&self) -> &str {
                Self::TARGET.label()
            }
        }
    };
}

target_model!(
    /// Monthly net units model.
    SalesModel,
    Target::NetUnits
);

target_model!(
    /// Monthly net revenue model.
    RevenueModel,
    Target::NetRevenue
);
