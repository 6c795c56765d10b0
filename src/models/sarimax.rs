//! Regression with seasonal ARIMA errors (SARIMAX).
//!
//! The model is
//!
//! ```text
//! y_t = beta . x_t + u_t
//! phi(B) Phi(B^m) (1 - B)^d (1 - B^m)^D u_t = theta(B) Theta(B^m) e_t
//! ```
//!
//! without an intercept. Parameters are estimated by conditional sum of
//! squares: the regression noise is differenced, the ARMA recursion is run
//! with pre-sample innovations set to zero, and the squared innovations are
//! minimized with Nelder-Mead. Coefficients are not constrained to the
//! stationary or invertible region.

use crate::data::exog::{ExogMatrix, RegressorSchema};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{apply_polynomial, differencing_polynomial, integrate, poly_mul};
use crate::models::Forecaster;
use crate::utils::ols::{dot, ols_fit};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Differenced regressor columns with no value above this are pinned at zero.
const ZERO_COLUMN: f64 = 1e-12;

/// Non-seasonal `(p, d, q)` and seasonal `(P, D, Q, m)` orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaxOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaxOrder {
    /// Build from `(p, d, q)` and `(P, D, Q, m)` tuples.
    pub const fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal.0,
            seasonal_d: seasonal.1,
            seasonal_q: seasonal.2,
            period: seasonal.3,
        }
    }

    /// Observations consumed by differencing, `d + D * m`.
    pub fn diff_lag(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// Highest lag of the combined AR polynomial.
    pub fn ar_lag(&self) -> usize {
        self.p + self.seasonal_p * self.period
    }

    /// Highest lag of the combined MA polynomial.
    pub fn ma_lag(&self) -> usize {
        self.q + self.seasonal_q * self.period
    }

    /// Number of AR, MA, SAR and SMA coefficients.
    pub fn num_arma_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Shortest training series that leaves one more innovation than
    /// there are parameters to estimate with `n_exog` regressors.
    pub fn min_observations(&self, n_exog: usize) -> usize {
        self.diff_lag() + self.ar_lag() + self.num_arma_params() + n_exog + 1
    }
}

impl fmt::Display for SarimaxOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SARIMAX({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
        )
    }
}

/// Estimated coefficients.
///
/// AR terms enter as `1 - phi_1 B - ...`, MA terms as `1 + theta_1 B + ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaxCoefficients {
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// One per regressor in schema order; pinned columns hold 0.
    pub exog: Vec<f64>,
}

impl SarimaxCoefficients {
    /// Unpack an optimizer vector laid out as `[ar, ma, sar, sma, active betas]`.
    fn from_params(order: &SarimaxOrder, params: &[f64], active: &[usize], n_exog: usize) -> Self {
        let mut rest = params;
        let mut take = |n: usize| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            head.to_vec()
        };
        let ar = take(order.p);
        let ma = take(order.q);
        let seasonal_ar = take(order.seasonal_p);
        let seasonal_ma = take(order.seasonal_q);
        let betas = take(active.len());

        let mut exog = vec![0.0; n_exog];
        for (&j, b) in active.iter().zip(betas) {
            exog[j] = b;
        }
        Self {
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
            exog,
        }
    }

    /// `phi(B) Phi(B^m)` as lag coefficients, index 0 = 1.
    fn ar_polynomial(&self, period: usize) -> Vec<f64> {
        let regular = lag_polynomial(&self.ar, 1, -1.0);
        let seasonal = lag_polynomial(&self.seasonal_ar, period, -1.0);
        poly_mul(&regular, &seasonal)
    }

    /// `theta(B) Theta(B^m)` as lag coefficients, index 0 = 1.
    fn ma_polynomial(&self, period: usize) -> Vec<f64> {
        let regular = lag_polynomial(&self.ma, 1, 1.0);
        let seasonal = lag_polynomial(&self.seasonal_ma, period, 1.0);
        poly_mul(&regular, &seasonal)
    }
}

/// `1 + sign * (c_1 B^step + c_2 B^(2 step) + ...)`.
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    if coefficients.is_empty() || step == 0 {
        return vec![1.0];
    }
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Innovations of the ARMA recursion on differenced noise `w`.
///
/// Entries before the AR lag are zero and excluded from the sum of squares.
fn innovations(w: &[f64], ar_poly: &[f64], ma_poly: &[f64]) -> (Vec<f64>, f64) {
    let start = ar_poly.len() - 1;
    let mut e = vec![0.0; w.len()];
    let mut css = 0.0;
    for t in start..w.len() {
        let ar: f64 = ar_poly
            .iter()
            .enumerate()
            .map(|(k, a)| a * w[t - k])
            .sum();
        let ma: f64 = ma_poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(k, _)| *k <= t)
            .map(|(k, b)| b * e[t - k])
            .sum();
        e[t] = ar - ma;
        css += e[t] * e[t];
    }
    (e, css)
}

/// `y - X beta` over the training window.
fn regression_noise(endog: &[f64], exog: &ExogMatrix, beta: &[f64]) -> Vec<f64> {
    endog
        .iter()
        .zip(exog.rows())
        .map(|(y, x)| y - dot(x, beta))
        .collect()
}

/// A fitted SARIMAX model.
///
/// Holds everything needed to forecast: coefficients, the training series
/// and regressors, and the in-sample innovations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sarimax {
    target: String,
    order: SarimaxOrder,
    schema: RegressorSchema,
    coefficients: SarimaxCoefficients,
    sigma2: f64,
    log_likelihood: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
    css: f64,
    iterations: usize,
    converged: bool,
    endog: Vec<f64>,
    exog: ExogMatrix,
    innovations: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl Sarimax {
    /// Fit the model to `endog` with regressors `exog`.
    ///
    /// `target` labels the model in logs and warnings. Non-convergence does
    /// not fail the fit: the best coefficients found are kept and
    /// [`Sarimax::convergence_warning`] reports it.
    ///
    /// # Arguments
    /// * `target` - Name of the modelled column
    /// * `endog` - Training series, already on the modelling scale
    /// * `exog` - Regressors aligned row for row with `endog`
    /// * `order` - Non-seasonal and seasonal orders
    /// * `config` - Nelder-Mead settings for the CSS search
    ///
    /// # Returns
    /// The fitted model, or `InsufficientData` when `endog` is shorter than
    /// [`SarimaxOrder::min_observations`].
    pub fn fit(
        target: &str,
        endog: &[f64],
        exog: &ExogMatrix,
        order: SarimaxOrder,
        config: &NelderMeadConfig,
    ) -> Result<Self> {
        let n = endog.len();
        if exog.n_rows() != n {
            return Err(ForecastError::LengthMismatch(format!(
                "{} target values but {} regressor rows",
                n,
                exog.n_rows()
            )));
        }
        if endog.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite(format!("{target} training series")));
        }
        if !exog.is_finite() {
            return Err(ForecastError::NonFinite(format!("{target} training regressors")));
        }
        let needed = order.min_observations(exog.n_cols());
        if n < needed {
            return Err(ForecastError::InsufficientData { needed, got: n });
        }

        let delta = differencing_polynomial(order.d, order.seasonal_d, order.period);
        let w_endog = apply_polynomial(endog, &delta);
        let w_columns: Vec<Vec<f64>> = exog
            .columns()
            .iter()
            .map(|c| apply_polynomial(c, &delta))
            .collect();

        let names = exog.schema().names();
        let active: Vec<usize> = w_columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.iter().any(|v| v.abs() > ZERO_COLUMN))
            .map(|(j, _)| j)
            .collect();
        for (j, name) in names.iter().enumerate() {
            if !active.contains(&j) {
                log::debug!("{target}: regressor '{name}' is zero after differencing; beta pinned at 0");
            }
        }

        let mut initial = Vec::with_capacity(order.num_arma_params() + active.len());
        for lag_count in [order.p, order.q, order.seasonal_p, order.seasonal_q] {
            initial.extend((0..lag_count).map(|i| 0.1 / (i + 1) as f64));
        }
        if !active.is_empty() {
            let active_exog = ExogMatrix::from_columns(
                RegressorSchema::new(active.iter().map(|&j| names[j].clone())),
                &active.iter().map(|&j| w_columns[j].clone()).collect::<Vec<_>>(),
            )?;
            initial.extend(ols_fit(&w_endog, &active_exog, false)?.coefficients);
        }

        let n_exog = exog.n_cols();
        let period = order.period;
        let objective = |params: &[f64]| {
            let coefs = SarimaxCoefficients::from_params(&order, params, &active, n_exog);
            let noise: Vec<f64> = w_endog
                .iter()
                .enumerate()
                .map(|(t, y)| {
                    y - active
                        .iter()
                        .map(|&j| coefs.exog[j] * w_columns[j][t])
                        .sum::<f64>()
                })
                .collect();
            innovations(
                &noise,
                &coefs.ar_polynomial(period),
                &coefs.ma_polynomial(period),
            )
            .1
        };

        // A pure differencing model has nothing to estimate.
        let (point, iterations, converged) = if initial.is_empty() {
            (Vec::new(), 0, true)
        } else {
            let result = nelder_mead(objective, &initial, config);
            if !result.optimal_value.is_finite() {
                return Err(ForecastError::ConvergenceFailure {
                    target: target.to_string(),
                    iterations: result.iterations,
                    objective: result.optimal_value,
                });
            }
            log::debug!(
                "{target}: Nelder-Mead finished after {} iterations ({} restarts), CSS = {:.6}",
                result.iterations,
                result.restarts,
                result.optimal_value
            );
            (result.optimal_point, result.iterations, result.converged)
        };

        let coefficients = SarimaxCoefficients::from_params(&order, &point, &active, n_exog);
        let noise = regression_noise(endog, exog, &coefficients.exog);
        let w_noise = apply_polynomial(&noise, &delta);
        let (e, css) = innovations(
            &w_noise,
            &coefficients.ar_polynomial(period),
            &coefficients.ma_polynomial(period),
        );

        let start = order.ar_lag();
        let offset = order.diff_lag() + start;
        let residuals = e[start..].to_vec();
        let fitted: Vec<f64> = endog[offset..]
            .iter()
            .zip(residuals.iter())
            .map(|(y, r)| y - r)
            .collect();

        let n_eff = residuals.len() as f64;
        let sigma2 = css / n_eff;
        let n_params = (order.num_arma_params() + active.len() + 1) as f64;
        let log_likelihood = -0.5 * n_eff * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let finite = |v: f64| v.is_finite().then_some(v);
        let aic = -2.0 * log_likelihood + 2.0 * n_params;
        let bic = -2.0 * log_likelihood + n_eff.ln() * n_params;

        let model = Self {
            target: target.to_string(),
            order,
            schema: exog.schema().clone(),
            coefficients,
            sigma2,
            log_likelihood: finite(log_likelihood),
            aic: finite(aic),
            bic: finite(bic),
            css,
            iterations,
            converged,
            endog: endog.to_vec(),
            exog: exog.clone(),
            innovations: e,
            fitted,
            residuals,
        };

        if let Some(warning) = model.convergence_warning() {
            log::warn!("{warning}");
        }
        log::info!(
            "fitted {} {} on {} observations (sigma2 = {:.6})",
            target,
            order,
            n,
            sigma2
        );
        Ok(model)
    }

    /// Forecast one step per row of `exog`, on the scale of the training series.
    ///
    /// `exog` must carry the schema the model was fitted with.
    pub fn forecast(&self, exog: &ExogMatrix) -> Result<Vec<f64>> {
        self.schema.ensure_matches(exog.schema())?;
        if !exog.is_finite() {
            return Err(ForecastError::NonFinite(format!(
                "{} forecast regressors",
                self.target
            )));
        }
        let horizon = exog.n_rows();
        if horizon == 0 {
            return Ok(Vec::new());
        }

        let delta =
            differencing_polynomial(self.order.d, self.order.seasonal_d, self.order.period);
        let ar_poly = self.coefficients.ar_polynomial(self.order.period);
        let ma_poly = self.coefficients.ma_polynomial(self.order.period);

        let noise = regression_noise(&self.endog, &self.exog, &self.coefficients.exog);
        let mut w = apply_polynomial(&noise, &delta);
        let mut e = self.innovations.clone();
        let history = w.len();

        for _ in 0..horizon {
            let t = w.len();
            let ar: f64 = ar_poly
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(k, _)| *k <= t)
                .map(|(k, a)| a * w[t - k])
                .sum();
            let ma: f64 = ma_poly
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(k, _)| *k <= t)
                .map(|(k, b)| b * e[t - k])
                .sum();
            w.push(ma - ar);
            e.push(0.0);
        }

        let future_noise = integrate(&noise, &w[history..], &delta);
        Ok(future_noise
            .iter()
            .zip(exog.rows())
            .map(|(u, x)| u + dot(x, &self.coefficients.exog))
            .collect())
    }

    /// Warning to surface when the optimizer stopped before its tolerance.
    pub fn convergence_warning(&self) -> Option<ForecastError> {
        (!self.converged).then(|| ForecastError::ConvergenceFailure {
            target: self.target.clone(),
            iterations: self.iterations,
            objective: self.css,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn order(&self) -> SarimaxOrder {
        self.order
    }

    pub fn schema(&self) -> &RegressorSchema {
        &self.schema
    }

    pub fn coefficients(&self) -> &SarimaxCoefficients {
        &self.coefficients
    }

    /// Innovation variance, `CSS / n_eff`.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> Option<f64> {
        self.log_likelihood
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Length of the training series.
    pub fn nobs(&self) -> usize {
        self.endog.len()
    }
}

impl Forecaster for Sarimax {
    fn predict(&self, horizon: usize, exog: Option<&ExogMatrix>) -> Result<Vec<f64>> {
        match exog {
            Some(x) if x.n_rows() != horizon => Err(ForecastError::LengthMismatch(format!(
                "horizon {} but {} regressor rows",
                horizon,
                x.n_rows()
            ))),
            Some(x) => self.forecast(x),
            None if self.schema.is_empty() => {
                let empty = ExogMatrix::new(self.schema.clone(), vec![Vec::new(); horizon])?;
                self.forecast(&empty)
            }
            None => Err(ForecastError::DimensionMismatch {
                expected: self.schema.len(),
                got: 0,
            }),
        }
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn residual_offset(&self) -> usize {
        self.order.diff_lag() + self.order.ar_lag()
    }

    fn name(&self) -> &str {
        "SARIMAX"
    }
}
