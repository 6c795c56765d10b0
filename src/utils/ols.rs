//! Least-squares regression on an ordered regressor matrix.
//!
//! Used to seed the exogenous coefficients of the SARIMAX fit. Columns are
//! taken in [`ExogMatrix`] schema order.

use crate::data::exog::ExogMatrix;
use crate::error::{ForecastError, Result};

/// Ridge term added to the normal-equation diagonal.
const RIDGE: f64 = 1e-8;

/// OLS regression coefficients and optional intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct OLSResult {
    /// One coefficient per regressor column.
    pub coefficients: Vec<f64>,
    /// Zero when fitted without an intercept.
    pub intercept: f64,
}

impl OLSResult {
    /// Predict values for each row of `x`.
    pub fn predict(&self, x: &ExogMatrix) -> Result<Vec<f64>> {
        if x.n_cols() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: x.n_cols(),
            });
        }
        Ok(x.rows()
            .iter()
            .map(|row| self.intercept + dot(row, &self.coefficients))
            .collect())
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Fit `y = intercept + X @ coefficients` by solving the normal equations.
///
/// A tiny ridge term keeps the system solvable when a column is all zero or
/// columns are collinear; such columns get coefficients near zero.
pub fn ols_fit(y: &[f64], x: &ExogMatrix, intercept: bool) -> Result<OLSResult> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if x.n_rows() != n {
        return Err(ForecastError::LengthMismatch(format!(
            "{} target values but {} regressor rows",
            n,
            x.n_rows()
        )));
    }

    let k = x.n_cols();
    let offset = usize::from(intercept);
    let p = k + offset;
    if p == 0 {
        return Ok(OLSResult {
            coefficients: vec![],
            intercept: 0.0,
        });
    }

    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];
    let mut design = vec![0.0; p];

    for (row, &target) in x.rows().iter().zip(y.iter()) {
        if intercept {
            design[0] = 1.0;
        }
        design[offset..].copy_from_slice(row);
        for i in 0..p {
            xty[i] += design[i] * target;
            for j in 0..p {
                xtx[i][j] += design[i] * design[j];
            }
        }
    }

    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += RIDGE;
    }

    let beta = solve_symmetric(&xtx, &xty).unwrap_or_else(|| {
        log::warn!("least-squares system not positive definite; starting from zero coefficients");
        vec![0.0; p]
    });

    Ok(OLSResult {
        intercept: if intercept { beta[0] } else { 0.0 },
        coefficients: beta[offset..].to_vec(),
    })
}

/// Solve a symmetric positive definite system `A x = b` by Cholesky.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
