//! Named regressor schema and the exogenous matrix built from it.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Regressors used by both targets, in column order.
pub const DEFAULT_REGRESSORS: [&str; 4] = ["promotion", "is_holiday", "weekend", "discount_pct"];

/// Ordered list of regressor names.
///
/// Every stage that consumes an [`ExogMatrix`] checks it against the schema it
/// was fitted with, so a reordered or missing column is reported instead of
/// silently mixing up coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressorSchema {
    names: Vec<String>,
}

impl RegressorSchema {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Fail unless `other` has the same names in the same order.
    pub fn ensure_matches(&self, other: &RegressorSchema) -> Result<()> {
        if self.len() != other.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        if self.names != other.names {
            return Err(ForecastError::SchemaMismatch {
                expected: self.names.join(", "),
                got: other.names.join(", "),
            });
        }
        Ok(())
    }
}

impl Default for RegressorSchema {
    fn default() -> Self {
        Self::new(DEFAULT_REGRESSORS)
    }
}

/// Row-major matrix of regressor values: `rows[observation][column]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogMatrix {
    schema: RegressorSchema,
    rows: Vec<Vec<f64>>,
}

impl ExogMatrix {
    /// Build a matrix, checking every row has one value per schema column.
    pub fn new(schema: RegressorSchema, rows: Vec<Vec<f64>>) -> Result<Self> {
        for row in &rows {
            if row.len() != schema.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: schema.len(),
                    got: row.len(),
                });
            }
        }
        Ok(Self { schema, rows })
    }

    /// Build from column vectors laid out in schema order.
    pub fn from_columns(schema: RegressorSchema, columns: &[Vec<f64>]) -> Result<Self> {
        if columns.len() != schema.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: schema.len(),
                got: columns.len(),
            });
        }
        let n = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n) {
            return Err(ForecastError::LengthMismatch(format!(
                "regressor columns have {} and {} observations",
                n,
                bad.len()
            )));
        }
        let rows = (0..n)
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &RegressorSchema {
        &self.schema
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.schema.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    /// Copy out one column.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }

    pub fn columns(&self) -> Vec<Vec<f64>> {
        (0..self.n_cols()).map(|j| self.column(j)).collect()
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Apply a per-column map, keeping the schema.
    pub(crate) fn map_columns<F>(&self, f: F) -> Self
    where
        F: Fn(usize, f64) -> f64,
    {
        let rows = self
            .rows
            .iter()
            .map(|r| r.iter().enumerate().map(|(j, &v)| f(j, v)).collect())
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_order() {
        let schema = RegressorSchema::default();
        assert_eq!(
            schema.names(),
            &["promotion", "is_holiday", "weekend", "discount_pct"]
        );
        assert_eq!(schema.position("weekend"), Some(2));
    }

    #[test]
    fn schema_mismatch_is_reported() {
        let a = RegressorSchema::new(["promotion", "weekend"]);
        let b = RegressorSchema::new(["weekend", "promotion"]);
        assert!(matches!(
            a.ensure_matches(&b),
            Err(ForecastError::SchemaMismatch { .. })
        ));

        let c = RegressorSchema::new(["promotion"]);
        assert!(matches!(
            a.ensure_matches(&c),
            Err(ForecastError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(a.ensure_matches(&a.clone()).is_ok());
    }

    #[test]
    fn from_columns_transposes() {
        let schema = RegressorSchema::new(["a", "b"]);
        let m = ExogMatrix::from_columns(schema, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.row(1), &[2.0, 5.0]);
        assert_eq!(m.column(1), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let schema = RegressorSchema::new(["a", "b"]);
        let result = ExogMatrix::new(schema, vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }
}
