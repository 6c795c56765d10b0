//! Monthly aggregation of transaction rows.
//!
//! Targets are summed; proportion-style regressors (promotion, weekend) are
//! averaged so they read as "fraction of transactions with the property";
//! the holiday flag takes the monthly maximum so a single holiday marks the
//! whole month; discount is averaged.

use crate::data::exog::{ExogMatrix, RegressorSchema};
use crate::data::transaction::TransactionRow;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar month of aggregated transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    /// Last day of the month.
    pub month: NaiveDate,
    pub net_units: f64,
    pub net_revenue: f64,
    pub promotion: f64,
    pub is_holiday: f64,
    pub weekend: f64,
    pub discount_pct: f64,
    /// Number of transactions that fell in the month.
    pub transactions: usize,
}

impl MonthlyRow {
    /// Look up a regressor value by column name.
    pub fn regressor(&self, name: &str) -> Option<f64> {
        match name {
            "promotion" => Some(self.promotion),
            "is_holiday" => Some(self.is_holiday),
            "weekend" => Some(self.weekend),
            "discount_pct" => Some(self.discount_pct),
            _ => None,
        }
    }

    fn empty(month: NaiveDate) -> Self {
        Self {
            month,
            net_units: 0.0,
            net_revenue: 0.0,
            promotion: 0.0,
            is_holiday: 0.0,
            weekend: 0.0,
            discount_pct: 0.0,
            transactions: 0,
        }
    }
}

/// Chronologically ordered monthly series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyTable {
    rows: Vec<MonthlyRow>,
}

impl MonthlyTable {
    /// Wrap rows, checking they are strictly increasing by month.
    pub fn new(rows: Vec<MonthlyRow>) -> Result<Self> {
        if let Some(w) = rows.windows(2).find(|w| w[1].month <= w[0].month) {
            return Err(ForecastError::Unordered(format!(
                "{} followed by {}",
                w[0].month, w[1].month
            )));
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MonthlyRow] {
        &self.rows
    }

    pub fn months(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.month).collect()
    }

    pub fn net_units(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.net_units).collect()
    }

    pub fn net_revenue(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.net_revenue).collect()
    }

    /// Pair `values` with this table's months.
    pub fn series(&self, values: Vec<f64>) -> Result<MonthlySeries> {
        MonthlySeries::new(self.months(), values)
    }

    /// Regressor matrix in schema order.
    pub fn exog(&self, schema: &RegressorSchema) -> Result<ExogMatrix> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let values = schema
                .names()
                .iter()
                .map(|name| {
                    row.regressor(name)
                        .ok_or_else(|| ForecastError::MissingColumn(name.clone()))
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(values);
        }
        ExogMatrix::new(schema.clone(), rows)
    }

    /// Contiguous sub-range `[start, end)`.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            rows: self.rows[start..end].to_vec(),
        }
    }
}

/// Values keyed by month: a target column, a forecast or a residual series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlySeries {
    months: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl MonthlySeries {
    pub fn new(months: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if months.len() != values.len() {
            return Err(ForecastError::LengthMismatch(format!(
                "{} months but {} values",
                months.len(),
                values.len()
            )));
        }
        Ok(Self { months, values })
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.months.iter().copied().zip(self.values.iter().copied())
    }

    /// Fail unless both series cover the same months in the same order.
    pub fn ensure_aligned(&self, other: &MonthlySeries) -> Result<()> {
        if self.len() != other.len() {
            return Err(ForecastError::LengthMismatch(format!(
                "{} values against {}",
                self.len(),
                other.len()
            )));
        }
        if let Some((a, b)) = self
            .months
            .iter()
            .zip(other.months.iter())
            .find(|(a, b)| a != b)
        {
            return Err(ForecastError::LengthMismatch(format!(
                "month {a} paired with {b}"
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
struct MonthAccumulator {
    net_units: i64,
    net_revenue: f64,
    promotions: usize,
    holiday: bool,
    weekends: usize,
    discount_sum: f64,
    count: usize,
}

impl MonthAccumulator {
    fn push(&mut self, row: &TransactionRow) {
        self.net_units += row.net_units;
        self.net_revenue += row.net_revenue;
        self.promotions += usize::from(row.promotion);
        self.holiday |= row.is_holiday;
        self.weekends += usize::from(row.weekend);
        self.discount_sum += row.discount_pct;
        self.count += 1;
    }

    fn finish(self, month: NaiveDate) -> MonthlyRow {
        let n = self.count as f64;
        MonthlyRow {
            month,
            net_units: self.net_units as f64,
            net_revenue: self.net_revenue,
            promotion: self.promotions as f64 / n,
            is_holiday: if self.holiday { 1.0 } else { 0.0 },
            weekend: self.weekends as f64 / n,
            discount_pct: self.discount_sum / n,
            transactions: self.count,
        }
    }
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

fn next_month_end(month: NaiveDate) -> NaiveDate {
    month
        .succ_opt()
        .map(month_end)
        .unwrap_or(month)
}

/// Collapse transactions into one row per calendar month.
///
/// Months inside the covered range that have no transactions get a zero row.
///
/// # Arguments
/// * `rows` - Daily transactions in any order
///
/// # Returns
/// Monthly table keyed by month end, or `EmptyInput` when `rows` is empty.
pub fn aggregate_monthly(rows: &[TransactionRow]) -> Result<MonthlyTable> {
    aggregate_rows(rows.iter())
}

/// Aggregate only the transactions of one store type.
pub fn aggregate_monthly_for_store_type(
    rows: &[TransactionRow],
    store_type: &str,
) -> Result<MonthlyTable> {
    aggregate_rows(rows.iter().filter(|r| r.store_type == store_type)).map_err(|e| match e {
        ForecastError::EmptyInput(_) => {
            ForecastError::EmptyInput(format!("no transactions for store type '{store_type}'"))
        }
        other => other,
    })
}

fn aggregate_rows<'a, I>(rows: I) -> Result<MonthlyTable>
where
    I: Iterator<Item = &'a TransactionRow>,
{
    let mut months: BTreeMap<NaiveDate, MonthAccumulator> = BTreeMap::new();
    for row in rows {
        months.entry(month_end(row.date)).or_default().push(row);
    }

    let (first, last) = match (months.keys().next(), months.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(ForecastError::EmptyInput(
                "transaction table has zero rows".to_string(),
            ))
        }
    };

    let mut out = Vec::with_capacity(months.len());
    let mut month = first;
    while month <= last {
        match months.remove(&month) {
            Some(acc) => out.push(acc.finish(month)),
            None => {
                log::warn!("no transactions in {month}; filling the month with zeros");
                out.push(MonthlyRow::empty(month));
            }
        }
        let next = next_month_end(month);
        if next == month {
            break;
        }
        month = next;
    }

    log::debug!("aggregated {} monthly rows ({} .. {})", out.len(), first, last);
    MonthlyTable::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tx(
        date: (i32, u32, u32),
        units: i64,
        promo: bool,
        holiday: bool,
        weekend: bool,
        disc: f64,
    ) -> TransactionRow {
        TransactionRow {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            store_id: "S1".to_string(),
            product_id: "P1".to_string(),
            net_units: units,
            net_revenue: units as f64 * 10.0,
            store_type: "urban".to_string(),
            promotion: promo,
            is_holiday: holiday,
            weekend,
            discount_pct: disc,
        }
    }

    #[test]
    fn month_end_handles_lengths() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 2, 1)), d(2023, 2, 28));
        assert_eq!(month_end(d(2023, 12, 31)), d(2023, 12, 31));
        assert_eq!(month_end(d(2023, 4, 30)), d(2023, 4, 30));
    }

    #[test]
    fn aggregation_uses_sum_mean_and_max() {
        let rows = vec![
            tx((2022, 1, 3), 4, true, false, false, 10.0),
            tx((2022, 1, 8), 6, false, true, true, 20.0),
            tx((2022, 1, 20), 2, false, false, false, 0.0),
            tx((2022, 1, 29), 8, true, false, true, 30.0),
            tx((2022, 2, 1), 5, false, false, false, 5.0),
        ];
        let table = aggregate_monthly(&rows).unwrap();
        assert_eq!(table.len(), 2);

        let jan = &table.rows()[0];
        assert_eq!(jan.month, NaiveDate::from_ymd_opt(2022, 1, 31).unwrap());
        assert_relative_eq!(jan.net_units, 20.0);
        assert_relative_eq!(jan.net_revenue, 200.0);
        assert_relative_eq!(jan.promotion, 0.5);
        assert_relative_eq!(jan.is_holiday, 1.0);
        assert_relative_eq!(jan.weekend, 0.5);
        assert_relative_eq!(jan.discount_pct, 15.0);
        assert_eq!(jan.transactions, 4);

        let feb = &table.rows()[1];
        assert_relative_eq!(feb.is_holiday, 0.0);
        assert_relative_eq!(feb.net_units, 5.0);
    }

    #[test]
    fn unsorted_input_is_ordered() {
        let rows = vec![
            tx((2022, 3, 3), 1, false, false, false, 0.0),
            tx((2022, 1, 3), 1, false, false, false, 0.0),
            tx((2022, 2, 3), 1, false, false, false, 0.0),
        ];
        let table = aggregate_monthly(&rows).unwrap();
        let months: Vec<u32> = table.months().iter().map(|m| m.month()).collect();
        assert_eq!(months, vec![1, 2, 3]);
    }

    #[test]
    fn gap_months_are_zero_filled() {
        let rows = vec![
            tx((2022, 11, 3), 3, true, false, false, 0.0),
            tx((2023, 2, 3), 1, false, false, false, 0.0),
        ];
        let table = aggregate_monthly(&rows).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows()[1].transactions, 0);
        assert_relative_eq!(table.rows()[2].net_units, 0.0);
        assert_eq!(
            table.rows()[2].month,
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()
        );
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            aggregate_monthly(&[]),
            Err(ForecastError::EmptyInput(_))
        ));
    }

    #[test]
    fn store_type_filter() {
        let mut rural = tx((2022, 1, 3), 7, false, false, false, 0.0);
        rural.store_type = "rural".to_string();
        let rows = vec![tx((2022, 1, 4), 3, false, false, false, 0.0), rural];

        let table = aggregate_monthly_for_store_type(&rows, "rural").unwrap();
        assert_relative_eq!(table.rows()[0].net_units, 7.0);

        let missing = aggregate_monthly_for_store_type(&rows, "mall");
        assert!(matches!(missing, Err(ForecastError::EmptyInput(msg)) if msg.contains("mall")));
    }

    #[test]
    fn table_rejects_unordered_months() {
        let d = |m| NaiveDate::from_ymd_opt(2023, m, 1).map(month_end).unwrap();
        let swapped = vec![MonthlyRow::empty(d(2)), MonthlyRow::empty(d(1))];
        assert!(matches!(
            MonthlyTable::new(swapped),
            Err(ForecastError::Unordered(msg)) if msg.contains("2023-02-28")
        ));
        let repeated = vec![MonthlyRow::empty(d(3)), MonthlyRow::empty(d(3))];
        assert!(matches!(
            MonthlyTable::new(repeated),
            Err(ForecastError::Unordered(_))
        ));
    }

    #[test]
    fn monthly_series_alignment() {
        let d = |m| NaiveDate::from_ymd_opt(2023, m, 1).map(month_end).unwrap();
        let a = MonthlySeries::new(vec![d(1), d(2)], vec![1.0, 2.0]).unwrap();
        let b = MonthlySeries::new(vec![d(1), d(2)], vec![5.0, 6.0]).unwrap();
        let shifted = MonthlySeries::new(vec![d(2), d(3)], vec![5.0, 6.0]).unwrap();
        assert!(a.ensure_aligned(&b).is_ok());
        assert!(matches!(
            a.ensure_aligned(&shifted),
            Err(ForecastError::LengthMismatch(_))
        ));
        assert!(MonthlySeries::new(vec![d(1)], vec![1.0, 2.0]).is_err());
        assert_eq!(a.iter().last(), Some((d(2), 2.0)));
    }

    #[test]
    fn exog_follows_schema_order() {
        let rows = vec![tx((2022, 1, 3), 4, true, true, false, 12.0)];
        let table = aggregate_monthly(&rows).unwrap();
        let schema = RegressorSchema::new(["discount_pct", "promotion"]);
        let exog = table.exog(&schema).unwrap();
        assert_eq!(exog.row(0), &[12.0, 1.0]);

        let unknown = RegressorSchema::new(["footfall"]);
        assert_eq!(
            table.exog(&unknown),
            Err(ForecastError::MissingColumn("footfall".to_string()))
        );
    }
}
