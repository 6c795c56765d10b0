//! Transaction rows and CSV loading.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

/// Columns the pipeline reads from the transaction file.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "date",
    "store_id",
    "product_id",
    "net_units",
    "net_revenue",
    "store_type",
    "promotion",
    "is_holiday",
    "weekend",
    "discount_pct",
];

/// One retail transaction. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub date: NaiveDate,
    pub store_id: String,
    pub product_id: String,
    pub net_units: i64,
    pub net_revenue: f64,
    pub store_type: String,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub promotion: bool,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub is_holiday: bool,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub weekend: bool,
    pub discount_pct: f64,
}

/// Accept `0`/`1`, `0.0`/`1.0` and `true`/`false` in any case.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "t" | "yes" => Ok(true),
        "0" | "0.0" | "false" | "f" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a 0/1 or true/false flag, got '{other}'"
        ))),
    }
}

fn serialize_flag<S>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

/// Load transactions from a CSV file with a header row.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRow>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| ForecastError::Io(format!("{}: {e}", path.display())))?;
    let rows = read_transactions(file)?;
    log::info!("loaded {} transactions from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read transactions from any CSV source. Extra columns are ignored.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<TransactionRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ForecastError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        rows.push(record?);
    }

    if rows.is_empty() {
        return Err(ForecastError::EmptyInput(
            "transaction file has no data rows".to_string(),
        ));
    }
    Ok(rows)
}

/// Write transactions as CSV with a header row.
pub fn write_transactions<P: AsRef<Path>>(rows: &[TransactionRow], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| ForecastError::Io(format!("{}: {e}", path.display())))?;
    Ok(())
}

/// Overview of a loaded transaction table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub stores: usize,
    pub products: usize,
    pub store_types: Vec<String>,
    pub total_units: i64,
    pub total_revenue: f64,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[TransactionRow]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| ForecastError::EmptyInput("no transactions".to_string()))?;

        let mut first_date = first.date;
        let mut last_date = first.date;
        let mut stores = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut store_types = BTreeSet::new();
        let mut total_units = 0;
        let mut total_revenue = 0.0;

        for row in rows {
            first_date = first_date.min(row.date);
            last_date = last_date.max(row.date);
            stores.insert(row.store_id.as_str());
            products.insert(row.product_id.as_str());
            store_types.insert(row.store_type.as_str());
            total_units += row.net_units;
            total_revenue += row.net_revenue;
        }

        Ok(Self {
            rows: rows.len(),
            first_date,
            last_date,
            stores: stores.len(),
            products: products.len(),
            store_types: store_types.into_iter().map(String::from).collect(),
            total_units,
            total_revenue,
        })
    }
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} transactions from {} to {} across {} stores ({}) and {} products; \
             {} units, revenue {:.2}",
            self.rows,
            self.first_date,
            self.last_date,
            self.stores,
            self.store_types.join("/"),
            self.products,
            self.total_units,
            self.total_revenue
        )
    }
}
