//! Chronological train/test holdout.

use crate::data::aggregate::MonthlyTable;
use crate::error::{ForecastError, Result};

/// Contiguous training prefix and test suffix of a monthly table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: MonthlyTable,
    pub test: MonthlyTable,
}

impl TrainTestSplit {
    pub fn horizon(&self) -> usize {
        self.test.len()
    }
}

/// Split off the last `horizon` months as the test window.
///
/// No shuffling: the test months always follow the training months.
///
/// # Arguments
/// * `table` - Full monthly table
/// * `horizon` - Number of trailing months held out
///
/// # Returns
/// Train and test tables, or `InsufficientData` unless the table is longer
/// than `horizon`.
pub fn train_test_split(table: &MonthlyTable, horizon: usize) -> Result<TrainTestSplit> {
    let n = table.len();
    if horizon == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if n <= horizon {
        return Err(ForecastError::InsufficientData {
            needed: horizon + 1,
            got: n,
        });
    }

    let cut = n - horizon;
    let split = TrainTestSplit {
        train: table.slice(0, cut),
        test: table.slice(cut, n),
    };
    log::info!(
        "train/test split: {} training months, {} test months",
        split.train.len(),
        split.test.len()
    );
    Ok(split)
}
