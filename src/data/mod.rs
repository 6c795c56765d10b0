//! Input data: transaction loading, monthly aggregation and holdout split.

pub mod aggregate;
pub mod exog;
pub mod split;
pub mod synthetic;
pub mod transaction;

pub use aggregate::{
    aggregate_monthly, aggregate_monthly_for_store_type, month_end, MonthlyRow, MonthlySeries,
    MonthlyTable,
};
pub use exog::{ExogMatrix, RegressorSchema, DEFAULT_REGRESSORS};
pub use split::{train_test_split, TrainTestSplit};
pub use synthetic::{generate_transactions, SyntheticConfig};
pub use transaction::{
    load_transactions, read_transactions, write_transactions, DatasetSummary, TransactionRow,
    REQUIRED_COLUMNS,
};
