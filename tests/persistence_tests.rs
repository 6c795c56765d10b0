//! Saving and reloading pipeline artifacts.

use retail_forecast::config::PipelineConfig;
use retail_forecast::data::{generate_transactions, ExogMatrix, RegressorSchema, SyntheticConfig};
use retail_forecast::error::{ErrorKind, ForecastError};
use retail_forecast::models::Forecaster;
use retail_forecast::persist::{
    load_artifacts, save_json, REVENUE_MODEL_FILE, SALES_MODEL_FILE, SCALER_FILE,
};
use retail_forecast::pipeline::run;

fn small_dataset() -> Vec<retail_forecast::data::TransactionRow> {
    generate_transactions(&SyntheticConfig {
        stores: 2,
        products: 2,
        seed: 17,
        ..Default::default()
    })
}

#[test]
fn reloaded_models_forecast_identically() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        artifact_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let report = run(&small_dataset(), &config).unwrap();
    assert!(report.persistence_error.is_none());

    for name in [SALES_MODEL_FILE, REVENUE_MODEL_FILE, SCALER_FILE] {
        assert!(dir.path().join(name).is_file(), "{name} was not written");
    }

    let artifacts = load_artifacts(dir.path()).unwrap();
    assert_eq!(artifacts.scaler, report.scaler);
    assert_eq!(artifacts.sales, report.sales);
    assert_eq!(artifacts.revenue, report.revenue);

    let test_exog = report.split.test.exog(&config.schema()).unwrap();
    let scaled = artifacts.scaler.transform(&test_exog).unwrap();
    assert_eq!(
        artifacts.sales.forecast(&scaled).unwrap(),
        report.sales_outcome.forecast.values()
    );
    assert_eq!(
        artifacts.revenue.predict(6, Some(&scaled)).unwrap(),
        report.revenue_outcome.forecast.values()
    );
}

#[test]
fn reloaded_scaler_checks_schema() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        artifact_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    run(&small_dataset(), &config).unwrap();
    let artifacts = load_artifacts(dir.path()).unwrap();

    let reordered = ExogMatrix::new(
        RegressorSchema::new(["weekend", "promotion", "is_holiday", "discount_pct"]),
        vec![vec![0.0; 4]; 2],
    )
    .unwrap();
    assert!(matches!(
        artifacts.scaler.transform(&reordered),
        Err(ForecastError::SchemaMismatch { .. })
    ));
}

#[test]
fn save_failure_keeps_results() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "occupied").unwrap();

    let config = PipelineConfig {
        artifact_dir: Some(blocker.join("artifacts")),
        ..Default::default()
    };
    let report = run(&small_dataset(), &config).unwrap();

    let err = report.persistence_error.as_ref().unwrap();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(report.artifacts.is_none());
    assert_eq!(report.sales_outcome.forecast.len(), 6);
    assert_eq!(report.revenue_outcome.forecast.len(), 6);
}

#[test]
fn failed_save_keeps_previous_artifact_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        artifact_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    run(&small_dataset(), &config).unwrap();
    let sales_before = std::fs::read(dir.path().join(SALES_MODEL_FILE)).unwrap();
    let scaler_before = std::fs::read(dir.path().join(SCALER_FILE)).unwrap();

    // A directory where the staged revenue file would go makes that write fail.
    let revenue_staging = dir.path().join(format!("{REVENUE_MODEL_FILE}.tmp"));
    std::fs::create_dir(&revenue_staging).unwrap();

    let other = generate_transactions(&SyntheticConfig {
        stores: 2,
        products: 2,
        seed: 91,
        ..Default::default()
    });
    let report = run(&other, &config).unwrap();
    let err = report.persistence_error.as_ref().unwrap();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(err.to_string().contains(REVENUE_MODEL_FILE));

    assert_eq!(std::fs::read(dir.path().join(SALES_MODEL_FILE)).unwrap(), sales_before);
    assert_eq!(std::fs::read(dir.path().join(SCALER_FILE)).unwrap(), scaler_before);
    assert!(!dir.path().join(format!("{SALES_MODEL_FILE}.tmp")).exists());
    assert!(load_artifacts(dir.path()).is_ok());

    std::fs::remove_dir(&revenue_staging).unwrap();
    let report = run(&other, &config).unwrap();
    assert!(report.persistence_error.is_none());
    let reloaded = load_artifacts(dir.path()).unwrap();
    assert_eq!(reloaded.sales, report.sales);
    assert_ne!(std::fs::read(dir.path().join(SALES_MODEL_FILE)).unwrap(), sales_before);
}

#[test]
fn mismatched_artifacts_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        artifact_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    run(&small_dataset(), &config).unwrap();

    let narrow = PipelineConfig {
        regressors: vec!["promotion".to_string(), "discount_pct".to_string()],
        artifact_dir: None,
        ..Default::default()
    };
    let other = run(&small_dataset(), &narrow).unwrap();
    save_json(&other.scaler, &dir.path().join(SCALER_FILE)).unwrap();

    assert!(matches!(
        load_artifacts(dir.path()),
        Err(ForecastError::DimensionMismatch {
            expected: 2,
            got: 4
        })
    ));
}
