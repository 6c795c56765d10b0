//! Saving and reloading fitted models and the regressor scaler.
//!
//! Artifacts are JSON files with fixed names inside one directory. Floats
//! are written with round-trip precision, so a reloaded model forecasts
//! exactly what the original did.

use crate::error::{ForecastError, Result};
use crate::models::{RevenueModel, SalesModel};
use crate::transform::StandardScaler;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SALES_MODEL_FILE: &str = "model_net_units.json";
pub const REVENUE_MODEL_FILE: &str = "model_net_revenue.json";
pub const SCALER_FILE: &str = "models_exog_scaler.json";

/// Locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub sales: PathBuf,
    pub revenue: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            sales: dir.join(SALES_MODEL_FILE),
            revenue: dir.join(REVENUE_MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
        }
    }
}

/// Everything needed to forecast both targets from new regressors.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub sales: SalesModel,
    pub revenue: RevenueModel,
    pub scaler: StandardScaler,
}

fn serialization_error(path: &Path, err: impl std::fmt::Display) -> ForecastError {
    ForecastError::Serialization {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Write `value` as pretty-printed JSON.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| serialization_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| serialization_error(path, e))?;
    writer.flush().map_err(|e| serialization_error(path, e))
}

/// Read a value written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| serialization_error(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| serialization_error(path, e))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard_staged(staged: &[PathBuf]) {
    for path in staged {
        if let Err(err) = fs::remove_file(path) {
            log::debug!("could not remove {}: {}", path.display(), err);
        }
    }
}

/// Save both models and the scaler into `dir`, creating it if needed.
///
/// Each file is first written next to its final name with a `.tmp` suffix.
/// The final names are only replaced once all three writes succeeded, so a
/// failed save leaves any earlier artifact set untouched.
///
/// # Arguments
/// * `dir` - Artifact directory
/// * `sales` - Fitted sales model
/// * `revenue` - Fitted revenue model
/// * `scaler` - Scaler fitted on the training regressors
///
/// # Returns
/// The paths of the three written files, or `Serialization` naming the
/// file that could not be written.
pub fn save_artifacts<P: AsRef<Path>>(
    dir: P,
    sales: &SalesModel,
    revenue: &RevenueModel,
    scaler: &StandardScaler,
) -> Result<ArtifactPaths> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| serialization_error(dir, e))?;

    let paths = ArtifactPaths::in_dir(dir);
    let targets = [&paths.sales, &paths.revenue, &paths.scaler];
    let staged: Vec<PathBuf> = targets.iter().map(|p| staging_path(p)).collect();

    let written = save_json(sales, &staged[0])
        .and_then(|_| save_json(revenue, &staged[1]))
        .and_then(|_| save_json(scaler, &staged[2]));
    if let Err(err) = written {
        discard_staged(&staged);
        return Err(err);
    }

    for (tmp, target) in staged.iter().zip(targets) {
        if let Err(err) = fs::rename(tmp, target) {
            discard_staged(&staged);
            return Err(serialization_error(target, err));
        }
    }
    log::info!("saved model artifacts to {}", dir.display());
    Ok(paths)
}

/// Load artifacts saved by [`save_artifacts`].
///
/// Fails with `SchemaMismatch` if the scaler and a model were fitted on
/// different regressors.
pub fn load_artifacts<P: AsRef<Path>>(dir: P) -> Result<Artifacts> {
    let paths = ArtifactPaths::in_dir(dir);
    let artifacts = Artifacts {
        sales: load_json(&paths.sales)?,
        revenue: load_json(&paths.revenue)?,
        scaler: load_json(&paths.scaler)?,
    };
    artifacts
        .scaler
        .schema()
        .ensure_matches(artifacts.sales.sarimax().schema())?;
    artifacts
        .scaler
        .schema()
        .ensure_matches(artifacts.revenue.sarimax().schema())?;
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::exog::{ExogMatrix, RegressorSchema};

    #[test]
    fn file_names_are_fixed() {
        let paths = ArtifactPaths::in_dir("out");
        assert_eq!(paths.sales, Path::new("out/model_net_units.json"));
        assert_eq!(paths.revenue, Path::new("out/model_net_revenue.json"));
        assert_eq!(paths.scaler, Path::new("out/models_exog_scaler.json"));
    }

    #[test]
    fn scaler_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCALER_FILE);
        let train = ExogMatrix::new(
            RegressorSchema::default(),
            vec![vec![0.1, 0.0, 0.3, 7.3], vec![0.7, 1.0, 0.25, 11.9]],
        )
        .unwrap();
        let scaler = StandardScaler::fit(&train).unwrap();

        save_json(&scaler, &path).unwrap();
        let restored: StandardScaler = load_json(&path).unwrap();
        assert_eq!(restored, scaler);
    }

    #[test]
    fn unwritable_target_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("scaler.json");
        let err = save_json(&vec![1.0], &path).unwrap_err();
        assert!(matches!(err, ForecastError::Serialization { .. }));
        assert!(err.to_string().contains("scaler.json"));
    }

    #[test]
    fn missing_artifacts_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ForecastError::Serialization { .. })
        ));
    }
}
