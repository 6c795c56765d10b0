//! retail-forecast: batch runner for the monthly forecasting pipeline.
//!
//! Usage:
//!   retail-forecast --data transactions.csv --out artifacts --horizon 6
//!   retail-forecast --config run.json --store-type urban
//!   retail-forecast --seed 7 --no-save

use anyhow::{Context, Result};
use retail_forecast::config::PipelineConfig;
use retail_forecast::data::{
    generate_transactions, load_transactions, DatasetSummary, SyntheticConfig,
};
use retail_forecast::{pipeline, report};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match flag_value(&args, "--config") {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => PipelineConfig::default(),
    };
    config.horizon = parse_arg(&args, "--horizon", config.horizon)?;
    if let Some(dir) = flag_value(&args, "--out") {
        config.artifact_dir = Some(PathBuf::from(dir));
    }
    if args.iter().any(|a| a == "--no-save") {
        config.artifact_dir = None;
    }
    if let Some(store_type) = flag_value(&args, "--store-type") {
        config.store_type = Some(store_type.to_string());
    }

    let rows = match flag_value(&args, "--data") {
        Some(path) => {
            load_transactions(path).with_context(|| format!("loading transactions from {path}"))?
        }
        None => {
            let seed = parse_arg(&args, "--seed", 42u64)?;
            log::info!("no --data given; generating synthetic transactions (seed {seed})");
            generate_transactions(&SyntheticConfig {
                seed,
                ..Default::default()
            })
        }
    };
    log::info!("{}", DatasetSummary::from_rows(&rows)?);

    let result = pipeline::run(&rows, &config).context("forecasting pipeline failed")?;
    report::print_report(&result);

    if let Some(err) = result.persistence_error {
        return Err(err).context("model artifacts were not saved");
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Value of `flag` parsed as `T`, or `default` when the flag is absent.
fn parse_arg<T>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if !args.iter().any(|a| a == flag) {
        return Ok(default);
    }
    let raw = flag_value(args, flag).with_context(|| format!("missing value for {flag}"))?;
    raw.parse()
        .with_context(|| format!("invalid value for {flag}: '{raw}'"))
}
