//! Console summary of a pipeline run.
//!
//! Output errors are logged and dropped; they never change the run's
//! results.

use crate::models::Target;
use crate::pipeline::PipelineReport;
use crate::utils::metrics::AccuracyMetrics;
use std::io::{self, Write};

/// Round to an integer and group digits by thousands: `1234.6 -> "1,235"`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// `Sales Model → MAE: 1,234 | MAPE: 5.12%`
pub fn summary_line(label: &str, metrics: &AccuracyMetrics) -> String {
    format!(
        "{} → MAE: {} | MAPE: {:.2}%",
        label,
        format_thousands(metrics.mae),
        metrics.mape
    )
}

/// Write the full summary to `out`.
pub fn write_report<W: Write>(out: &mut W, report: &PipelineReport) -> io::Result<()> {
    writeln!(
        out,
        "Trained on {} months, tested on {} months",
        report.split.train.len(),
        report.split.test.len()
    )?;
    for target in Target::ALL {
        let outcome = report.outcome(target);
        let evaluation = &outcome.evaluation;
        writeln!(out, "{}", summary_line(target.label(), &evaluation.metrics))?;
        if let Some(baseline) = evaluation.baseline_mape {
            writeln!(out, "  seasonal naive MAPE: {baseline:.2}%")?;
        }
        for (month, value) in outcome.forecast.iter() {
            writeln!(out, "  {} forecast {}", month, format_thousands(value))?;
        }
    }
    for warning in &report.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    match (&report.artifacts, &report.persistence_error) {
        (Some(paths), _) => writeln!(
            out,
            "Saved {}, {} and {}",
            paths.sales.display(),
            paths.revenue.display(),
            paths.scaler.display()
        )?,
        (None, Some(err)) => writeln!(out, "Artifacts not saved: {err}")?,
        (None, None) => {}
    }
    out.flush()
}

/// Print the summary to stdout.
pub fn print_report(report: &PipelineReport) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(err) = write_report(&mut handle, report) {
        log::warn!("could not print report: {err}");
    }
}
