//! Log transform pair for non-negative targets.

/// `ln(1 + x)` elementwise.
pub fn log1p(series: &[f64]) -> Vec<f64> {
    series.iter().map(|x| x.ln_1p()).collect()
}

/// `exp(x) - 1` elementwise, clamped at zero so forecasts stay non-negative.
///
/// NaN passes through unchanged.
pub fn expm1(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .map(|x| {
            let v = x.exp_m1();
            if v < 0.0 {
                0.0
            } else {
                v
            }
        })
        .collect()
}
