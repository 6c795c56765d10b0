//! Differencing utilities for seasonal ARIMA models.
//!
//! Regular and seasonal differencing are combined into a single lag
//! polynomial `(1 - B)^d (1 - B^m)^D`, so differencing and its inverse are
//! both one pass over the series regardless of the orders involved.

/// Multiply two lag polynomials given as coefficient vectors (index = lag).
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Coefficients of `(1 - B)^d (1 - B^period)^seasonal_d`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a lag polynomial: `out[t - K] = sum_k poly[k] * series[t - k]`.
///
/// The result is `K = poly.len() - 1` observations shorter than the input.
pub fn apply_polynomial(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let lag = poly.len().saturating_sub(1);
    if series.len() <= lag {
        return Vec::new();
    }
    (lag..series.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, c)| c * series[t - k])
                .sum()
        })
        .collect()
}

/// Invert [`apply_polynomial`] for future values.
///
/// Given the undifferenced `history` and differenced future values, returns
/// the undifferenced future: `u_t = w_t - sum_{k>=1} poly[k] * u_{t-k}`.
/// `poly[0]` must be 1.
pub fn integrate(history: &[f64], differenced: &[f64], poly: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    extended.reserve(differenced.len());
    for &w in differenced {
        let t = extended.len();
        let carried: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(k, _)| *k <= t)
            .map(|(k, c)| c * extended[t - k])
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(history.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Apply regular differencing `d` times.
    fn difference(series: &[f64], d: usize) -> Vec<f64> {
        let mut result = series.to_vec();
        for _ in 0..d {
            if result.len() <= 1 {
                return Vec::new();
            }
            result = result.windows(2).map(|w| w[1] - w[0]).collect();
        }
        result
    }

    /// Apply seasonal differencing `d` times with the given period.
    fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
        if period == 0 {
            return series.to_vec();
        }
        let mut result = series.to_vec();
        for _ in 0..d {
            if result.len() <= period {
                return Vec::new();
            }
            result = result
                .iter()
                .skip(period)
                .zip(result.iter())
                .map(|(curr, prev)| curr - prev)
                .collect();
        }
        result
    }

    #[test]
    fn difference_order_1() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn difference_order_2() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn seasonal_difference_basic() {
        // Quarterly data: each quarter up by 10 year on year
        let series = vec![100.0, 120.0, 80.0, 90.0, 110.0, 130.0, 90.0, 100.0];
        assert_eq!(
            seasonal_difference(&series, 1, 4),
            vec![10.0, 10.0, 10.0, 10.0]
        );
    }

    #[test]
    fn polynomial_for_monthly_airline_model() {
        let poly = differencing_polynomial(1, 1, 12);
        assert_eq!(poly.len(), 14);
        assert_eq!(poly[0], 1.0);
        assert_eq!(poly[1], -1.0);
        assert_eq!(poly[12], -1.0);
        assert_eq!(poly[13], 1.0);
        assert!(poly[2..12].iter().all(|&c| c == 0.0));
    }

    #[test]
    fn polynomial_matches_sequential_differencing() {
        let series: Vec<f64> = (0..40)
            .map(|i| 50.0 + i as f64 * 1.5 + (i as f64 * 0.52).sin() * 8.0)
            .collect();
        let poly = differencing_polynomial(1, 1, 12);
        let combined = apply_polynomial(&series, &poly);
        let sequential = seasonal_difference(&difference(&series, 1), 1, 12);

        assert_eq!(combined.len(), sequential.len());
        for (a, b) in combined.iter().zip(sequential.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn integrate_reverses_differencing() {
        let series: Vec<f64> = (0..36)
            .map(|i| 100.0 + 3.0 * i as f64 + 20.0 * (i as f64 * std::f64::consts::PI / 6.0).cos())
            .collect();
        let poly = differencing_polynomial(1, 1, 12);
        let diffed = apply_polynomial(&series, &poly);

        let (history, future) = series.split_at(30);
        let offset = 30 - (poly.len() - 1);
        let rebuilt = integrate(history, &diffed[offset..], &poly);

        assert_eq!(rebuilt.len(), future.len());
        for (a, b) in rebuilt.iter().zip(future.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn identity_polynomial() {
        let poly = differencing_polynomial(0, 0, 12);
        assert_eq!(poly, vec![1.0]);
        assert_eq!(apply_polynomial(&[1.0, 2.0], &poly), vec![1.0, 2.0]);
        assert_eq!(integrate(&[1.0], &[5.0, 6.0], &poly), vec![5.0, 6.0]);
    }

    #[test]
    fn too_short_series() {
        let poly = differencing_polynomial(0, 1, 12);
        assert!(apply_polynomial(&[1.0; 12], &poly).is_empty());
        assert!(seasonal_difference(&[1.0; 12], 1, 12).is_empty());
    }
}
