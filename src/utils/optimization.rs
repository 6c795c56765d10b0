//! Derivative-free minimization for model parameter estimation.
//!
//! Parameters are unconstrained: the SARIMAX fit does not enforce
//! stationarity or invertibility, so there are no bounds to project onto.
//! Non-finite objective values are treated as `+inf` so an exploding
//! recursion simply loses to any finite vertex.

use serde::{Deserialize, Serialize};

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed, summed over restarts.
    pub iterations: usize,
    /// Whether the final run met its tolerance.
    pub converged: bool,
    /// Number of restarts performed.
    pub restarts: usize,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations per run.
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values.
    pub tolerance: f64,
    /// Reflection coefficient (default: 1.0).
    pub alpha: f64,
    /// Expansion coefficient (default: 2.0).
    pub gamma: f64,
    /// Contraction coefficient (default: 0.5).
    pub rho: f64,
    /// Shrinkage coefficient (default: 0.5).
    pub sigma: f64,
    /// Initial simplex step size (default: 0.1).
    pub initial_step: f64,
    /// Restarts from the best vertex after the first run (default: 1).
    pub max_restarts: usize,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-10,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
            max_restarts: 1,
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::INFINITY
    }
}

/// Minimize `objective` starting from `initial`.
///
/// A fresh simplex is rebuilt around the best point after each run, up to
/// `config.max_restarts` times; this recovers from a prematurely collapsed
/// simplex, which is common with few observations.
///
/// # Example
/// ```
/// use retail_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     &NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
            restarts: 0,
        };
    }

    let mut run = simplex_run(&objective, initial, config);
    let mut iterations = run.iterations;
    let mut restarts = 0;

    while restarts < config.max_restarts {
        restarts += 1;
        let next = simplex_run(&objective, &run.optimal_point, config);
        iterations += next.iterations;
        let improved = next.optimal_value < run.optimal_value;
        let settled = next.converged
            && (run.optimal_value - next.optimal_value).abs() <= config.tolerance.max(1e-14);
        if improved || next.converged {
            run = next;
        }
        if settled {
            break;
        }
    }

    NelderMeadResult {
        iterations,
        restarts,
        ..run
    }
}

fn simplex_run<F>(objective: &F, start: &[f64], config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = start.len();
    let f = |x: &[f64]| sanitize(objective(x));

    // n+1 vertices: the start point plus one step along each axis.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.to_vec());
    for i in 0..n {
        let mut vertex = start.to_vec();
        let step = if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let centroid = centroid_excluding(&simplex, worst);
        let spread = values[worst] - values[best];
        let size = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if (spread.is_finite() && spread <= config.tolerance) || size <= config.tolerance {
            converged = true;
            break;
        }

        let reflected = along(&centroid, &simplex[worst], -config.alpha);
        let reflected_value = f(&reflected);

        if reflected_value < values[best] {
            let expanded = along(&centroid, &reflected, config.gamma);
            let expanded_value = f(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < values[worst] {
            let c = along(&centroid, &reflected, config.rho);
            let v = f(&c);
            (c, v)
        } else {
            let c = along(&centroid, &simplex[worst], config.rho);
            let v = f(&c);
            (c, v)
        };
        if contracted_value < values[worst].min(reflected_value) {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                simplex[i] = along(&anchor, &simplex[i], config.sigma);
                values[i] = f(&simplex[i]);
            }
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
        restarts: 0,
    }
}

/// `origin + t * (point - origin)`.
fn along(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point.iter())
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn centroid_excluding(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i != exclude {
            for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
                *c += v;
            }
        }
    }
    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
