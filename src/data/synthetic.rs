//! Seeded generator for synthetic retail transactions.
//!
//! Produces daily transactions with a yearly sales cycle, mild growth, and
//! promotion/discount/weekend effects, in the same layout as the real input
//! file. Used for demo runs and tests.

use crate::data::transaction::TransactionRow;
use chrono::{Datelike, Months, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const STORE_TYPES: [&str; 3] = ["urban", "suburban", "rural"];

/// Parameters of the synthetic dataset.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub start: NaiveDate,
    pub months: u32,
    pub stores: usize,
    pub products: usize,
    pub seed: u64,
    /// Relative amplitude of the yearly cycle.
    pub seasonal_amplitude: f64,
    /// Month-over-month growth rate.
    pub monthly_growth: f64,
    /// Multiplicative noise half-width per transaction.
    pub noise: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN),
            months: 36,
            stores: 3,
            products: 4,
            seed: 42,
            seasonal_amplitude: 0.35,
            monthly_growth: 0.008,
            noise: 0.15,
        }
    }
}

fn is_fixed_holiday(date: NaiveDate) -> bool {
    matches!(
        (date.month(), date.day()),
        (1, 1) | (5, 1) | (7, 4) | (11, 25) | (12, 24) | (12, 25) | (12, 31)
    )
}

fn seasonal_factor(month_of_year: u32, amplitude: f64) -> f64 {
    // Peaks in late autumn / December.
    let phase = 2.0 * PI * (month_of_year as f64 - 8.0) / 12.0;
    1.0 + amplitude * phase.sin()
}

/// Generate transactions covering `config.months` calendar months.
pub fn generate_transactions(config: &SyntheticConfig) -> Vec<TransactionRow> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let end = config
        .start
        .checked_add_months(Months::new(config.months))
        .unwrap_or(config.start);

    let prices: Vec<f64> = (0..config.products)
        .map(|p| 8.0 + 6.5 * p as f64)
        .collect();

    let mut rows = Vec::new();
    let mut date = config.start;
    let mut month_index = 0u32;
    let mut current_month = (date.year(), date.month());

    while date < end {
        if (date.year(), date.month()) != current_month {
            current_month = (date.year(), date.month());
            month_index += 1;
        }

        let season = seasonal_factor(date.month(), config.seasonal_amplitude);
        let trend = 1.0 + config.monthly_growth * month_index as f64;
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let holiday = is_fixed_holiday(date);
        // Retailers run more promotions in the busy part of the year.
        let promo_rate = (0.2 + 0.15 * (season - 1.0) / config.seasonal_amplitude.max(1e-9))
            .clamp(0.05, 0.6);

        for store in 0..config.stores {
            let store_type = STORE_TYPES[store % STORE_TYPES.len()];
            let store_scale = 1.0 + 0.25 * (store % STORE_TYPES.len()) as f64;

            for (product, price) in prices.iter().enumerate() {
                let promotion = rng.gen_bool(promo_rate);
                let discount_pct: f64 = if promotion {
                    rng.gen_range(10.0..30.0)
                } else {
                    rng.gen_range(0.0..5.0)
                };

                let mut expected = 12.0 * store_scale * season * trend;
                if promotion {
                    expected *= 1.25;
                }
                if weekend {
                    expected *= 1.15;
                }
                if holiday {
                    expected *= 1.3;
                }
                let noise = if config.noise > 0.0 {
                    rng.gen_range(1.0 - config.noise..1.0 + config.noise)
                } else {
                    1.0
                };
                let net_units = (expected * noise).round().max(0.0) as i64;
                let net_revenue =
                    (net_units as f64 * price * (1.0 - discount_pct / 100.0) * 100.0).round()
                        / 100.0;

                rows.push(TransactionRow {
                    date,
                    store_id: format!("S{:03}", store + 1),
                    product_id: format!("P{:04}", product + 1),
                    net_units,
                    net_revenue,
                    store_type: store_type.to_string(),
                    promotion,
                    is_holiday: holiday,
                    weekend,
                    discount_pct: (discount_pct * 10.0).round() / 10.0,
                });
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    log::debug!(
        "generated {} synthetic transactions over {} months",
        rows.len(),
        config.months
    );
    rows
}
