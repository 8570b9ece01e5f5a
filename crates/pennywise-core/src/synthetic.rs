//! Synthetic training data
//!
//! Generates a year of monthly per-category spending for a population of users.
//! Spending scales with income, drifts with age, follows the seasonal table and
//! carries 30% multiplicative noise.

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use tracing::info;

use crate::config::SyntheticConfig;
use crate::error::{Error, Result};
use crate::models::{quarter_of, today, Category, RiskTolerance, TrainingRecord};
use crate::seasonal::seasonal_multiplier;

/// Median monthly income the income factor is normalized against
const MEDIAN_INCOME: f64 = 5000.0;

/// Generate sample data ending roughly today
pub fn generate_sample_data(config: &SyntheticConfig, seed: u64) -> Result<Vec<TrainingRecord>> {
    let base_date = today() - Duration::days(365);
    generate_sample_data_from(config, seed, base_date)
}

/// Generate sample data whose first month starts at `base_date`
///
/// Months are spaced 30 days apart, so twelve months cover just under a year.
pub fn generate_sample_data_from(
    config: &SyntheticConfig,
    seed: u64,
    base_date: NaiveDate,
) -> Result<Vec<TrainingRecord>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let income_dist = Normal::new(MEDIAN_INCOME, 1500.0)
        .map_err(|e| Error::InvalidData(format!("income distribution: {}", e)))?;
    let noise_dist = Normal::new(1.0, 0.3)
        .map_err(|e| Error::InvalidData(format!("noise distribution: {}", e)))?;
    let txn_dist = Poisson::new(10.0)
        .map_err(|e| Error::InvalidData(format!("transaction distribution: {}", e)))?;

    let mut records =
        Vec::with_capacity(config.num_users * config.num_months * Category::ALL.len());

    for user_id in 1..=config.num_users {
        let income: f64 = income_dist.sample(&mut rng);
        let age: f64 = rng.gen_range(18..65) as f64;
        let risk = *RiskTolerance::ALL
            .choose(&mut rng)
            .unwrap_or(&RiskTolerance::Medium);

        for month_offset in 0..config.num_months {
            let date = base_date + Duration::days(30 * month_offset as i64);
            let month = date.month();
            let day_of_week = date.weekday().num_days_from_monday();

            for category in Category::ALL {
                let seasonal_amount = category.base_amount() * seasonal_multiplier(month);
                let income_factor = income / MEDIAN_INCOME;
                let age_factor = 1.0 + (age - 40.0) / 100.0;

                let noise: f64 = noise_dist.sample(&mut rng);
                let amount = (seasonal_amount * income_factor * age_factor * noise).max(0.0);

                let txns: f64 = txn_dist.sample(&mut rng);

                records.push(TrainingRecord {
                    user_id: user_id.to_string(),
                    date,
                    category: category.as_str().to_string(),
                    amount,
                    num_transactions: (txns as u32).max(1),
                    user_income: income,
                    user_age: age,
                    user_risk_tolerance: risk.as_str().to_string(),
                    month: Some(month),
                    quarter: Some(quarter_of(month)),
                    day_of_week: Some(day_of_week),
                    is_weekend: Some(day_of_week >= 5),
                });
            }
        }
    }

    info!(records = records.len(), "Generated synthetic expense records");
    Ok(records)
}
