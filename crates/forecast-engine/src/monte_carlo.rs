use analysis_core::{stats, AnalysisError, PriceSeries};
use quant_analysis::returns;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use tracing::debug;

use crate::models::{MonteCarloConfig, MonteCarloResult};

/// Simulate future prices by compounding normally distributed daily returns.
///
/// The return distribution N(mu, sigma) is estimated from the simple returns
/// of `prices`. Every path starts from the last observed price and draws
/// `horizon_days` returns. Path `k` uses its own generator seeded with
/// `seed + k`, so a fixed seed gives identical output regardless of how rayon
/// schedules the paths.
pub fn run_monte_carlo(
    prices: &PriceSeries,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult, AnalysisError> {
    let last_price = prices.last_price().ok_or_else(|| {
        AnalysisError::MalformedInput("cannot simulate from an empty price series".to_string())
    })?;

    let daily_returns = returns(prices).values();
    let mu = stats::mean(&daily_returns);
    let sigma = stats::sample_std_dev(&daily_returns);

    if config.horizon_days == 0 || config.path_count == 0 {
        return Ok(MonteCarloResult::empty(last_price, mu, sigma, config));
    }

    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let horizon = config.horizon_days;

    // Run simulations in parallel using rayon
    let trajectories: Vec<Vec<f64>> = (0..config.path_count)
        .into_par_iter()
        .map(|k| simulate_path(last_price, mu, sigma, horizon, base_seed.wrapping_add(k as u64)))
        .collect();

    let paths: Vec<Vec<f64>> = (0..horizon)
        .map(|day| trajectories.iter().map(|path| path[day]).collect())
        .collect();

    let terminal = stats::sorted(&paths[horizon - 1]);
    let above = terminal.iter().filter(|p| **p > last_price).count();
    let probability_of_increase = above as f64 / terminal.len() as f64 * 100.0;

    let pct = |p: f64| stats::percentile_sorted(&terminal, p).unwrap_or(last_price);
    let expected_price = pct(50.0);
    let worst_case = pct(5.0);
    let best_case = pct(95.0);

    let median_path = paths
        .iter()
        .map(|day| stats::median(day).unwrap_or(last_price))
        .collect();

    debug!(
        "Monte Carlo: {} paths x {} days, mu={:.5}, sigma={:.5}, P(up)={:.1}%, median={:.2}",
        config.path_count, horizon, mu, sigma, probability_of_increase, expected_price
    );

    Ok(MonteCarloResult {
        horizon_days: horizon,
        path_count: config.path_count,
        last_price,
        mu,
        sigma,
        paths,
        probability_of_increase,
        expected_price,
        worst_case,
        best_case,
        median_path,
    })
}

fn simulate_path(start: f64, mu: f64, sigma: f64, horizon: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = start;
    (0..horizon)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut rng);
            price *= 1.0 + mu + sigma * z;
            price
        })
        .collect()
}
