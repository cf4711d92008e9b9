use analysis_core::TrendModelKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// --- Monte Carlo Simulation ---

/// Monte Carlo simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub horizon_days: usize,
    pub path_count: usize,
    /// Fixed seed for reproducible runs; `None` draws a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            path_count: 1000,
            seed: None,
        }
    }
}

/// Monte Carlo simulation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub horizon_days: usize,
    pub path_count: usize,
    pub last_price: f64,
    /// Mean daily simple return used for the draws
    pub mu: f64,
    /// Sample standard deviation of daily simple returns
    pub sigma: f64,
    /// Simulated prices, `paths[day][path]`.
    pub paths: Vec<Vec<f64>>,
    /// Percent of paths ending strictly above the last price.
    pub probability_of_increase: f64,
    /// Median terminal price.
    pub expected_price: f64,
    /// 5th percentile terminal price.
    pub worst_case: f64,
    /// 95th percentile terminal price.
    pub best_case: f64,
    /// Median simulated price for each day.
    pub median_path: Vec<f64>,
}

impl MonteCarloResult {
    /// Result with no simulated days; every summary collapses to the last price.
    pub fn empty(last_price: f64, mu: f64, sigma: f64, config: &MonteCarloConfig) -> Self {
        Self {
            horizon_days: config.horizon_days,
            path_count: config.path_count,
            last_price,
            mu,
            sigma,
            paths: Vec::new(),
            probability_of_increase: 0.0,
            expected_price: last_price,
            worst_case: last_price,
            best_case: last_price,
            median_path: Vec::new(),
        }
    }

    /// The first `n` trajectories, each as a day-ordered price list.
    pub fn sample_paths(&self, n: usize) -> Vec<Vec<f64>> {
        let width = self.paths.first().map_or(0, |day| day.len());
        (0..n.min(width))
            .map(|k| self.paths.iter().map(|day| day[k]).collect())
            .collect()
    }

    /// Prices on the final simulated day.
    pub fn terminal_prices(&self) -> &[f64] {
        self.paths.last().map(|day| day.as_slice()).unwrap_or(&[])
    }
}

// --- Trend Forecast ---

/// How the forecast band was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandKind {
    /// forecast x (1 +/- stdev(returns) x sqrt(horizon)); not a model interval
    VolatilityHeuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast: f64,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendForecast {
    pub model: TrendModelKind,
    pub band: BandKind,
    pub points: Vec<ForecastPoint>,
}

impl TrendForecast {
    pub fn model_label(&self) -> &'static str {
        self.model.to_label()
    }

    pub fn final_forecast(&self) -> Option<f64> {
        self.points.last().map(|p| p.forecast)
    }
}

/// Monte Carlo and trend forecast for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub ticker: String,
    pub last_date: NaiveDate,
    pub last_price: f64,
    pub monte_carlo: MonteCarloResult,
    pub trend: TrendForecast,
}
