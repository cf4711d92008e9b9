use analysis_core::TimeRange;
use anyhow::{Context, Result};
use forecast_engine::{ForecastEngine, MonteCarloConfig};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    // Risk settings
    pub risk_free_rate: f64,           // annual, fraction
    pub tracking_window: usize,        // 63 trading days
    pub rolling_beta_window: usize,    // 63 trading days

    // Monte Carlo
    pub mc_horizon_days: usize,        // 30
    pub mc_path_count: usize,          // 1000
    pub mc_seed: Option<u64>,          // unset = fresh seed per run

    // Trend forecast
    pub forecast_horizon_days: usize,  // 30
    pub forecast_training_years: u32,  // 2

    // Selection
    pub benchmark_candidates: Vec<String>,
    pub index_tickers: Vec<String>,
    pub default_tickers: Vec<String>,
    pub default_range: TimeRange,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            tracking_window: 63,
            rolling_beta_window: 63,
            mc_horizon_days: 30,
            mc_path_count: 1000,
            mc_seed: None,
            forecast_horizon_days: 30,
            forecast_training_years: 2,
            benchmark_candidates: vec!["VNINDEX".to_string()],
            index_tickers: vec!["VNINDEX".to_string(), "VN30".to_string()],
            default_tickers: vec![
                "VNINDEX".to_string(),
                "E1VFVN30".to_string(),
                "FUEVFVND".to_string(),
            ],
            default_range: TimeRange::OneYear,
        }
    }
}

impl DashboardConfig {
    /// Load from `DASHBOARD_*` environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            risk_free_rate: var("DASHBOARD_RISK_FREE_RATE", "0.0")
                .parse()
                .context("DASHBOARD_RISK_FREE_RATE must be a number")?,
            tracking_window: var("DASHBOARD_TRACKING_WINDOW", "63")
                .parse()
                .context("DASHBOARD_TRACKING_WINDOW must be a positive integer")?,
            rolling_beta_window: var("DASHBOARD_ROLLING_BETA_WINDOW", "63")
                .parse()
                .context("DASHBOARD_ROLLING_BETA_WINDOW must be a positive integer")?,

            mc_horizon_days: var("DASHBOARD_MC_HORIZON_DAYS", "30").parse()?,
            mc_path_count: var("DASHBOARD_MC_PATHS", "1000").parse()?,
            mc_seed: lookup("DASHBOARD_MC_SEED")
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().parse())
                .transpose()
                .context("DASHBOARD_MC_SEED must be an unsigned integer")?,

            forecast_horizon_days: var("DASHBOARD_FORECAST_HORIZON", "30").parse()?,
            forecast_training_years: var("DASHBOARD_TRAINING_YEARS", "2").parse()?,

            benchmark_candidates: split_list(&var("DASHBOARD_BENCHMARKS", "VNINDEX")),
            index_tickers: split_list(&var("DASHBOARD_INDEX_TICKERS", "VNINDEX,VN30")),
            default_tickers: split_list(&var(
                "DASHBOARD_DEFAULT_TICKERS",
                "VNINDEX,E1VFVN30,FUEVFVND",
            )),
            default_range: {
                let label = var("DASHBOARD_DEFAULT_RANGE", "1Y");
                TimeRange::from_label(&label)
                    .with_context(|| format!("unknown DASHBOARD_DEFAULT_RANGE {}", label))?
            },
        };

        Ok(config)
    }

    pub fn monte_carlo(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            horizon_days: self.mc_horizon_days,
            path_count: self.mc_path_count,
            seed: self.mc_seed,
        }
    }

    pub fn forecast_engine(&self) -> ForecastEngine {
        ForecastEngine::new(
            self.monte_carlo(),
            self.forecast_horizon_days,
            self.forecast_training_years,
        )
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.monte_carlo(), MonteCarloConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("DASHBOARD_RISK_FREE_RATE", "0.03"),
            ("DASHBOARD_MC_SEED", "42"),
            ("DASHBOARD_BENCHMARKS", "VN30, VNINDEX ,"),
            ("DASHBOARD_DEFAULT_RANGE", "3Y"),
        ]))
        .unwrap();

        assert_eq!(config.risk_free_rate, 0.03);
        assert_eq!(config.mc_seed, Some(42));
        assert_eq!(config.benchmark_candidates, vec!["VN30", "VNINDEX"]);
        assert_eq!(config.default_range, TimeRange::ThreeYears);
        assert_eq!(config.tracking_window, 63);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(DashboardConfig::from_lookup(lookup(&[("DASHBOARD_MC_PATHS", "many")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup(&[("DASHBOARD_DEFAULT_RANGE", "2W")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup(&[("DASHBOARD_MC_SEED", "-1")])).is_err());
    }
}
