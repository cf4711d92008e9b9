use std::sync::Arc;

use analysis_core::{AnalysisError, ForecastAnalyzer, PriceSeries};
use async_trait::async_trait;
use tracing::info;

use crate::models::{ForecastReport, MonteCarloConfig};
use crate::monte_carlo::run_monte_carlo;
use crate::trend::TrendForecaster;

pub const DEFAULT_TRAINING_YEARS: u32 = 2;

/// Runs the Monte Carlo simulation and trend forecast for a ticker
/// on the trailing training window of its history.
#[derive(Clone)]
pub struct ForecastEngine {
    monte_carlo: MonteCarloConfig,
    horizon_days: usize,
    training_years: u32,
    forecaster: Arc<TrendForecaster>,
}

impl ForecastEngine {
    pub fn new(monte_carlo: MonteCarloConfig, horizon_days: usize, training_years: u32) -> Self {
        Self {
            monte_carlo,
            horizon_days,
            training_years,
            forecaster: Arc::new(TrendForecaster::new()),
        }
    }

    pub fn with_forecaster(mut self, forecaster: TrendForecaster) -> Self {
        self.forecaster = Arc::new(forecaster);
        self
    }

    pub fn monte_carlo_config(&self) -> &MonteCarloConfig {
        &self.monte_carlo
    }

    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    pub fn training_years(&self) -> u32 {
        self.training_years
    }

    /// Blocking implementation; prefer [`ForecastAnalyzer::forecast`] from async code.
    pub fn forecast_sync(&self, ticker: &str, prices: &PriceSeries) -> Result<ForecastReport, AnalysisError> {
        let last = prices.last().copied().ok_or_else(|| {
            AnalysisError::MalformedInput(format!("no prices to forecast for {}", ticker))
        })?;

        let training = prices.last_years(self.training_years);
        let monte_carlo = run_monte_carlo(&training, &self.monte_carlo)?;
        let trend = self.forecaster.forecast(&training, self.horizon_days)?;

        info!(
            "{}: {} model, P(up)={:.1}%, median={:.2}",
            ticker,
            trend.model_label(),
            monte_carlo.probability_of_increase,
            monte_carlo.expected_price
        );

        Ok(ForecastReport {
            ticker: ticker.to_string(),
            last_date: last.date,
            last_price: last.value,
            monte_carlo,
            trend,
        })
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(MonteCarloConfig::default(), 30, DEFAULT_TRAINING_YEARS)
    }
}

#[async_trait]
impl ForecastAnalyzer for ForecastEngine {
    type Report = ForecastReport;

    async fn forecast(&self, ticker: &str, prices: &PriceSeries) -> Result<ForecastReport, AnalysisError> {
        let engine = self.clone();
        let ticker = ticker.to_string();
        let prices = prices.clone();
        tokio::task::spawn_blocking(move || engine.forecast_sync(&ticker, &prices))
            .await
            .map_err(|e| AnalysisError::CalculationError(e.to_string()))?
    }
}
