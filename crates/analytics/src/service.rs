use analysis_core::{AnalysisError, DateWindow, ForecastAnalyzer, PriceUniverse, RollingPoint};
use forecast_engine::{ForecastEngine, ForecastReport};
use quant_analysis::{returns, rolling_beta};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::aggregator::*;
use crate::config::DashboardConfig;
use crate::models::*;
use crate::selection::default_benchmark;

/// Resolves dashboard requests against a price universe.
pub struct DashboardService {
    config: DashboardConfig,
    engine: ForecastEngine,
}

impl DashboardService {
    pub fn new(config: DashboardConfig) -> Self {
        let engine = config.forecast_engine();
        Self { config, engine }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(DashboardConfig::from_env()?))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Explicit window if given, otherwise the requested (or default) range
    /// resolved against the universe's date span.
    pub fn resolve_window(&self, universe: &PriceUniverse, request: &DashboardRequest) -> Result<DateWindow, AnalysisError> {
        if let Some(window) = request.window {
            return Ok(window);
        }
        let (Some(first), Some(last)) = (universe.first_date(), universe.last_date()) else {
            return Err(AnalysisError::MalformedInput("price universe is empty".to_string()));
        };
        let range = request.range.unwrap_or(self.config.default_range);
        Ok(range.resolve(first, last))
    }

    /// Requested benchmark if present in the universe, otherwise the default.
    pub fn resolve_benchmark(&self, universe: &PriceUniverse, request: &DashboardRequest) -> Result<String, AnalysisError> {
        match &request.benchmark {
            Some(benchmark) if universe.contains(benchmark) => Ok(benchmark.clone()),
            Some(benchmark) => Err(AnalysisError::UnknownTicker(benchmark.clone())),
            None => default_benchmark(universe, &request.tickers, &self.config.benchmark_candidates)
                .ok_or_else(|| AnalysisError::UnknownTicker("no benchmark available".to_string())),
        }
    }

    /// Build every table for `request`. Fails only when the benchmark is
    /// unknown or none of the tickers produce a risk/return row.
    pub fn dashboard(&self, universe: &PriceUniverse, request: &DashboardRequest) -> Result<DashboardView, AnalysisError> {
        let window = self.resolve_window(universe, request)?;
        let benchmark = self.resolve_benchmark(universe, request)?;
        let tickers = &request.tickers;
        let rf = self.config.risk_free_rate;

        let risk_return = build_risk_return_table(tickers, universe, &benchmark, &window, rf)?;
        let view = DashboardView {
            risk_metrics: build_risk_metrics_table(tickers, universe, &window, rf),
            bull_bear: build_bull_bear_table(tickers, universe, &benchmark, &window)?,
            tracking_error: build_tracking_error_table(
                tickers,
                universe,
                &benchmark,
                &window,
                self.config.tracking_window,
            )?,
            drawdown: build_drawdown_table(tickers, universe, &window),
            performance: build_performance_table(tickers, universe, &window),
            monthly_returns: build_monthly_returns_table(tickers, universe, &window),
            correlation: build_correlation_table(tickers, universe, &window),
            trend: tickers
                .iter()
                .filter_map(|t| build_trend_view(universe, t, &window))
                .collect(),
            volumes: tickers
                .iter()
                .filter_map(|t| volume_view(universe, t, &window))
                .collect(),
            risk_return,
            window,
            benchmark,
        };

        info!(
            "Dashboard {}..{}: {} tickers vs {}",
            view.window.start,
            view.window.end,
            view.risk_return.len(),
            view.benchmark
        );
        Ok(view)
    }

    /// Rolling beta of `ticker` against the request's benchmark.
    pub fn rolling_beta(
        &self,
        universe: &PriceUniverse,
        ticker: &str,
        request: &DashboardRequest,
    ) -> Result<Vec<RollingPoint>, AnalysisError> {
        let window = self.resolve_window(universe, request)?;
        let benchmark = self.resolve_benchmark(universe, request)?;
        let asset = universe
            .prices(ticker)
            .ok_or_else(|| AnalysisError::UnknownTicker(ticker.to_string()))?;
        let bench = universe
            .prices(&benchmark)
            .ok_or_else(|| AnalysisError::UnknownTicker(benchmark.clone()))?;

        Ok(rolling_beta(
            &returns(&asset.slice(&window)),
            &returns(&bench.slice(&window)),
            self.config.rolling_beta_window,
        ))
    }

    /// Forecast one ticker from its full history.
    pub async fn forecast(&self, universe: &PriceUniverse, ticker: &str) -> Result<ForecastReport, AnalysisError> {
        let prices = universe
            .prices(ticker)
            .ok_or_else(|| AnalysisError::UnknownTicker(ticker.to_string()))?;
        self.engine.forecast(ticker, prices).await
    }

    /// Forecast several tickers concurrently. Failures are logged and
    /// skipped; reports come back in `tickers` order.
    pub async fn forecast_all(&self, universe: &PriceUniverse, tickers: &[String]) -> Vec<ForecastReport> {
        let mut tasks = JoinSet::new();
        for (i, ticker) in tickers.iter().enumerate() {
            let Some(prices) = universe.prices(ticker).cloned() else {
                warn!("Skipping forecast for {}: not in the price universe", ticker);
                continue;
            };
            let engine = self.engine.clone();
            let ticker = ticker.clone();
            tasks.spawn(async move { (i, engine.forecast(&ticker, &prices).await) });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, Ok(report))) => reports.push((i, report)),
                Ok((i, Err(e))) => warn!("Forecast for {} failed: {}", tickers[i], e),
                Err(e) => warn!("Forecast task failed: {}", e),
            }
        }

        reports.sort_by_key(|(i, _)| *i);
        reports.into_iter().map(|(_, report)| report).collect()
    }
}

impl Default for DashboardService {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}
