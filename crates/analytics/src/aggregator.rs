//! Per-ticker tables for the dashboard.
//!
//! Each builder walks `tickers` in order and skips tickers that are missing
//! from the universe or have no returns inside the window, logging why.

use analysis_core::{
    AnalysisError, DateWindow, Observation, PriceUniverse, ReturnSeries, RollingPoint, TimeSeries,
};
use quant_analysis::{
    beta_alpha, bull_bear_stats, correlation_matrix, drawdown, monthly_returns, moving_average,
    normalized_performance, returns, risk_metrics, tracking_error, CorrelationMatrix,
};
use tracing::{debug, warn};

use crate::models::*;

fn windowed_returns(universe: &PriceUniverse, ticker: &str, window: &DateWindow) -> Option<ReturnSeries> {
    let Some(prices) = universe.prices(ticker) else {
        warn!("Skipping {}: not in the price universe", ticker);
        return None;
    };
    let r = returns(&prices.slice(window));
    if r.is_empty() {
        warn!("Skipping {}: fewer than two prices in window", ticker);
        return None;
    }
    Some(r)
}

fn windowed_prices(universe: &PriceUniverse, ticker: &str, window: &DateWindow) -> Option<TimeSeries> {
    let Some(prices) = universe.prices(ticker) else {
        warn!("Skipping {}: not in the price universe", ticker);
        return None;
    };
    let sliced = prices.slice(window);
    if sliced.is_empty() {
        warn!("Skipping {}: no prices in window", ticker);
        return None;
    }
    Some(sliced.into())
}

fn benchmark_returns(universe: &PriceUniverse, benchmark: &str, window: &DateWindow) -> Result<ReturnSeries, AnalysisError> {
    let prices = universe
        .prices(benchmark)
        .ok_or_else(|| AnalysisError::UnknownTicker(benchmark.to_string()))?;
    Ok(returns(&prices.slice(window)))
}

/// Annualized return, volatility, Sharpe, beta and alpha per ticker.
pub fn build_risk_return_table(
    tickers: &[String],
    universe: &PriceUniverse,
    benchmark: &str,
    window: &DateWindow,
    risk_free_rate: f64,
) -> Result<Vec<RiskReturnRow>, AnalysisError> {
    let bench = benchmark_returns(universe, benchmark, window)?;

    let rows: Vec<RiskReturnRow> = tickers
        .iter()
        .filter_map(|ticker| {
            let r = windowed_returns(universe, ticker, window)?;
            let metrics = risk_metrics(&r.values(), risk_free_rate)?;
            let (beta, alpha) = beta_alpha(&r, &bench);
            Some(RiskReturnRow {
                ticker: ticker.clone(),
                annualized_return_pct: metrics.annualized_return * 100.0,
                annualized_volatility_pct: metrics.annualized_volatility * 100.0,
                sharpe: metrics.sharpe_ratio,
                beta,
                alpha_pct: alpha * 100.0,
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(AnalysisError::NoRowsProduced);
    }
    debug!("Risk/return table: {} rows against {}", rows.len(), benchmark);
    Ok(rows)
}

/// Full `RiskMetrics` per ticker.
pub fn build_risk_metrics_table(
    tickers: &[String],
    universe: &PriceUniverse,
    window: &DateWindow,
    risk_free_rate: f64,
) -> Vec<RiskMetricsRow> {
    tickers
        .iter()
        .filter_map(|ticker| {
            let r = windowed_returns(universe, ticker, window)?;
            Some(RiskMetricsRow {
                ticker: ticker.clone(),
                metrics: risk_metrics(&r.values(), risk_free_rate)?,
            })
        })
        .collect()
}

pub fn build_bull_bear_table(
    tickers: &[String],
    universe: &PriceUniverse,
    benchmark: &str,
    window: &DateWindow,
) -> Result<Vec<BullBearRow>, AnalysisError> {
    let bench = benchmark_returns(universe, benchmark, window)?;

    Ok(tickers
        .iter()
        .filter_map(|ticker| {
            let r = windowed_returns(universe, ticker, window)?;
            let regime = bull_bear_stats(&r, &bench);
            Some(BullBearRow {
                ticker: ticker.clone(),
                bull_pct: regime.bull,
                bear_pct: regime.bear,
            })
        })
        .collect())
}

/// Rolling tracking error of every ticker except the benchmark itself.
pub fn build_tracking_error_table(
    tickers: &[String],
    universe: &PriceUniverse,
    benchmark: &str,
    window: &DateWindow,
    rolling_window: usize,
) -> Result<Vec<TrackingErrorRow>, AnalysisError> {
    let bench = benchmark_returns(universe, benchmark, window)?;

    Ok(tickers
        .iter()
        .filter(|ticker| ticker.as_str() != benchmark)
        .filter_map(|ticker| {
            let r = windowed_returns(universe, ticker, window)?;
            let series = tracking_error(&r, &bench, rolling_window);
            let latest = series.iter().rev().find_map(|p| p.value);
            Some(TrackingErrorRow {
                ticker: ticker.clone(),
                series,
                latest,
            })
        })
        .collect())
}

/// Drawdown series in percent with the deepest point.
pub fn build_drawdown_table(tickers: &[String], universe: &PriceUniverse, window: &DateWindow) -> Vec<DrawdownRow> {
    tickers
        .iter()
        .filter_map(|ticker| {
            let prices = windowed_prices(universe, ticker, window)?;
            let dd = drawdown(&prices);
            let series = TimeSeries::from_ordered(
                dd.iter()
                    .map(|p| Observation::new(p.date, p.value * 100.0))
                    .collect(),
            );
            let max_drawdown_pct = series.iter().map(|p| p.value).fold(0.0, f64::min);
            Some(DrawdownRow {
                ticker: ticker.clone(),
                series,
                max_drawdown_pct,
            })
        })
        .collect()
}

pub fn build_performance_table(tickers: &[String], universe: &PriceUniverse, window: &DateWindow) -> Vec<PerformanceRow> {
    tickers
        .iter()
        .filter_map(|ticker| {
            let prices = windowed_prices(universe, ticker, window)?;
            let series = normalized_performance(&prices);
            let latest_pct = series.last().map_or(0.0, |p| p.value);
            Some(PerformanceRow {
                ticker: ticker.clone(),
                series,
                latest_pct,
            })
        })
        .collect()
}

pub fn build_monthly_returns_table(
    tickers: &[String],
    universe: &PriceUniverse,
    window: &DateWindow,
) -> Vec<MonthlyReturnsRow> {
    tickers
        .iter()
        .filter_map(|ticker| {
            let r = windowed_returns(universe, ticker, window)?;
            Some(MonthlyReturnsRow {
                ticker: ticker.clone(),
                months: monthly_returns(&r),
            })
        })
        .collect()
}

/// Correlation of daily returns between every pair of usable tickers.
pub fn build_correlation_table(tickers: &[String], universe: &PriceUniverse, window: &DateWindow) -> CorrelationMatrix {
    let named: Vec<(String, ReturnSeries)> = tickers
        .iter()
        .filter_map(|ticker| Some((ticker.clone(), windowed_returns(universe, ticker, window)?)))
        .collect();
    correlation_matrix(&named)
}

/// Price with MA50/MA200. Averages use the full history so they are
/// defined from the start of the window when enough data exists.
pub fn build_trend_view(universe: &PriceUniverse, ticker: &str, window: &DateWindow) -> Option<TrendView> {
    let prices = universe.prices(ticker)?;
    let in_window = |points: Vec<RollingPoint>| {
        points
            .into_iter()
            .filter(|p| window.contains(p.date))
            .collect::<Vec<_>>()
    };

    Some(TrendView {
        ticker: ticker.to_string(),
        price: prices.slice(window).into(),
        ma50: in_window(moving_average(prices, 50)),
        ma200: in_window(moving_average(prices, 200)),
    })
}

pub fn volume_view(universe: &PriceUniverse, ticker: &str, window: &DateWindow) -> Option<VolumeView> {
    let volumes = universe.volumes(ticker)?.slice(window);
    if volumes.is_empty() {
        return None;
    }
    Some(VolumeView {
        ticker: ticker.to_string(),
        volumes,
    })
}
