use analysis_core::{stats, AnalysisError, ForecastAnalyzer, PriceSeries, TrendModelKind};
use chrono::{Duration, NaiveDate};
use quant_analysis::returns;

use crate::*;

/// Helper: daily prices starting on Monday 2024-01-01.
fn prices(values: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..values.len()).map(|i| start + Duration::days(i as i64)).collect();
    PriceSeries::from_columns(&dates, values).unwrap()
}

fn noisy_prices(n: usize) -> PriceSeries {
    let values: Vec<f64> = (0..n)
        .map(|i| 100.0 * (1.0 + 0.001 * i as f64) + ((i as f64) * 1.3).sin() * 2.0)
        .collect();
    prices(&values)
}

fn seeded(horizon_days: usize, path_count: usize, seed: u64) -> MonteCarloConfig {
    MonteCarloConfig {
        horizon_days,
        path_count,
        seed: Some(seed),
    }
}

#[test]
fn test_constant_prices_have_no_upside() {
    let result = run_monte_carlo(&prices(&[50.0; 40]), &seeded(30, 200, 7)).unwrap();
    assert_eq!(result.sigma, 0.0);
    assert_eq!(result.probability_of_increase, 0.0);
    assert_eq!(result.worst_case, 50.0);
    assert_eq!(result.best_case, 50.0);
    assert_eq!(result.expected_price, 50.0);
}

#[test]
fn test_same_seed_same_paths() {
    let p = noisy_prices(120);
    let a = run_monte_carlo(&p, &seeded(20, 300, 42)).unwrap();
    let b = run_monte_carlo(&p, &seeded(20, 300, 42)).unwrap();
    assert_eq!(a.paths, b.paths);
    assert_eq!(a.expected_price, b.expected_price);

    let c = run_monte_carlo(&p, &seeded(20, 300, 43)).unwrap();
    assert_ne!(a.paths, c.paths);
}

#[test]
fn test_matrix_shape_and_summaries() {
    let p = noisy_prices(120);
    let result = run_monte_carlo(&p, &seeded(15, 250, 1)).unwrap();

    assert_eq!(result.paths.len(), 15);
    assert!(result.paths.iter().all(|day| day.len() == 250));
    assert_eq!(result.median_path.len(), 15);
    assert_eq!(result.last_price, p.last_price().unwrap());

    assert!(result.worst_case <= result.expected_price);
    assert!(result.expected_price <= result.best_case);
    assert!((0.0..=100.0).contains(&result.probability_of_increase));

    let r = returns(&p).values();
    assert!((result.mu - stats::mean(&r)).abs() < 1e-15);
    assert!((result.sigma - stats::sample_std_dev(&r)).abs() < 1e-15);

    let samples = result.sample_paths(3);
    assert_eq!(samples.len(), 3);
    assert!(samples.iter().all(|path| path.len() == 15));
    assert_eq!(samples[1][14], result.terminal_prices()[1]);
    assert_eq!(result.sample_paths(10_000).len(), 250);
}

#[test]
fn test_first_simulated_day_moves_from_last_price() {
    let p = noisy_prices(60);
    let result = run_monte_carlo(&p, &seeded(1, 50, 3)).unwrap();
    // one compounding step, not a copy of the last price
    assert!(result.paths[0].iter().any(|price| *price != result.last_price));
}

#[test]
fn test_empty_prices_are_rejected() {
    let err = run_monte_carlo(&PriceSeries::default(), &MonteCarloConfig::default());
    assert!(matches!(err, Err(AnalysisError::MalformedInput(_))));

    let err = trend_forecast(&PriceSeries::default(), 30);
    assert!(matches!(err, Err(AnalysisError::MalformedInput(_))));
}

#[test]
fn test_zero_horizon_or_paths_collapse_to_last_price() {
    let p = noisy_prices(30);
    let last = p.last_price().unwrap();
    for config in [seeded(0, 100, 1), seeded(30, 0, 1)] {
        let result = run_monte_carlo(&p, &config).unwrap();
        assert!(result.paths.is_empty());
        assert_eq!(result.probability_of_increase, 0.0);
        assert_eq!(result.expected_price, last);
        assert_eq!(result.worst_case, last);
        assert_eq!(result.best_case, last);
        assert!(result.sample_paths(5).is_empty());
    }
}

#[test]
fn test_single_price_falls_back_to_flat() {
    let forecast = trend_forecast(&prices(&[12.5]), 5).unwrap();
    assert_eq!(forecast.model, TrendModelKind::Flat);
    assert_eq!(forecast.points.len(), 5);
    assert!(forecast.points.iter().all(|p| p.forecast == 12.5));
    // no returns, so the band collapses onto the forecast
    assert!(forecast.points.iter().all(|p| p.upper == 12.5 && p.lower == 12.5));
}

#[cfg(feature = "smoothing")]
#[test]
fn test_linear_series_follows_trend() {
    let values: Vec<f64> = (0..200).map(|i| 100.0 + i as f64 * 0.5).collect();
    let p = prices(&values);
    let forecast = trend_forecast(&p, 30).unwrap();

    assert_eq!(forecast.model, TrendModelKind::DampedTrend);
    assert_eq!(forecast.band, BandKind::VolatilityHeuristic);
    assert_eq!(forecast.points.len(), 30);
    assert!(forecast.final_forecast().unwrap() > p.last_price().unwrap());
}

#[test]
fn test_forecast_dates_and_band() {
    let p = noisy_prices(90);
    let last_date = p.last_date().unwrap();
    let forecast = trend_forecast(&p, 10).unwrap();

    for (i, point) in forecast.points.iter().enumerate() {
        assert_eq!(point.date, last_date + Duration::days(i as i64 + 1));
        assert!(point.lower <= point.forecast && point.forecast <= point.upper);
    }

    let vol_scale = stats::sample_std_dev(&returns(&p).values()) * 10f64.sqrt();
    let first = forecast.points[0];
    assert!((first.upper - first.forecast * (1.0 + vol_scale)).abs() < 1e-9);
    assert!((first.lower - first.forecast * (1.0 - vol_scale)).abs() < 1e-9);
}

#[test]
fn test_forecast_sync_uses_training_window() {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..1800).map(|i| start + Duration::days(i)).collect();
    let values: Vec<f64> = (0..1800).map(|i| 100.0 + ((i as f64) * 0.37).sin() * 5.0 + i as f64 * 0.01).collect();
    let p = PriceSeries::from_columns(&dates, &values).unwrap();

    let engine = ForecastEngine::new(seeded(10, 50, 9), 10, 2);
    let report = engine.forecast_sync("E1VFVN30", &p).unwrap();

    let training_returns = returns(&p.last_years(2)).values();
    assert!((report.monte_carlo.mu - stats::mean(&training_returns)).abs() < 1e-15);
    assert_eq!(report.last_date, p.last_date().unwrap());
    assert_eq!(report.trend.points.len(), 10);
}

#[tokio::test]
async fn test_async_forecast_matches_sync() {
    let p = noisy_prices(200);
    let engine = ForecastEngine::new(seeded(20, 100, 11), 20, DEFAULT_TRAINING_YEARS);

    let report = engine.forecast("FUEVFVND", &p).await.unwrap();
    assert_eq!(report.ticker, "FUEVFVND");
    assert_eq!(report.last_price, p.last_price().unwrap());
    assert_eq!(report.monte_carlo.paths.len(), 20);

    let sync = engine.forecast_sync("FUEVFVND", &p).unwrap();
    assert_eq!(report, sync);
}

#[tokio::test]
async fn test_async_forecast_of_empty_series_fails() {
    let engine = ForecastEngine::default();
    let result = engine.forecast("VNINDEX", &PriceSeries::default()).await;
    assert!(matches!(result, Err(AnalysisError::MalformedInput(_))));
}
