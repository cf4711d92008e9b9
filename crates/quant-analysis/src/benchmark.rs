use analysis_core::stats::{self, TRADING_DAYS};
use analysis_core::{ReturnSeries, RollingPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::series::align;

/// Default rolling window (~one quarter of trading days)
pub const DEFAULT_WINDOW: usize = 63;

/// Beta and annualized alpha of `asset` against `bench` on their shared dates.
///
/// beta = cov(asset, bench) / var(bench), 0 when the benchmark has no variance.
/// alpha = (mean(asset) - beta * mean(bench)) * 252.
/// No shared dates gives (0, 0).
pub fn beta_alpha(asset: &ReturnSeries, bench: &ReturnSeries) -> (f64, f64) {
    let aligned = align(asset, bench);
    if aligned.is_empty() {
        return (0.0, 0.0);
    }

    let cov = stats::sample_covariance(&aligned.left, &aligned.right);
    let var = stats::sample_variance(&aligned.right);
    let beta = stats::ratio_or_zero(cov, var);
    let alpha = (stats::mean(&aligned.left) - beta * stats::mean(&aligned.right)) * TRADING_DAYS;

    (beta, alpha)
}

/// Rolling tracking error in percent: the sample standard deviation of
/// `asset - bench` over the trailing `window` shared dates, annualized.
/// Dates before the window fills carry no value.
pub fn tracking_error(asset: &ReturnSeries, bench: &ReturnSeries, window: usize) -> Vec<RollingPoint> {
    let aligned = align(asset, bench);
    let diffs: Vec<f64> = aligned
        .left
        .iter()
        .zip(&aligned.right)
        .map(|(a, b)| a - b)
        .collect();

    aligned
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let value = (window >= 2 && i + 1 >= window).then(|| {
                stats::sample_std_dev(&diffs[i + 1 - window..=i]) * TRADING_DAYS.sqrt() * 100.0
            });
            RollingPoint { date, value }
        })
        .collect()
}

/// Rolling beta over the trailing `window` shared dates.
/// No value before the window fills or when the window's benchmark variance is 0.
pub fn rolling_beta(asset: &ReturnSeries, bench: &ReturnSeries, window: usize) -> Vec<RollingPoint> {
    let aligned = align(asset, bench);

    aligned
        .dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let value = if window >= 2 && i + 1 >= window {
                let a = &aligned.left[i + 1 - window..=i];
                let b = &aligned.right[i + 1 - window..=i];
                let var = stats::sample_variance(b);
                (var > 0.0).then(|| stats::sample_covariance(a, b) / var)
            } else {
                None
            };
            RollingPoint { date, value }
        })
        .collect()
}

/// Mean asset return conditioned on the benchmark's direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimePerformance {
    /// Annualized mean asset return on days the benchmark rose, percent
    pub bull: f64,
    /// Annualized mean asset return on days the benchmark fell, percent
    pub bear: f64,
}

/// Annualized (x252, percent) mean asset return on benchmark up days and
/// down days. Days where the benchmark is flat count toward neither side;
/// an empty side is 0.
pub fn bull_bear_stats(asset: &ReturnSeries, bench: &ReturnSeries) -> RegimePerformance {
    let aligned = align(asset, bench);

    let (mut bull, mut bear) = (Vec::new(), Vec::new());
    for (a, b) in aligned.left.iter().zip(&aligned.right) {
        if *b > 0.0 {
            bull.push(*a);
        } else if *b < 0.0 {
            bear.push(*a);
        }
    }

    RegimePerformance {
        bull: stats::mean(&bull) * TRADING_DAYS * 100.0,
        bear: stats::mean(&bear) * TRADING_DAYS * 100.0,
    }
}

/// Everything computed for one (asset, benchmark) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRelation {
    pub beta: f64,
    /// Annualized, fraction
    pub alpha: f64,
    pub regime: RegimePerformance,
    /// Percent, annualized
    pub tracking_error: Vec<RollingPoint>,
}

impl BenchmarkRelation {
    /// Latest defined tracking error value.
    pub fn latest_tracking_error(&self) -> Option<f64> {
        self.tracking_error.iter().rev().find_map(|p| p.value)
    }
}

pub fn benchmark_relation(asset: &ReturnSeries, bench: &ReturnSeries, window: usize) -> BenchmarkRelation {
    let (beta, alpha) = beta_alpha(asset, bench);
    let regime = bull_bear_stats(asset, bench);
    debug!(
        "Benchmark relation: beta={:.3}, alpha={:.4}, bull={:.2}%, bear={:.2}%",
        beta, alpha, regime.bull, regime.bear
    );
    BenchmarkRelation {
        beta,
        alpha,
        regime,
        tracking_error: tracking_error(asset, bench, window),
    }
}
