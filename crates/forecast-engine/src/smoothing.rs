//! Additive exponential smoothing without seasonality.
//!
//! Parameters are fitted by minimizing the one-step-ahead squared error: a
//! coarse grid evaluated in parallel, then a pattern search around the best
//! grid point with a step that halves whenever no neighbour improves.

use analysis_core::{AnalysisError, TrendModel, TrendModelKind};
use rayon::prelude::*;
use tracing::debug;

const GRID_STEPS: usize = 9;
const MAX_ITERATIONS: usize = 200;
const STEP_TOLERANCE: f64 = 1e-4;

const UNIT_BOUNDS: (f64, f64) = (1e-4, 1.0 - 1e-4);
const DAMPING_BOUNDS: (f64, f64) = (0.80, 0.995);

/// Holt's linear trend with a damping factor phi
#[derive(Debug, Clone, Copy, Default)]
pub struct DampedTrendModel;

/// Level-only smoothing; forecasts are flat at the final level
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSmoothingModel;

/// Fitted damped-trend parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedFit {
    pub alpha: f64,
    pub beta: f64,
    pub phi: f64,
    pub level: f64,
    pub trend: f64,
    pub sse: f64,
}

impl DampedTrendModel {
    pub const MIN_POINTS: usize = 4;

    pub fn fit(&self, values: &[f64]) -> Result<DampedFit, AnalysisError> {
        if values.len() < Self::MIN_POINTS {
            return Err(AnalysisError::InsufficientData(format!(
                "damped trend needs {} points, got {}",
                Self::MIN_POINTS,
                values.len()
            )));
        }

        let (params, sse) = minimize(
            |p| damped_pass(values, p[0], p[1], p[2]).2,
            &[UNIT_BOUNDS, UNIT_BOUNDS, DAMPING_BOUNDS],
        )
        .ok_or_else(|| AnalysisError::ModelFitFailure("no finite damped-trend fit".to_string()))?;

        let (alpha, beta, phi) = (params[0], params[1], params[2]);
        let (level, trend, _) = damped_pass(values, alpha, beta, phi);
        debug!(
            "Damped trend fit: alpha={:.4}, beta={:.4}, phi={:.4}, sse={:.4}",
            alpha, beta, phi, sse
        );

        Ok(DampedFit { alpha, beta, phi, level, trend, sse })
    }
}

impl DampedFit {
    /// `level + (phi + phi^2 + ... + phi^h) * trend` for h = 1..=horizon
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let mut damping = 0.0;
        let mut phi_power = 1.0;
        (0..horizon)
            .map(|_| {
                phi_power *= self.phi;
                damping += phi_power;
                self.level + damping * self.trend
            })
            .collect()
    }
}

impl TrendModel for DampedTrendModel {
    fn kind(&self) -> TrendModelKind {
        TrendModelKind::DampedTrend
    }

    fn forecast(&self, values: &[f64], horizon: usize) -> Result<Vec<f64>, AnalysisError> {
        let forecast = self.fit(values)?.forecast(horizon);
        ensure_finite(forecast, "damped trend")
    }
}

impl SimpleSmoothingModel {
    pub const MIN_POINTS: usize = 2;

    /// Fitted (alpha, final level, sse).
    pub fn fit(&self, values: &[f64]) -> Result<(f64, f64, f64), AnalysisError> {
        if values.len() < Self::MIN_POINTS {
            return Err(AnalysisError::InsufficientData(format!(
                "simple smoothing needs {} points, got {}",
                Self::MIN_POINTS,
                values.len()
            )));
        }

        let (params, sse) = minimize(|p| simple_pass(values, p[0]).1, &[UNIT_BOUNDS])
            .ok_or_else(|| AnalysisError::ModelFitFailure("no finite smoothing fit".to_string()))?;

        let (level, _) = simple_pass(values, params[0]);
        debug!("Simple smoothing fit: alpha={:.4}, sse={:.4}", params[0], sse);
        Ok((params[0], level, sse))
    }
}

impl TrendModel for SimpleSmoothingModel {
    fn kind(&self) -> TrendModelKind {
        TrendModelKind::SimpleSmoothing
    }

    fn forecast(&self, values: &[f64], horizon: usize) -> Result<Vec<f64>, AnalysisError> {
        let (_, level, _) = self.fit(values)?;
        ensure_finite(vec![level; horizon], "simple smoothing")
    }
}

/// One filtering pass. Returns (final level, final trend, sse).
fn damped_pass(values: &[f64], alpha: f64, beta: f64, phi: f64) -> (f64, f64, f64) {
    let mut level = values[0];
    let mut trend = values[1] - values[0];
    let mut sse = 0.0;

    for &y in &values[1..] {
        let predicted = level + phi * trend;
        let error = y - predicted;
        sse += error * error;

        let new_level = alpha * y + (1.0 - alpha) * predicted;
        trend = beta * (new_level - level) + (1.0 - beta) * phi * trend;
        level = new_level;
    }

    (level, trend, sse)
}

/// Returns (final level, sse).
fn simple_pass(values: &[f64], alpha: f64) -> (f64, f64) {
    let mut level = values[0];
    let mut sse = 0.0;

    for &y in &values[1..] {
        let error = y - level;
        sse += error * error;
        level += alpha * error;
    }

    (level, sse)
}

fn ensure_finite(forecast: Vec<f64>, model: &str) -> Result<Vec<f64>, AnalysisError> {
    if forecast.iter().all(|v| v.is_finite()) {
        Ok(forecast)
    } else {
        Err(AnalysisError::ModelFitFailure(format!(
            "{} produced a non-finite forecast",
            model
        )))
    }
}

/// Evenly spaced grid over the box, `GRID_STEPS` cell midpoints per dimension.
fn generate_param_grid(bounds: &[(f64, f64)]) -> Vec<Vec<f64>> {
    let mut grid = vec![Vec::with_capacity(bounds.len())];
    for &(lo, hi) in bounds {
        let axis: Vec<f64> = (0..GRID_STEPS)
            .map(|i| lo + (hi - lo) * (i as f64 + 0.5) / GRID_STEPS as f64)
            .collect();
        grid = grid
            .into_iter()
            .flat_map(|prefix| {
                axis.iter().map(move |&v| {
                    let mut point = prefix.clone();
                    point.push(v);
                    point
                })
            })
            .collect();
    }
    grid
}

/// Minimize `objective` over the box `bounds`. `None` when no finite value
/// was found anywhere on the grid.
fn minimize<F>(objective: F, bounds: &[(f64, f64)]) -> Option<(Vec<f64>, f64)>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let (mut best, mut best_sse) = generate_param_grid(bounds)
        .into_par_iter()
        .map(|p| {
            let sse = objective(p.as_slice());
            (p, sse)
        })
        .filter(|(_, sse)| sse.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let mut steps: Vec<f64> = bounds
        .iter()
        .map(|(lo, hi)| (hi - lo) / GRID_STEPS as f64)
        .collect();

    for _ in 0..MAX_ITERATIONS {
        let mut improved = false;
        for dim in 0..bounds.len() {
            for direction in [1.0, -1.0] {
                let mut trial = best.clone();
                trial[dim] = (trial[dim] + direction * steps[dim]).clamp(bounds[dim].0, bounds[dim].1);
                let sse = objective(trial.as_slice());
                if sse.is_finite() && sse < best_sse {
                    best = trial;
                    best_sse = sse;
                    improved = true;
                }
            }
        }

        if !improved {
            steps.iter_mut().for_each(|s| *s *= 0.5);
            if steps.iter().all(|s| *s < STEP_TOLERANCE) {
                break;
            }
        }
    }

    Some((best, best_sse))
}
