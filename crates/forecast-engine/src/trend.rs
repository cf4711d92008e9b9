use analysis_core::{stats, AnalysisError, PriceSeries, TrendModel, TrendModelKind};
use chrono::Duration;
use quant_analysis::{business_day_resample, returns};
use tracing::{debug, warn};

use crate::models::{BandKind, ForecastPoint, TrendForecast};

/// Holds the last value for every horizon step
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatModel;

impl TrendModel for FlatModel {
    fn kind(&self) -> TrendModelKind {
        TrendModelKind::Flat
    }

    fn forecast(&self, values: &[f64], horizon: usize) -> Result<Vec<f64>, AnalysisError> {
        let last = values
            .last()
            .ok_or_else(|| AnalysisError::InsufficientData("no value to hold flat".to_string()))?;
        Ok(vec![*last; horizon])
    }
}

/// Ordered list of trend models; the first one that succeeds wins.
pub struct TrendForecaster {
    models: Vec<Box<dyn TrendModel>>,
}

impl TrendForecaster {
    pub fn new() -> Self {
        Self {
            models: default_models(),
        }
    }

    pub fn with_models(models: Vec<Box<dyn TrendModel>>) -> Self {
        Self { models }
    }

    pub fn model_kinds(&self) -> Vec<TrendModelKind> {
        self.models.iter().map(|m| m.kind()).collect()
    }

    /// Forecast `horizon_days` calendar days past the last observation.
    ///
    /// Models are fitted on the weekday-resampled series. The band is
    /// `forecast * (1 +/- stdev(returns) * sqrt(horizon))`, using the returns
    /// of the series as given.
    pub fn forecast(
        &self,
        prices: &PriceSeries,
        horizon_days: usize,
    ) -> Result<TrendForecast, AnalysisError> {
        let last = prices.last().ok_or_else(|| {
            AnalysisError::MalformedInput("cannot forecast an empty price series".to_string())
        })?;

        let training = business_day_resample(prices).values();
        let (model, values) = self.run_chain(&training, last.value, horizon_days);

        let vol_scale = stats::sample_std_dev(&returns(prices).values()) * (horizon_days as f64).sqrt();
        let points = values
            .into_iter()
            .enumerate()
            .map(|(i, forecast)| ForecastPoint {
                date: last.date + Duration::days(i as i64 + 1),
                forecast,
                upper: forecast * (1.0 + vol_scale),
                lower: forecast * (1.0 - vol_scale),
            })
            .collect();

        debug!(
            "Trend forecast via {}: {} days, band scale {:.4}",
            model.to_label(),
            horizon_days,
            vol_scale
        );

        Ok(TrendForecast {
            model,
            band: BandKind::VolatilityHeuristic,
            points,
        })
    }

    fn run_chain(&self, values: &[f64], last_price: f64, horizon: usize) -> (TrendModelKind, Vec<f64>) {
        for model in &self.models {
            match model.forecast(values, horizon) {
                Ok(forecast) => return (model.kind(), forecast),
                Err(e) => warn!("{} failed, trying next model: {}", model.kind().to_label(), e),
            }
        }
        // Every configured model failed; hold the last price.
        (TrendModelKind::Flat, vec![last_price; horizon])
    }
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "smoothing")]
fn default_models() -> Vec<Box<dyn TrendModel>> {
    use crate::smoothing::{DampedTrendModel, SimpleSmoothingModel};
    vec![
        Box::new(DampedTrendModel),
        Box::new(SimpleSmoothingModel),
        Box::new(FlatModel),
    ]
}

#[cfg(not(feature = "smoothing"))]
fn default_models() -> Vec<Box<dyn TrendModel>> {
    vec![Box::new(FlatModel)]
}

/// Trend forecast with the default model chain.
pub fn trend_forecast(prices: &PriceSeries, horizon_days: usize) -> Result<TrendForecast, AnalysisError> {
    TrendForecaster::new().forecast(prices, horizon_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingModel;

    impl TrendModel for FailingModel {
        fn kind(&self) -> TrendModelKind {
            TrendModelKind::DampedTrend
        }

        fn forecast(&self, _values: &[f64], _horizon: usize) -> Result<Vec<f64>, AnalysisError> {
            Err(AnalysisError::ModelFitFailure("diverged".to_string()))
        }
    }

    #[test]
    fn test_flat_model_holds_last_value() {
        assert_eq!(FlatModel.forecast(&[1.0, 2.0, 3.5], 3).unwrap(), vec![3.5; 3]);
        assert!(FlatModel.forecast(&[], 3).is_err());
    }

    #[test]
    fn test_failure_falls_through_to_next_model() {
        let forecaster = TrendForecaster::with_models(vec![Box::new(FailingModel), Box::new(FlatModel)]);
        let (kind, values) = forecaster.run_chain(&[10.0, 11.0], 11.0, 2);
        assert_eq!(kind, TrendModelKind::Flat);
        assert_eq!(values, vec![11.0, 11.0]);
    }

    #[test]
    fn test_exhausted_chain_holds_last_price() {
        let forecaster = TrendForecaster::with_models(vec![Box::new(FailingModel)]);
        let (kind, values) = forecaster.run_chain(&[10.0], 10.0, 3);
        assert_eq!(kind, TrendModelKind::Flat);
        assert_eq!(values, vec![10.0; 3]);
    }

    #[cfg(feature = "smoothing")]
    #[test]
    fn test_default_chain_order() {
        assert_eq!(
            TrendForecaster::new().model_kinds(),
            vec![
                TrendModelKind::DampedTrend,
                TrendModelKind::SimpleSmoothing,
                TrendModelKind::Flat
            ]
        );
    }
}
