use async_trait::async_trait;
use crate::{AnalysisError, PriceSeries, TrendModelKind};

/// One step of the trend-forecast fallback chain.
///
/// Implementations either produce `horizon` point forecasts following the last
/// element of `values`, or fail so the next model in the chain can be tried.
pub trait TrendModel: Send + Sync {
    fn kind(&self) -> TrendModelKind;

    fn forecast(&self, values: &[f64], horizon: usize) -> Result<Vec<f64>, AnalysisError>;
}

/// Trait for forecasting engines exposed to async callers
#[async_trait]
pub trait ForecastAnalyzer: Send + Sync {
    type Report: Send;

    async fn forecast(&self, ticker: &str, prices: &PriceSeries) -> Result<Self::Report, AnalysisError>;
}
