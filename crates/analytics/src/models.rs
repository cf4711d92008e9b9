use analysis_core::{DateWindow, RollingPoint, TimeRange, TimeSeries, VolumeSeries};
use quant_analysis::{CorrelationMatrix, MonthlyReturn, RiskMetrics};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One row of the risk/return overview. Percent fields are x100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReturnRow {
    pub ticker: String,
    pub annualized_return_pct: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe: f64,
    pub beta: f64,
    pub alpha_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetricsRow {
    pub ticker: String,
    pub metrics: RiskMetrics,
}

impl RiskMetricsRow {
    /// Flat record: the ticker plus every metric.
    pub fn to_record(&self) -> serde_json::Value {
        let mut record = self.metrics.to_record();
        if let Some(fields) = record.as_object_mut() {
            fields.insert("ticker".to_string(), json!(self.ticker));
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BullBearRow {
    pub ticker: String,
    pub bull_pct: f64,
    pub bear_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingErrorRow {
    pub ticker: String,
    pub series: Vec<RollingPoint>,
    pub latest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownRow {
    pub ticker: String,
    /// Drawdown in percent, <= 0
    pub series: TimeSeries,
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub ticker: String,
    /// Percent change since the window's first price
    pub series: TimeSeries,
    pub latest_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturnsRow {
    pub ticker: String,
    pub months: Vec<MonthlyReturn>,
}

/// Price with its 50- and 200-day moving averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendView {
    pub ticker: String,
    pub price: TimeSeries,
    pub ma50: Vec<RollingPoint>,
    pub ma200: Vec<RollingPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeView {
    pub ticker: String,
    pub volumes: VolumeSeries,
}

/// What the dashboard asks for. An explicit `window` wins over `range`;
/// with neither, the configured default range applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub tickers: Vec<String>,
    #[serde(default)]
    pub range: Option<TimeRange>,
    #[serde(default)]
    pub window: Option<DateWindow>,
    #[serde(default)]
    pub benchmark: Option<String>,
}

impl DashboardRequest {
    pub fn new(tickers: Vec<String>) -> Self {
        Self {
            tickers,
            ..Self::default()
        }
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = Some(benchmark.into());
        self
    }
}

/// Every table and chart series for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub window: DateWindow,
    pub benchmark: String,
    pub risk_return: Vec<RiskReturnRow>,
    pub risk_metrics: Vec<RiskMetricsRow>,
    pub bull_bear: Vec<BullBearRow>,
    pub tracking_error: Vec<TrackingErrorRow>,
    pub drawdown: Vec<DrawdownRow>,
    pub performance: Vec<PerformanceRow>,
    pub monthly_returns: Vec<MonthlyReturnsRow>,
    pub correlation: CorrelationMatrix,
    pub trend: Vec<TrendView>,
    pub volumes: Vec<VolumeView>,
}
