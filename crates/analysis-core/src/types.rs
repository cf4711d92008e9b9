use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Deref;

use crate::AnalysisError;

/// A single dated value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Output point of a rolling-window calculation.
/// `value` is `None` until the window has filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Ordered series of finite values with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    points: Vec<Observation>,
}

/// Simple returns dated at the later of the two prices they span.
pub type ReturnSeries = TimeSeries;

impl TimeSeries {
    /// Validate and wrap a list of observations.
    pub fn new(points: Vec<Observation>) -> Result<Self, AnalysisError> {
        for (i, point) in points.iter().enumerate() {
            if !point.value.is_finite() {
                return Err(AnalysisError::MalformedInput(format!(
                    "non-finite value on {}",
                    point.date
                )));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(AnalysisError::MalformedInput(format!(
                    "dates must be strictly increasing ({} followed by {})",
                    points[i - 1].date,
                    point.date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Build from parallel date/value columns.
    pub fn from_columns(dates: &[NaiveDate], values: &[f64]) -> Result<Self, AnalysisError> {
        if dates.len() != values.len() {
            return Err(AnalysisError::MalformedInput(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        Self::new(
            dates
                .iter()
                .zip(values)
                .map(|(&date, &value)| Observation::new(date, value))
                .collect(),
        )
    }

    /// Wrap observations derived from an already-validated series.
    /// Callers guarantee ordering; only checked in debug builds.
    pub fn from_ordered(points: Vec<Observation>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.points.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last().map(|p| p.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Observations inside `window` (inclusive on both ends).
    pub fn slice(&self, window: &DateWindow) -> Self {
        let start = self.points.partition_point(|p| p.date < window.start);
        let end = self.points.partition_point(|p| p.date <= window.end);
        Self {
            points: self.points[start..end.max(start)].to_vec(),
        }
    }

    /// Observations strictly after `last_date - years`.
    pub fn last_years(&self, years: u32) -> Self {
        let Some(last) = self.last_date() else {
            return Self::default();
        };
        let cutoff = last
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        let start = self.points.partition_point(|p| p.date <= cutoff);
        Self {
            points: self.points[start..].to_vec(),
        }
    }
}

impl TryFrom<Vec<Observation>> for TimeSeries {
    type Error = AnalysisError;

    fn try_from(points: Vec<Observation>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Closing prices of one ticker. Every price is finite and strictly positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimeSeries", into = "TimeSeries")]
pub struct PriceSeries(TimeSeries);

impl PriceSeries {
    pub fn new(points: Vec<Observation>) -> Result<Self, AnalysisError> {
        TimeSeries::new(points)?.try_into()
    }

    pub fn from_columns(dates: &[NaiveDate], values: &[f64]) -> Result<Self, AnalysisError> {
        TimeSeries::from_columns(dates, values)?.try_into()
    }

    pub fn as_series(&self) -> &TimeSeries {
        &self.0
    }

    pub fn slice(&self, window: &DateWindow) -> Self {
        Self(self.0.slice(window))
    }

    pub fn last_years(&self, years: u32) -> Self {
        Self(self.0.last_years(years))
    }

    pub fn last_price(&self) -> Option<f64> {
        self.0.last().map(|p| p.value)
    }
}

impl TryFrom<TimeSeries> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(series: TimeSeries) -> Result<Self, Self::Error> {
        if let Some(bad) = series.iter().find(|p| p.value <= 0.0) {
            return Err(AnalysisError::MalformedInput(format!(
                "price {} on {} is not positive",
                bad.value, bad.date
            )));
        }
        Ok(Self(series))
    }
}

impl From<PriceSeries> for TimeSeries {
    fn from(series: PriceSeries) -> Self {
        series.0
    }
}

impl Deref for PriceSeries {
    type Target = TimeSeries;

    fn deref(&self) -> &TimeSeries {
        &self.0
    }
}

/// Traded volume of one ticker. Values are finite and non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimeSeries", into = "TimeSeries")]
pub struct VolumeSeries(TimeSeries);

impl VolumeSeries {
    pub fn new(points: Vec<Observation>) -> Result<Self, AnalysisError> {
        TimeSeries::new(points)?.try_into()
    }

    pub fn slice(&self, window: &DateWindow) -> Self {
        Self(self.0.slice(window))
    }
}

impl TryFrom<TimeSeries> for VolumeSeries {
    type Error = AnalysisError;

    fn try_from(series: TimeSeries) -> Result<Self, Self::Error> {
        if let Some(bad) = series.iter().find(|p| p.value < 0.0) {
            return Err(AnalysisError::MalformedInput(format!(
                "negative volume {} on {}",
                bad.value, bad.date
            )));
        }
        Ok(Self(series))
    }
}

impl From<VolumeSeries> for TimeSeries {
    fn from(series: VolumeSeries) -> Self {
        series.0
    }
}

impl Deref for VolumeSeries {
    type Target = TimeSeries;

    fn deref(&self) -> &TimeSeries {
        &self.0
    }
}

/// Descriptive metadata for a fund or index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub ticker: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Reference index the fund tracks, if declared
    #[serde(default)]
    pub benchmark: Option<String>,
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::MalformedInput(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Preset lookback ranges offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "Max")]
    Max,
}

impl TimeRange {
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::YearToDate => "YTD",
            TimeRange::OneYear => "1Y",
            TimeRange::ThreeYears => "3Y",
            TimeRange::FiveYears => "5Y",
            TimeRange::Max => "Max",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "3M" => Some(TimeRange::ThreeMonths),
            "6M" => Some(TimeRange::SixMonths),
            "YTD" => Some(TimeRange::YearToDate),
            "1Y" => Some(TimeRange::OneYear),
            "3Y" => Some(TimeRange::ThreeYears),
            "5Y" => Some(TimeRange::FiveYears),
            "Max" | "MAX" => Some(TimeRange::Max),
            _ => None,
        }
    }

    /// Resolve against the data's first and last dates.
    /// Year-based ranges count 365 days per year.
    pub fn resolve(&self, first: NaiveDate, last: NaiveDate) -> DateWindow {
        let start = match self {
            TimeRange::ThreeMonths => last - Duration::days(90),
            TimeRange::SixMonths => last - Duration::days(180),
            TimeRange::OneYear => last - Duration::days(365),
            TimeRange::ThreeYears => last - Duration::days(365 * 3),
            TimeRange::FiveYears => last - Duration::days(365 * 5),
            TimeRange::YearToDate => {
                NaiveDate::from_ymd_opt(last.year(), 1, 1).unwrap_or(first)
            }
            TimeRange::Max => first,
        };
        DateWindow {
            start: start.min(last),
            end: last,
        }
    }
}

/// Which trend model produced a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendModelKind {
    DampedTrend,
    SimpleSmoothing,
    Flat,
}

impl TrendModelKind {
    pub fn to_label(&self) -> &'static str {
        match self {
            TrendModelKind::DampedTrend => "Damped-trend exponential smoothing",
            TrendModelKind::SimpleSmoothing => "Simple exponential smoothing",
            TrendModelKind::Flat => "Flat (last price)",
        }
    }
}

/// Prices, volumes and metadata for every ticker known to the dashboard.
/// Ticker order is the order in which price series were inserted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceUniverse {
    order: Vec<String>,
    prices: HashMap<String, PriceSeries>,
    #[serde(default)]
    volumes: HashMap<String, VolumeSeries>,
    #[serde(default)]
    profiles: Vec<TickerProfile>,
}

impl PriceUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a ticker's price series.
    pub fn insert_prices(&mut self, ticker: impl Into<String>, series: PriceSeries) {
        let ticker = ticker.into();
        if !self.prices.contains_key(&ticker) {
            self.order.push(ticker.clone());
        }
        self.prices.insert(ticker, series);
    }

    pub fn insert_volumes(&mut self, ticker: impl Into<String>, series: VolumeSeries) {
        self.volumes.insert(ticker.into(), series);
    }

    pub fn insert_profile(&mut self, profile: TickerProfile) {
        match self.profiles.iter_mut().find(|p| p.ticker == profile.ticker) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.prices.contains_key(ticker)
    }

    pub fn prices(&self, ticker: &str) -> Option<&PriceSeries> {
        self.prices.get(ticker)
    }

    pub fn volumes(&self, ticker: &str) -> Option<&VolumeSeries> {
        self.volumes.get(ticker)
    }

    pub fn profile(&self, ticker: &str) -> Option<&TickerProfile> {
        self.profiles.iter().find(|p| p.ticker == ticker)
    }

    pub fn profiles(&self) -> &[TickerProfile] {
        &self.profiles
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.prices.values().filter_map(|s| s.first_date()).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.prices.values().filter_map(|s| s.last_date()).max()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
