use analysis_core::{Observation, ReturnSeries, RollingPoint, TimeSeries};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Calculate simple returns `p[t] / p[t-1] - 1`, dated at `t`.
///
/// The undefined first point is omitted, so the result is one shorter than
/// the input. Fewer than two prices gives an empty series.
pub fn returns(prices: &TimeSeries) -> ReturnSeries {
    let points = prices
        .points()
        .windows(2)
        .map(|w| Observation::new(w[1].date, w[1].value / w[0].value - 1.0))
        .collect();
    TimeSeries::from_ordered(points)
}

/// Compounded return since the first price, `cumprod(1 + r) - 1`.
/// Same length as `returns(prices)`.
pub fn cumulative_return(prices: &TimeSeries) -> TimeSeries {
    let mut growth = 1.0;
    let points = returns(prices)
        .iter()
        .map(|r| {
            growth *= 1.0 + r.value;
            Observation::new(r.date, growth - 1.0)
        })
        .collect();
    TimeSeries::from_ordered(points)
}

/// Fractional decline from the running maximum, always <= 0.
pub fn drawdown(prices: &TimeSeries) -> TimeSeries {
    let mut peak = f64::NEG_INFINITY;
    let points = prices
        .iter()
        .map(|p| {
            if p.value > peak {
                peak = p.value;
            }
            Observation::new(p.date, (p.value - peak) / peak)
        })
        .collect();
    TimeSeries::from_ordered(points)
}

/// Performance since the first price in percent; the first point is 0.
pub fn normalized_performance(prices: &TimeSeries) -> TimeSeries {
    let Some(base) = prices.first().map(|p| p.value) else {
        return TimeSeries::default();
    };
    let points = prices
        .iter()
        .map(|p| Observation::new(p.date, (p.value / base - 1.0) * 100.0))
        .collect();
    TimeSeries::from_ordered(points)
}

/// Trailing simple moving average. Points before `period` observations exist
/// carry no value.
pub fn moving_average(prices: &TimeSeries, period: usize) -> Vec<RollingPoint> {
    let values = prices.values();
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let value = if period > 0 && i + 1 >= period {
                let sum: f64 = values[i + 1 - period..=i].iter().sum();
                Some(sum / period as f64)
            } else {
                None
            };
            RollingPoint { date: p.date, value }
        })
        .collect()
}

/// Compounded return of one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    /// Percent
    pub value: f64,
}

/// Compound daily returns into calendar-month returns (percent).
pub fn monthly_returns(returns: &ReturnSeries) -> Vec<MonthlyReturn> {
    let mut months: Vec<MonthlyReturn> = Vec::new();
    let mut growth = 1.0;

    for r in returns {
        let (year, month) = (r.date.year(), r.date.month());
        match months.last_mut() {
            Some(current) if current.year == year && current.month == month => {
                growth *= 1.0 + r.value;
                current.value = (growth - 1.0) * 100.0;
            }
            _ => {
                growth = 1.0 + r.value;
                months.push(MonthlyReturn {
                    year,
                    month,
                    value: (growth - 1.0) * 100.0,
                });
            }
        }
    }

    months
}

/// Two series restricted to their shared dates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aligned {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl Aligned {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Inner join on date; unmatched points on either side are dropped.
pub fn align(left: &TimeSeries, right: &TimeSeries) -> Aligned {
    let (a, b) = (left.points(), right.points());
    let mut aligned = Aligned::default();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                aligned.dates.push(a[i].date);
                aligned.left.push(a[i].value);
                aligned.right.push(b[j].value);
                i += 1;
                j += 1;
            }
        }
    }

    aligned
}

/// Re-index onto every weekday between the first and last observation,
/// carrying the most recent observation forward (weekend observations
/// included) into days without data.
pub fn business_day_resample(prices: &TimeSeries) -> TimeSeries {
    let (Some(first), Some(last)) = (prices.first_date(), prices.last_date()) else {
        return TimeSeries::default();
    };

    let source = prices.points();
    let mut points = Vec::new();
    let mut cursor = 0;
    let mut carried: Option<f64> = None;
    let mut date = first;

    while date <= last {
        while cursor < source.len() && source[cursor].date <= date {
            carried = Some(source[cursor].value);
            cursor += 1;
        }
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            if let Some(value) = carried {
                points.push(Observation::new(date, value));
            }
        }
        date += Duration::days(1);
    }

    TimeSeries::from_ordered(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_returns_of_short_series_are_empty() {
        let one = TimeSeries::from_columns(&[d(2024, 1, 2)], &[100.0]).unwrap();
        assert!(returns(&one).is_empty());
        assert!(returns(&TimeSeries::default()).is_empty());
        assert!(cumulative_return(&one).is_empty());
    }

    #[test]
    fn test_moving_average_warmup() {
        let prices = TimeSeries::from_columns(
            &[d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)],
            &[1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let ma = moving_average(&prices, 3);
        assert_eq!(ma[0].value, None);
        assert_eq!(ma[1].value, None);
        assert_eq!(ma[2].value, Some(2.0));
        assert_eq!(ma[3].value, Some(3.0));
        assert!(moving_average(&prices, 0).iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn test_monthly_returns_compound_within_month() {
        let rets = TimeSeries::from_columns(
            &[d(2024, 1, 30), d(2024, 1, 31), d(2024, 2, 1)],
            &[0.10, 0.10, -0.05],
        )
        .unwrap();
        let months = monthly_returns(&rets);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 1));
        assert!((months[0].value - 21.0).abs() < 1e-9);
        assert!((months[1].value + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_align_drops_unmatched_dates() {
        let a = TimeSeries::from_columns(&[d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 4)], &[1.0, 2.0, 4.0]).unwrap();
        let b = TimeSeries::from_columns(&[d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)], &[20.0, 30.0, 40.0]).unwrap();
        let aligned = align(&a, &b);
        assert_eq!(aligned.dates, vec![d(2024, 1, 2), d(2024, 1, 4)]);
        assert_eq!(aligned.left, vec![2.0, 4.0]);
        assert_eq!(aligned.right, vec![20.0, 40.0]);
    }

    #[test]
    fn test_business_day_resample_forward_fills() {
        // Thu 2024-01-04, then Tue 2024-01-09
        let prices = TimeSeries::from_columns(&[d(2024, 1, 4), d(2024, 1, 9)], &[10.0, 12.0]).unwrap();
        let resampled = business_day_resample(&prices);
        assert_eq!(
            resampled.dates(),
            vec![d(2024, 1, 4), d(2024, 1, 5), d(2024, 1, 8), d(2024, 1, 9)]
        );
        assert_eq!(resampled.values(), vec![10.0, 10.0, 10.0, 12.0]);
    }

    #[test]
    fn test_normalized_performance_starts_at_zero() {
        let prices = TimeSeries::from_columns(&[d(2024, 1, 1), d(2024, 1, 2)], &[50.0, 55.0]).unwrap();
        let perf = normalized_performance(&prices);
        assert_eq!(perf.values()[0], 0.0);
        assert!((perf.values()[1] - 10.0).abs() < 1e-9);
    }
}
