use analysis_core::stats::{self, TRADING_DAYS};
use serde::{Deserialize, Serialize};
use serde_json::json;
use statrs::statistics::Statistics;

/// Risk and performance metrics for one return stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub downside_deviation: f64,
    /// Fraction, <= 0
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
}

impl RiskMetrics {
    /// Plain key/value record for presentation.
    pub fn to_record(&self) -> serde_json::Value {
        json!({
            "annualized_return": self.annualized_return,
            "volatility": self.annualized_volatility,
            "downside_deviation": self.downside_deviation,
            "max_drawdown": self.max_drawdown,
            "sharpe_ratio": self.sharpe_ratio,
            "sortino_ratio": self.sortino_ratio,
            "calmar_ratio": self.calmar_ratio,
        })
    }
}

/// Calculate annualized risk metrics from daily simple returns.
///
/// Returns `None` for an empty return stream. Every ratio is 0 when its
/// denominator is 0, so the result never carries NaN or infinity.
pub fn risk_metrics(daily_returns: &[f64], risk_free_rate: f64) -> Option<RiskMetrics> {
    if daily_returns.is_empty() {
        return None;
    }

    let annualized_return = daily_returns.mean() * TRADING_DAYS;
    let annualized_volatility = stats::sample_std_dev(daily_returns) * TRADING_DAYS.sqrt();
    let downside_deviation = downside_deviation(daily_returns);

    let excess = annualized_return - risk_free_rate;
    let sharpe_ratio = stats::ratio_or_zero(excess, annualized_volatility);
    let sortino_ratio = stats::ratio_or_zero(excess, downside_deviation);

    let max_drawdown = max_drawdown_from_returns(daily_returns);
    let calmar_ratio = stats::ratio_or_zero(annualized_return, max_drawdown.abs());

    Some(RiskMetrics {
        annualized_return,
        annualized_volatility,
        downside_deviation,
        max_drawdown,
        sharpe_ratio,
        sortino_ratio,
        calmar_ratio,
    })
}

/// Annualized sample standard deviation of the strictly negative returns.
/// Fewer than two negative returns gives 0.
pub fn downside_deviation(daily_returns: &[f64]) -> f64 {
    let negative: Vec<f64> = daily_returns.iter().copied().filter(|r| *r < 0.0).collect();
    stats::sample_std_dev(&negative) * TRADING_DAYS.sqrt()
}

/// Maximum drawdown of the wealth path compounded from `daily_returns`.
///
/// The path is `cumprod(1 + r)` with no starting value of 1 prepended, so a
/// loss on the first day is not counted as a drawdown.
pub fn max_drawdown_from_returns(daily_returns: &[f64]) -> f64 {
    let mut wealth = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for r in daily_returns {
        wealth *= 1.0 + r;
        if wealth > peak {
            peak = wealth;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((wealth - peak) / peak);
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_returns_have_no_metrics() {
        assert!(risk_metrics(&[], 0.0).is_none());
    }

    #[test]
    fn test_constant_returns_zero_ratios() {
        let returns = vec![0.001; 100];
        let m = risk_metrics(&returns, 0.0).unwrap();
        assert_eq!(m.annualized_volatility, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.sortino_ratio, 0.0);
        assert_eq!(m.calmar_ratio, 0.0);
        assert!((m.annualized_return - 0.252).abs() < 1e-12);
    }

    #[test]
    fn test_flat_returns_all_zero() {
        let m = risk_metrics(&[0.0; 20], 0.0).unwrap();
        assert_eq!(m.annualized_return, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_ratios_use_annualized_values() {
        let returns = vec![0.01, -0.02, 0.015, -0.005, 0.02, -0.01];
        let m = risk_metrics(&returns, 0.02).unwrap();

        let ann_ret = stats::mean(&returns) * 252.0;
        let ann_vol = stats::sample_std_dev(&returns) * 252.0_f64.sqrt();
        assert!((m.annualized_return - ann_ret).abs() < 1e-12);
        assert!((m.sharpe_ratio - (ann_ret - 0.02) / ann_vol).abs() < 1e-9);

        let downside = stats::sample_std_dev(&[-0.02, -0.005, -0.01]) * 252.0_f64.sqrt();
        assert!((m.downside_deviation - downside).abs() < 1e-12);
        assert!((m.sortino_ratio - (ann_ret - 0.02) / downside).abs() < 1e-9);

        assert!(m.max_drawdown < 0.0);
        assert!((m.calmar_ratio - ann_ret / m.max_drawdown.abs()).abs() < 1e-9);
    }

    #[test]
    fn test_single_negative_return_gives_zero_sortino() {
        let m = risk_metrics(&[0.01, -0.02, 0.03], 0.0).unwrap();
        assert_eq!(m.downside_deviation, 0.0);
        assert_eq!(m.sortino_ratio, 0.0);
        assert!(m.sharpe_ratio != 0.0);
    }

    #[test]
    fn test_drawdown_is_built_from_compounded_returns() {
        // wealth path: 1.1, 0.99, 1.2375 -> drawdown at second point is -10%
        let dd = max_drawdown_from_returns(&[0.10, -0.10, 0.25]);
        assert!((dd + 0.10).abs() < 1e-12);

        // no base of 1 prepended: a lone loss is not a drawdown
        assert_eq!(max_drawdown_from_returns(&[-0.10]), 0.0);
    }

    #[test]
    fn test_record_has_named_keys() {
        let m = risk_metrics(&[0.01, 0.02, -0.01], 0.0).unwrap();
        let record = m.to_record();
        assert!(record.get("sharpe_ratio").is_some());
        assert!(record.get("max_drawdown").is_some());
    }
}
