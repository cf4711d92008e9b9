//! Return, risk and benchmark calculations over dated series.
//!
//! Everything here is a pure function of its inputs. Degenerate inputs
//! (empty, constant, unmatched dates) resolve to 0 or `None` instead of
//! surfacing NaN.

pub mod benchmark;
pub mod correlation;
pub mod risk;
pub mod series;


pub use benchmark::{
    benchmark_relation, beta_alpha, bull_bear_stats, rolling_beta, tracking_error,
    BenchmarkRelation, RegimePerformance, DEFAULT_WINDOW,
};
pub use correlation::{correlation, correlation_matrix, CorrelationMatrix};
pub use risk::{downside_deviation, max_drawdown_from_returns, risk_metrics, RiskMetrics};
pub use series::{
    align, business_day_resample, cumulative_return, drawdown, monthly_returns, moving_average,
    normalized_performance, returns, Aligned, MonthlyReturn,
};
