//! Numeric helpers shared by the analytics crates.
//!
//! Dispersion measures use the sample (n - 1) denominator. A constant input
//! has a variance of exactly zero, so ratio guards downstream fire on it
//! instead of dividing by floating-point residue.

use statrs::statistics::Statistics;

/// Trading days per year used for every annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Arithmetic mean; 0.0 for empty input.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.mean()
}

/// True when every element equals the first (vacuously true for len < 2).
pub fn is_constant(data: &[f64]) -> bool {
    data.windows(2).all(|w| w[0] == w[1])
}

/// Sample covariance over the common prefix of `a` and `b`.
/// Returns 0.0 for fewer than two pairs or when either side is constant.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    if is_constant(a) || is_constant(b) {
        return 0.0;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (n - 1) as f64
}

pub fn sample_variance(data: &[f64]) -> f64 {
    sample_covariance(data, data)
}

pub fn sample_std_dev(data: &[f64]) -> f64 {
    sample_variance(data).sqrt()
}

/// `numerator / denominator`, or 0.0 when the denominator is zero or not finite.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sort ascending with a total order (NaN last).
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Percentile (0-100) of pre-sorted data, linearly interpolating between the
/// two nearest order statistics. Returns `None` for empty input.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Percentile (0-100) of unsorted data.
pub fn percentile(data: &[f64], pct: f64) -> Option<f64> {
    percentile_sorted(&sorted(data), pct)
}

pub fn median(data: &[f64]) -> Option<f64> {
    percentile(data, 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_series_has_zero_dispersion() {
        let data = vec![0.01; 50];
        assert_eq!(sample_variance(&data), 0.0);
        assert_eq!(sample_std_dev(&data), 0.0);
    }

    #[test]
    fn test_sample_std_dev() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // sample variance = 32 / 7
        assert!((sample_variance(&data) - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[1.0]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
    }

    #[test]
    fn test_covariance_of_series_with_itself_is_variance() {
        let data = vec![0.01, -0.02, 0.015, 0.003, -0.007];
        assert_eq!(sample_covariance(&data, &data), sample_variance(&data));
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&data, 50.0), Some(3.0));
        assert_eq!(percentile(&data, 0.0), Some(1.0));
        assert_eq!(percentile(&data, 100.0), Some(5.0));
        // rank = 0.05 * 4 = 0.2
        assert!((percentile(&data, 5.0).unwrap() - 1.2).abs() < 1e-12);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_ratio_or_zero_guards() {
        assert_eq!(ratio_or_zero(1.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(1.0, f64::NAN), 0.0);
        assert_eq!(ratio_or_zero(1.0, 4.0), 0.25);
    }
}
