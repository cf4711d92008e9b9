use analysis_core::{stats, ReturnSeries};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::series::align;

/// Pearson correlation on the dates both series share.
/// `None` with fewer than two shared points or when either side has no variance.
pub fn correlation(a: &ReturnSeries, b: &ReturnSeries) -> Option<f64> {
    let aligned = align(a, b);
    if aligned.len() < 2 {
        return None;
    }

    let var_a = stats::sample_variance(&aligned.left);
    let var_b = stats::sample_variance(&aligned.right);
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }

    let corr = stats::sample_covariance(&aligned.left, &aligned.right) / (var_a * var_b).sqrt();
    Some(corr.clamp(-1.0, 1.0))
}

/// Symmetric correlation matrix, rows and columns in `tickers` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }
}

/// Pairwise correlations, each pair aligned on its own shared dates.
/// The diagonal is 1.
pub fn correlation_matrix(series: &[(String, ReturnSeries)]) -> CorrelationMatrix {
    let n = series.len();

    let upper: Vec<(usize, usize, Option<f64>)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(i, j)| (i, j, correlation(&series[i].1, &series[j].1)))
        .collect();

    let mut values = vec![vec![None; n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = Some(1.0);
    }
    for (i, j, corr) in upper {
        values[i][j] = corr;
        values[j][i] = corr;
    }

    CorrelationMatrix {
        tickers: series.iter().map(|(t, _)| t.clone()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::TimeSeries;
    use chrono::{Duration, NaiveDate};

    fn series(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..values.len()).map(|i| start + Duration::days(i as i64)).collect();
        TimeSeries::from_columns(&dates, values).unwrap()
    }

    #[test]
    fn test_perfect_and_inverse_correlation() {
        let a = series(&[0.01, -0.02, 0.03, 0.005]);
        let b = series(&[0.02, -0.04, 0.06, 0.01]);
        let c = series(&[-0.01, 0.02, -0.03, -0.005]);
        assert!((correlation(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((correlation(&a, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_pairs_have_no_correlation() {
        let a = series(&[0.01, -0.02, 0.03]);
        assert_eq!(correlation(&a, &series(&[0.01, 0.01, 0.01])), None);
        assert_eq!(correlation(&a, &series(&[0.01])), None);
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let named = vec![
            ("A".to_string(), series(&[0.01, -0.02, 0.03, 0.0])),
            ("B".to_string(), series(&[0.02, -0.01, 0.01, 0.01])),
            ("FLAT".to_string(), series(&[0.0, 0.0, 0.0, 0.0])),
        ];
        let matrix = correlation_matrix(&named);
        assert_eq!(matrix.tickers, vec!["A", "B", "FLAT"]);
        for i in 0..3 {
            assert_eq!(matrix.values[i][i], Some(1.0));
        }
        assert_eq!(matrix.get("A", "B"), matrix.get("B", "A"));
        assert!(matrix.get("A", "B").is_some());
        assert_eq!(matrix.get("A", "FLAT"), None);
    }
}
