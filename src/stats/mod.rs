//! Descriptive statistics over numeric slices.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Structure holding descriptive statistics results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of data points
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Standard deviation (unbiased estimator)
    pub std: f64,
    /// Minimum value
    pub min: f64,
    /// 25% quantile
    pub q1: f64,
    /// Median (50% quantile)
    pub median: f64,
    /// 75% quantile
    pub q3: f64,
    /// Maximum value
    pub max: f64,
}

/// Calculate basic descriptive statistics for a slice of values.
pub fn describe(values: &[f64]) -> Result<DescriptiveStats> {
    if values.is_empty() {
        return Err(Error::EmptyData(
            "cannot describe an empty value set".to_string(),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = mean(values).unwrap_or(f64::NAN);
    let std = std_dev(values, 1).unwrap_or(f64::NAN);

    Ok(DescriptiveStats {
        count: values.len(),
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with the given delta degrees of freedom; `None` when
/// fewer than `ddof + 1` values are available.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (n - ddof) as f64).sqrt())
}

/// Linearly interpolated quantile of an ascending-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Occurrence counts, most frequent first; ties break by value so the order
/// is deterministic.
pub fn value_counts<I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = describe(&values).unwrap();

        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std - 2.138).abs() < 1e-3);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert!((stats.median - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_describe_empty() {
        let result = describe(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_std_dev_requires_enough_values() {
        assert!(std_dev(&[1.0], 1).is_none());
        assert!(std_dev(&[1.0, 3.0], 1).is_some());
    }

    #[test]
    fn test_value_counts_ordering() {
        let counts = value_counts(
            ["b", "a", "b", "c", "a", "b"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(counts[0], ("b".to_string(), 3));
        assert_eq!(counts[1], ("a".to_string(), 2));
        assert_eq!(counts[2], ("c".to_string(), 1));
    }
}
