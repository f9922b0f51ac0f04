//! Tukey-fence outlier filter for evaluation rewards

/// Quantile with linear interpolation between closest ranks
///
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Keep values inside `[Q1 - k*IQR, Q3 + k*IQR]`, preserving input order
pub fn remove_outliers(values: &[f64], iqr_factor: f64) -> Vec<f64> {
    if values.len() < 3 {
        return values.to_vec();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low, high) = (q1 - iqr_factor * iqr, q3 + iqr_factor * iqr);

    let kept: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| (low..=high).contains(v))
        .collect();

    if kept.is_empty() {
        values.to_vec()
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_drops_far_outlier() {
        let rewards = [10.0, 11.0, 12.0, 13.0, 500.0];
        assert_eq!(remove_outliers(&rewards, 1.5), vec![10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_keeps_tight_series() {
        let rewards = [5.0, 6.0, 7.0, 8.0];
        assert_eq!(remove_outliers(&rewards, 1.5), rewards.to_vec());
    }

    #[test]
    fn test_short_series_untouched() {
        assert_eq!(remove_outliers(&[1.0, 1000.0], 1.5), vec![1.0, 1000.0]);
        assert!(remove_outliers(&[], 1.5).is_empty());
    }
}
