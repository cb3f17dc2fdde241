//! Percentile breakpoints and bucket assignment.

use crate::MathError;

/// Percentile of sorted data using linear interpolation between order
/// statistics.
///
/// # Arguments
/// * `sorted` - Finite values in ascending order
/// * `pct` - Percentile in [0, 100]
///
/// # Errors
/// Returns `MathError::InvalidPercentile` outside [0, 100] and
/// `MathError::EmptyData` for an empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> Result<f64, MathError> {
    if !(0.0..=100.0).contains(&pct) {
        return Err(MathError::InvalidPercentile(pct));
    }
    if sorted.is_empty() {
        return Err(MathError::EmptyData);
    }

    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Percentiles splitting a cross-section into `n_buckets` equal groups,
/// including 0 and 100.
#[must_use]
pub fn equal_percentiles(n_buckets: usize) -> Vec<f64> {
    if n_buckets == 0 {
        return Vec::new();
    }
    (0..=n_buckets).map(|i| 100.0 * i as f64 / n_buckets as f64).collect()
}

/// Complete a custom percentile list with the 0 and 100 endpoints.
///
/// # Errors
/// Returns `MathError::InvalidBreakpoints` unless the list is strictly
/// increasing within [0, 100] and defines at least two buckets.
pub fn complete_percentiles(pcts: &[f64]) -> Result<Vec<f64>, MathError> {
    if let Some(p) = pcts.iter().find(|p| !(0.0..=100.0).contains(*p)) {
        return Err(MathError::InvalidPercentile(*p));
    }
    if pcts.windows(2).any(|w| w[0] >= w[1]) {
        return Err(MathError::InvalidBreakpoints(
            "percentiles must be strictly increasing".to_string(),
        ));
    }

    let mut full = Vec::with_capacity(pcts.len() + 2);
    if pcts.first() != Some(&0.0) {
        full.push(0.0);
    }
    full.extend_from_slice(pcts);
    if pcts.last() != Some(&100.0) {
        full.push(100.0);
    }

    if full.len() < 3 {
        return Err(MathError::InvalidBreakpoints(
            "at least two buckets are required".to_string(),
        ));
    }
    Ok(full)
}

/// Breakpoints of the finite `values` at the given percentiles.
///
/// # Errors
/// Returns `MathError::EmptyData` when no value is finite and
/// `MathError::InvalidPercentile` for a percentile outside [0, 100].
pub fn breakpoints(values: &[f64], percentiles: &[f64]) -> Result<Vec<f64>, MathError> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return Err(MathError::EmptyData);
    }
    sorted.sort_by(f64::total_cmp);

    percentiles.iter().map(|&p| percentile(&sorted, p)).collect()
}

/// 1-based bucket of `value` given ascending breakpoints `b0..=bn`.
///
/// Bucket `k` holds `b(k-1) <= x < bk`, the top bucket also holds `bn`.
/// Values outside `[b0, bn]` are clamped to the first or last bucket.
/// Returns `None` for non-finite values or fewer than two breakpoints.
#[must_use]
pub fn assign_bucket(value: f64, breakpoints: &[f64]) -> Option<u32> {
    if !value.is_finite() || breakpoints.len() < 2 {
        return None;
    }
    let interior = &breakpoints[1..breakpoints.len() - 1];
    Some(interior.partition_point(|b| *b <= value) as u32 + 1)
}

/// Bucket of every value.
#[must_use]
pub fn assign_buckets(values: &[f64], breakpoints: &[f64]) -> Vec<Option<u32>> {
    values.iter().map(|&x| assign_bucket(x, breakpoints)).collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn one_to(n: u32) -> Vec<f64> {
        (1..=n).map(f64::from).collect()
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(20.0, 20.8)]
    #[case(50.0, 50.5)]
    #[case(100.0, 100.0)]
    fn percentile_interpolates_linearly(#[case] pct: f64, #[case] expected: f64) {
        let data = one_to(100);
        assert_relative_eq!(percentile(&data, pct).unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn percentile_rejects_out_of_range() {
        assert!(percentile(&[1.0, 2.0], 101.0).is_err());
        assert!(percentile(&[1.0, 2.0], -1.0).is_err());
        assert!(matches!(percentile(&[], 50.0), Err(MathError::EmptyData)));
    }

    #[test]
    fn equal_percentiles_quintiles() {
        assert_eq!(equal_percentiles(5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(equal_percentiles(2), vec![0.0, 50.0, 100.0]);
        assert!(equal_percentiles(0).is_empty());
    }

    #[rstest]
    #[case(vec![30.0, 70.0], vec![0.0, 30.0, 70.0, 100.0])]
    #[case(vec![0.0, 50.0], vec![0.0, 50.0, 100.0])]
    #[case(vec![0.0, 10.0, 90.0, 100.0], vec![0.0, 10.0, 90.0, 100.0])]
    fn complete_percentiles_adds_endpoints(#[case] input: Vec<f64>, #[case] expected: Vec<f64>) {
        assert_eq!(complete_percentiles(&input).unwrap(), expected);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![0.0, 100.0])]
    #[case(vec![70.0, 30.0])]
    #[case(vec![50.0, 50.0])]
    #[case(vec![150.0])]
    fn complete_percentiles_rejects_invalid(#[case] input: Vec<f64>) {
        assert!(complete_percentiles(&input).is_err());
    }

    #[test]
    fn breakpoints_ignore_non_finite() {
        let mut data = one_to(10);
        data.push(f64::NAN);
        data.push(f64::INFINITY);
        let bps = breakpoints(&data, &[0.0, 50.0, 100.0]).unwrap();
        assert_eq!(bps, vec![1.0, 5.5, 10.0]);
    }

    #[test]
    fn quintiles_of_ten_values_hold_two_each() {
        let data = one_to(10);
        let bps = breakpoints(&data, &equal_percentiles(5)).unwrap();
        let buckets = assign_buckets(&data, &bps);
        let expected: Vec<Option<u32>> =
            vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5].into_iter().map(Some).collect();
        assert_eq!(buckets, expected);
    }

    #[test]
    fn value_on_interior_breakpoint_goes_up() {
        let bps = vec![0.0, 10.0, 20.0];
        assert_eq!(assign_bucket(9.999, &bps), Some(1));
        assert_eq!(assign_bucket(10.0, &bps), Some(2));
        assert_eq!(assign_bucket(20.0, &bps), Some(2));
    }

    #[test]
    fn values_outside_breakpoints_are_clamped() {
        let bps = vec![0.0, 10.0, 20.0];
        assert_eq!(assign_bucket(-5.0, &bps), Some(1));
        assert_eq!(assign_bucket(25.0, &bps), Some(2));
    }

    #[test]
    fn non_finite_values_are_unassigned() {
        let bps = vec![0.0, 10.0, 20.0];
        assert_eq!(assign_bucket(f64::NAN, &bps), None);
        assert_eq!(assign_bucket(1.0, &[0.0]), None);
    }
}
