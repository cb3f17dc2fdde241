//! Quantile sorter.

use empirica_math::{assign_buckets, breakpoints, complete_percentiles, equal_percentiles};
use empirica_traits::{SortError, Sorter};
use serde::{Deserialize, Serialize};

/// How breakpoints are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointSpec {
    /// `n` equally sized buckets.
    Equal(usize),
    /// Custom percentiles in [0, 100]; 0 and 100 are added when absent.
    Percentiles(Vec<f64>),
}

impl Default for BreakpointSpec {
    fn default() -> Self {
        Self::Equal(5)
    }
}

impl BreakpointSpec {
    /// Full percentile list including both endpoints.
    ///
    /// # Errors
    /// Returns `SortError::InvalidBreakpoints` for fewer than two buckets or
    /// an unordered / out-of-range percentile list.
    pub fn percentiles(&self) -> Result<Vec<f64>, SortError> {
        match self {
            Self::Equal(n) if *n < 2 => Err(SortError::InvalidBreakpoints(format!(
                "at least two buckets are required, got {n}"
            ))),
            Self::Equal(n) => Ok(equal_percentiles(*n)),
            Self::Percentiles(pcts) => {
                complete_percentiles(pcts).map_err(|e| SortError::InvalidBreakpoints(e.to_string()))
            }
        }
    }
}

/// Sorts a cross-section into percentile buckets.
#[derive(Debug, Clone)]
pub struct QuantileSorter {
    percentiles: Vec<f64>,
}

impl QuantileSorter {
    /// Create a sorter from a breakpoint specification.
    ///
    /// # Errors
    /// Returns `SortError::InvalidBreakpoints` if the specification is unusable.
    pub fn new(spec: &BreakpointSpec) -> Result<Self, SortError> {
        Ok(Self { percentiles: spec.percentiles()? })
    }

    /// Percentiles including both endpoints.
    #[must_use]
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }
}

impl Sorter for QuantileSorter {
    fn n_buckets(&self) -> usize {
        self.percentiles.len() - 1
    }

    fn breakpoints(&self, values: &[f64], eligible: &[bool]) -> Result<Vec<f64>, SortError> {
        if eligible.len() != values.len() {
            return Err(SortError::DimensionMismatch {
                expected: values.len(),
                actual: eligible.len(),
                context: "eligible".to_string(),
            });
        }

        let sample: Vec<f64> = values
            .iter()
            .zip(eligible)
            .filter(|(x, e)| **e && x.is_finite())
            .map(|(x, _)| *x)
            .collect();
        if sample.is_empty() {
            return Err(SortError::InsufficientData { required: 1, actual: 0 });
        }

        breakpoints(&sample, &self.percentiles).map_err(|e| SortError::InvalidBreakpoints(e.to_string()))
    }

    fn assign(&self, values: &[f64], eligible: &[bool]) -> Result<Vec<Option<u32>>, SortError> {
        let bps = self.breakpoints(values, eligible)?;
        Ok(assign_buckets(values, &bps))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(BreakpointSpec::Equal(5), 5)]
    #[case(BreakpointSpec::Equal(10), 10)]
    #[case(BreakpointSpec::Percentiles(vec![30.0, 70.0]), 3)]
    #[case(BreakpointSpec::Percentiles(vec![50.0]), 2)]
    fn bucket_counts(#[case] spec: BreakpointSpec, #[case] expected: usize) {
        assert_eq!(QuantileSorter::new(&spec).unwrap().n_buckets(), expected);
    }

    #[rstest]
    #[case(BreakpointSpec::Equal(1))]
    #[case(BreakpointSpec::Equal(0))]
    #[case(BreakpointSpec::Percentiles(vec![]))]
    #[case(BreakpointSpec::Percentiles(vec![70.0, 30.0]))]
    fn invalid_specs(#[case] spec: BreakpointSpec) {
        assert!(matches!(QuantileSorter::new(&spec), Err(SortError::InvalidBreakpoints(_))));
    }

    #[test]
    fn default_is_quintiles() {
        assert_eq!(BreakpointSpec::default(), BreakpointSpec::Equal(5));
    }

    #[test]
    fn terciles_thirty_forty_thirty() {
        let sorter = QuantileSorter::new(&BreakpointSpec::Percentiles(vec![30.0, 70.0])).unwrap();
        let values: Vec<f64> = (1..=11).map(f64::from).collect();
        let eligible = vec![true; values.len()];

        // 30th pct = 4, 70th pct = 8
        let ranks = sorter.assign(&values, &eligible).unwrap();
        assert_eq!(ranks[2], Some(1));
        assert_eq!(ranks[3], Some(2));
        assert_eq!(ranks[6], Some(2));
        assert_eq!(ranks[7], Some(3));
    }

    #[test]
    fn breakpoints_from_eligible_subset() {
        let sorter = QuantileSorter::new(&BreakpointSpec::Equal(2)).unwrap();
        let values = [1.0, 2.0, 3.0, 100.0, 200.0];
        let eligible = [true, true, true, false, false];

        // Median of the eligible subset is 2; ineligible values are still sorted.
        let ranks = sorter.assign(&values, &eligible).unwrap();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(2), Some(2), Some(2)]);
    }

    #[test]
    fn no_eligible_values_errors() {
        let sorter = QuantileSorter::new(&BreakpointSpec::Equal(2)).unwrap();
        let err = sorter.assign(&[1.0, f64::NAN], &[false, true]).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn mismatched_eligibility_errors() {
        let sorter = QuantileSorter::new(&BreakpointSpec::Equal(2)).unwrap();
        assert!(matches!(
            sorter.assign(&[1.0, 2.0], &[true]),
            Err(SortError::DimensionMismatch { .. })
        ));
    }
}
