//! Per-period portfolio aggregation.

use empirica_math::{finite_mean, weighted_mean};
use empirica_primitives::{Period, PortfolioKey, PortfolioReturns};
use serde::{Deserialize, Serialize};

/// Constituent weighting within a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Arithmetic mean of constituent returns.
    #[default]
    Equal,
    /// Weighted by the observation weight (e.g. lagged market cap).
    Value,
}

/// Return and constituent count of one portfolio in one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketReturn {
    /// Aggregated return, `None` when no constituent contributed.
    pub ret: Option<f64>,
    /// Number of contributing constituents.
    pub count: usize,
}

/// Aggregates constituent returns into portfolio returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioAggregator {
    weighting: Weighting,
}

impl PortfolioAggregator {
    /// Create an aggregator.
    #[must_use]
    pub const fn new(weighting: Weighting) -> Self {
        Self { weighting }
    }

    /// Configured weighting.
    #[must_use]
    pub const fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Aggregate one cross-section.
    ///
    /// # Arguments
    /// * `returns` - Forward return per observation
    /// * `weights` - Weight per observation (ignored for equal weighting)
    /// * `labels` - 0-based portfolio per observation, `None` if unassigned
    /// * `n_portfolios` - Number of portfolios
    ///
    /// # Returns
    /// One `BucketReturn` per portfolio, in portfolio order.
    #[must_use]
    pub fn aggregate(
        &self,
        returns: &[f64],
        weights: &[f64],
        labels: &[Option<usize>],
        n_portfolios: usize,
    ) -> Vec<BucketReturn> {
        let mut members: Vec<(Vec<f64>, Vec<f64>)> = vec![(Vec::new(), Vec::new()); n_portfolios];
        for (i, label) in labels.iter().enumerate() {
            let Some((rets, ws)) = label.and_then(|p| members.get_mut(p)) else {
                continue;
            };
            let r = returns[i];
            if !r.is_finite() {
                continue;
            }
            match self.weighting {
                Weighting::Equal => rets.push(r),
                Weighting::Value => {
                    let w = weights.get(i).copied().unwrap_or(f64::NAN);
                    if w.is_finite() && w > 0.0 {
                        rets.push(r);
                        ws.push(w);
                    }
                }
            }
        }

        members
            .into_iter()
            .map(|(rets, ws)| {
                let ret = match self.weighting {
                    Weighting::Equal => finite_mean(&rets),
                    Weighting::Value => weighted_mean(&rets, &ws),
                };
                BucketReturn { ret, count: rets.len() }
            })
            .collect()
    }

    /// Equal-weighted mean of `values` per portfolio, over finite values.
    #[must_use]
    pub fn average_outcome(
        values: &[f64],
        labels: &[Option<usize>],
        n_portfolios: usize,
    ) -> Vec<Option<f64>> {
        let mut groups: Vec<Vec<f64>> = vec![Vec::new(); n_portfolios];
        for (value, label) in values.iter().zip(labels) {
            if let Some(group) = label.and_then(|p| groups.get_mut(p)) {
                group.push(*value);
            }
        }
        groups.iter().map(|g| finite_mean(g)).collect()
    }
}

/// Accumulates per-period aggregates into one series per portfolio.
#[derive(Debug)]
pub(crate) struct SeriesBuilder {
    series: Vec<PortfolioReturns>,
}

impl SeriesBuilder {
    pub(crate) fn new(keys: impl IntoIterator<Item = PortfolioKey>) -> Self {
        Self { series: keys.into_iter().map(PortfolioReturns::new).collect() }
    }

    pub(crate) fn push(&mut self, period: Period, buckets: &[BucketReturn]) {
        for (series, bucket) in self.series.iter_mut().zip(buckets) {
            series.push(period, bucket.ret, bucket.count);
        }
    }

    pub(crate) fn finish(self) -> Vec<PortfolioReturns> {
        self.series
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn equal_weighted_means() {
        let returns = [0.01, 0.03, 0.10, f64::NAN, 0.20];
        let labels = [Some(0), Some(0), Some(1), Some(1), None];

        let out = PortfolioAggregator::new(Weighting::Equal).aggregate(&returns, &[], &labels, 2);

        assert_relative_eq!(out[0].ret.unwrap(), 0.02, epsilon = 1e-12);
        assert_eq!(out[0].count, 2);
        assert_relative_eq!(out[1].ret.unwrap(), 0.10, epsilon = 1e-12);
        assert_eq!(out[1].count, 1);
    }

    #[test]
    fn value_weighted_means_skip_invalid_weights() {
        let returns = [0.10, 0.00, 0.50, 0.30];
        let weights = [3.0, 1.0, -2.0, f64::NAN];
        let labels = [Some(0); 4];

        let out = PortfolioAggregator::new(Weighting::Value).aggregate(&returns, &weights, &labels, 1);

        assert_relative_eq!(out[0].ret.unwrap(), 0.075, epsilon = 1e-12);
        assert_eq!(out[0].count, 2);
    }

    #[test]
    fn empty_portfolio_has_no_return() {
        let out = PortfolioAggregator::default().aggregate(&[0.01], &[1.0], &[Some(0)], 3);
        assert_eq!(out[1], BucketReturn { ret: None, count: 0 });
        assert_eq!(out[2], BucketReturn { ret: None, count: 0 });
    }

    #[test]
    fn average_outcome_per_portfolio() {
        let values = [1.0, 3.0, 10.0, f64::NAN];
        let labels = [Some(0), Some(0), Some(1), Some(1)];

        let out = PortfolioAggregator::average_outcome(&values, &labels, 3);

        assert_eq!(out, vec![Some(2.0), Some(10.0), None]);
    }

    #[test]
    fn builder_collects_series() {
        let mut builder = SeriesBuilder::new([PortfolioKey::Single(1), PortfolioKey::Single(2)]);
        builder.push(Period::new(1), &[
            BucketReturn { ret: Some(0.01), count: 3 },
            BucketReturn { ret: None, count: 0 },
        ]);
        builder.push(Period::new(2), &[
            BucketReturn { ret: Some(0.02), count: 2 },
            BucketReturn { ret: Some(0.04), count: 1 },
        ]);

        let series = builder.finish();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].observed(), vec![0.01, 0.02]);
        assert_eq!(series[1].get(Period::new(1)), None);
        assert_eq!(series[1].get(Period::new(2)), Some(0.04));
    }
}
