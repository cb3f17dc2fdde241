//! Portfolio return series.

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Period;

/// Identifies a portfolio series.
///
/// Bucket numbers are 1-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
pub enum PortfolioKey {
    /// Bucket of a univariate sort.
    #[display("P{_0}")]
    Single(u32),
    /// Cell (first, second) of a bivariate sort.
    #[display("P{_0},{_1}")]
    Pair(u32, u32),
    /// Highest minus lowest bucket of a univariate sort.
    #[display("HML")]
    HighMinusLow,
    /// Bucket of the first characteristic, averaged across second buckets.
    #[display("P{_0},avg")]
    FirstAveraged(u32),
    /// Bucket of the second characteristic, averaged across first buckets.
    #[display("Pavg,{_0}")]
    SecondAveraged(u32),
    /// High minus low on the first characteristic within a second bucket.
    #[display("HML1|{_0}")]
    FirstSpread(u32),
    /// High minus low on the second characteristic within a first bucket.
    #[display("HML2|{_0}")]
    SecondSpread(u32),
    /// High minus low on the first characteristic, averaged across second buckets.
    #[display("HML1|avg")]
    FirstAveragedSpread,
    /// High minus low on the second characteristic, averaged across first buckets.
    #[display("HML2|avg")]
    SecondAveragedSpread,
}

/// Per-period returns of one portfolio.
///
/// `returns[t]` is `None` when no constituent contributed in `periods[t]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturns {
    /// Portfolio identifier.
    pub key: PortfolioKey,
    /// Periods, ascending.
    pub periods: Vec<Period>,
    /// Return per period.
    pub returns: Vec<Option<f64>>,
    /// Number of contributing constituents per period.
    pub counts: Vec<usize>,
}

impl PortfolioReturns {
    /// Create an empty series.
    #[must_use]
    pub const fn new(key: PortfolioKey) -> Self {
        Self { key, periods: Vec::new(), returns: Vec::new(), counts: Vec::new() }
    }

    /// Append one period.
    pub fn push(&mut self, period: Period, ret: Option<f64>, count: usize) {
        debug_assert!(self.periods.last().is_none_or(|last| *last < period));
        self.periods.push(period);
        self.returns.push(ret);
        self.counts.push(count);
    }

    /// Number of periods.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.periods.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Return in a specific period.
    #[must_use]
    pub fn get(&self, period: Period) -> Option<f64> {
        self.periods.binary_search(&period).ok().and_then(|i| self.returns[i])
    }

    /// Non-missing returns in period order.
    #[must_use]
    pub fn observed(&self) -> Vec<f64> {
        self.returns.iter().flatten().copied().collect()
    }

    /// Average constituent count across periods with a return.
    #[must_use]
    pub fn mean_count(&self) -> f64 {
        let counts: Vec<usize> =
            self.returns.iter().zip(&self.counts).filter(|(r, _)| r.is_some()).map(|(_, c)| *c).collect();
        if counts.is_empty() {
            return f64::NAN;
        }
        counts.iter().sum::<usize>() as f64 / counts.len() as f64
    }

    /// Long-minus-short series `self - other`, over the union of periods.
    ///
    /// Missing when either leg is missing; counts add up.
    #[must_use]
    pub fn difference(&self, other: &Self, key: PortfolioKey) -> Self {
        let mut legs: BTreeMap<Period, (Option<f64>, Option<f64>, usize)> = BTreeMap::new();
        for ((p, r), c) in self.periods.iter().zip(&self.returns).zip(&self.counts) {
            let entry = legs.entry(*p).or_insert((None, None, 0));
            entry.0 = *r;
            entry.2 += c;
        }
        for ((p, r), c) in other.periods.iter().zip(&other.returns).zip(&other.counts) {
            let entry = legs.entry(*p).or_insert((None, None, 0));
            entry.1 = *r;
            entry.2 += c;
        }

        let mut out = Self::new(key);
        for (period, (long, short, count)) in legs {
            out.push(period, long.zip(short).map(|(l, s)| l - s), count);
        }
        out
    }

    /// Equal-weighted average of several series per period.
    ///
    /// Averages over the series that have a return in each period.
    #[must_use]
    pub fn average(series: &[&Self], key: PortfolioKey) -> Self {
        let mut acc: BTreeMap<Period, (f64, usize, usize)> = BTreeMap::new();
        for s in series {
            for ((p, r), c) in s.periods.iter().zip(&s.returns).zip(&s.counts) {
                let entry = acc.entry(*p).or_insert((0.0, 0, 0));
                if let Some(r) = r {
                    entry.0 += r;
                    entry.1 += 1;
                }
                entry.2 += c;
            }
        }

        let mut out = Self::new(key);
        for (period, (sum, n, count)) in acc {
            out.push(period, (n > 0).then(|| sum / n as f64), count);
        }
        out
    }
}
