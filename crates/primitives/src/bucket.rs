//! Bucket assignments.

use serde::{Deserialize, Serialize};

use crate::{Period, Symbol};

/// Quantile ranks of one cross-section on one characteristic.
///
/// Ranks are 1-based, `1` holding the lowest characteristic values.
/// Unassigned observations carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAssignment {
    /// Period of the cross-section.
    pub period: Period,
    /// Asset symbols, in cross-section order.
    pub assets: Vec<Symbol>,
    /// Rank per asset.
    pub ranks: Vec<Option<u32>>,
    /// Number of buckets.
    pub n_buckets: u32,
}

impl BucketAssignment {
    /// Create a new assignment.
    #[must_use]
    pub fn new(period: Period, assets: Vec<Symbol>, ranks: Vec<Option<u32>>, n_buckets: u32) -> Self {
        debug_assert_eq!(assets.len(), ranks.len());
        Self { period, assets, ranks, n_buckets }
    }

    /// Number of assets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Rank of a specific asset.
    #[must_use]
    pub fn get(&self, asset: &str) -> Option<u32> {
        self.assets.iter().position(|s| s.as_str() == asset).and_then(|i| self.ranks[i])
    }

    /// Positions of the members of `bucket`.
    #[must_use]
    pub fn members(&self, bucket: u32) -> Vec<usize> {
        self.ranks
            .iter()
            .enumerate()
            .filter_map(|(i, r)| (*r == Some(bucket)).then_some(i))
            .collect()
    }

    /// Number of members per bucket, index 0 holding bucket 1.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_buckets as usize];
        for rank in self.ranks.iter().flatten() {
            if let Some(c) = counts.get_mut(*rank as usize - 1) {
                *c += 1;
            }
        }
        counts
    }
}
