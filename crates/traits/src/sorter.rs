//! Cross-sectional sorting trait definitions.

/// Errors that can occur while sorting a cross-section.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    /// Too few eligible observations to form breakpoints.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Breakpoint specification cannot be used.
    #[error("invalid breakpoints: {0}")]
    InvalidBreakpoints(String),

    /// Input slices of different lengths.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
        /// Context description.
        context: String,
    },
}

impl SortError {
    /// Returns whether the period can be skipped and sorting continued.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Assigns a cross-section to quantile buckets.
pub trait Sorter: Send + Sync {
    /// Number of buckets produced.
    fn n_buckets(&self) -> usize;

    /// Breakpoints (lowest first, `n_buckets + 1` values) computed from the
    /// finite `values` whose `eligible` flag is set.
    ///
    /// # Errors
    /// Returns `SortError` if the lengths differ or no value is eligible.
    fn breakpoints(&self, values: &[f64], eligible: &[bool]) -> Result<Vec<f64>, SortError>;

    /// 1-based bucket of every value; `None` for non-finite values.
    ///
    /// # Errors
    /// Returns `SortError` if breakpoints cannot be formed.
    fn assign(&self, values: &[f64], eligible: &[bool]) -> Result<Vec<Option<u32>>, SortError>;
}
