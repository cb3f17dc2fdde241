//! Error types for panel construction.

use crate::{Period, Symbol};

/// Errors that can occur while assembling a panel.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// The same asset appears twice in one period.
    #[error("duplicate observation for {asset} in period {period}")]
    DuplicateObservation {
        /// Repeated asset.
        asset: Symbol,
        /// Period of the repeat.
        period: Period,
    },

    /// Characteristic vector length does not match the panel's names.
    #[error("observation for {asset} has {actual} characteristics, expected {expected}")]
    CharacteristicCount {
        /// Offending asset.
        asset: Symbol,
        /// Number of characteristic names.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}
