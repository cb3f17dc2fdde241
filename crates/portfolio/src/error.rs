//! Error types for portfolio analysis.

use empirica_math::MathError;
use empirica_traits::SortError;

/// Errors that can occur during portfolio analysis.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    /// Sorting error.
    #[error("sort error: {0}")]
    Sort(#[from] SortError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Characteristic not present in the panel.
    #[error("unknown characteristic: {0}")]
    UnknownCharacteristic(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No period could be sorted.
    #[error("no period has enough observations to sort")]
    NoPeriods,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PortfolioError::UnknownCharacteristic("size".to_string());
        assert!(err.to_string().contains("size"));
    }

    #[test]
    fn sort_error_converts() {
        let err: PortfolioError = SortError::InvalidBreakpoints("descending".to_string()).into();
        assert!(matches!(err, PortfolioError::Sort(_)));
    }
}
