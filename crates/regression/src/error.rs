//! Error types for cross-sectional regressions.

use empirica_math::MathError;
use empirica_traits::EstimatorError;

/// Errors that can occur during Fama-MacBeth estimation.
#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

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

    /// Too few periods survived the first pass.
    #[error("insufficient periods: need at least {required}, got {actual}")]
    InsufficientPeriods {
        /// Required number of periods.
        required: usize,
        /// Actual number of periods.
        actual: usize,
    },
}

impl RegressionError {
    /// Returns whether this error only affects a single period.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Estimator(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

impl From<RegressionError> for EstimatorError {
    fn from(err: RegressionError) -> Self {
        match err {
            RegressionError::Estimator(e) => e,
            RegressionError::Math(e) => Self::LinearAlgebra(e.to_string()),
            RegressionError::Polars(e) => Self::Polars(e),
            RegressionError::UnknownCharacteristic(name) => Self::UnknownCharacteristic(name),
            RegressionError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            RegressionError::InsufficientPeriods { required, actual } => {
                Self::InsufficientData { required, actual }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RegressionError::InsufficientPeriods { required: 2, actual: 1 };
        assert_eq!(err.to_string(), "insufficient periods: need at least 2, got 1");
    }

    #[test]
    fn error_is_recoverable() {
        let err: RegressionError = EstimatorError::LinearAlgebra("singular".to_string()).into();
        assert!(err.is_recoverable());

        let err = RegressionError::UnknownCharacteristic("beta".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn converts_to_estimator_error() {
        let err: EstimatorError = RegressionError::InsufficientPeriods { required: 2, actual: 0 }.into();
        assert!(matches!(err, EstimatorError::InsufficientData { required: 2, actual: 0 }));
    }
}
