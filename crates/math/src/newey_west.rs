//! Inference on the time-series mean of a return or coefficient series.
//!
//! The Newey-West standard error of the mean uses Bartlett kernel weights:
//! ```text
//! se = sqrt(S / T)
//! S  = γ_0 + 2 Σ_{l=1}^{L} (1 - l/(L+1)) γ_l
//! γ_l = (1/T) Σ_{t=l}^{T-1} (x_t - x̄)(x_{t-l} - x̄)
//! ```
//!
//! # References
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::MathError;

/// Standard error of a time-series mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardError {
    /// Sample standard deviation over sqrt(T).
    Plain,
    /// Newey-West with a fixed lag count, or automatic selection when `None`.
    NeweyWest {
        /// Number of lags.
        lags: Option<usize>,
    },
}

impl Default for StandardError {
    fn default() -> Self {
        Self::NeweyWest { lags: None }
    }
}

/// Automatic lag length: ceil(4 * (T/100)^(2/9)).
#[must_use]
pub fn newey_west_lags(n_periods: usize) -> usize {
    let t = n_periods as f64;
    (4.0 * (t / 100.0).powf(2.0 / 9.0)).ceil() as usize
}

/// Bartlett kernel weight 1 - l/(L+1) for lag `l` up to `max_lag`.
#[must_use]
pub fn bartlett_weight(lag: usize, max_lag: usize) -> f64 {
    if lag == 0 {
        1.0
    } else if lag <= max_lag {
        1.0 - (lag as f64) / (max_lag as f64 + 1.0)
    } else {
        0.0
    }
}

/// Mean of a series with its standard error and test statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanEstimate {
    /// Sample mean.
    pub mean: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// t-statistic of the mean against zero.
    pub t_stat: f64,
    /// Two-sided p-value (Student t, T-1 degrees of freedom).
    pub p_value: f64,
    /// Number of observations.
    pub n: usize,
    /// Lags used, `None` for plain standard errors.
    pub lags: Option<usize>,
}

impl MeanEstimate {
    /// Estimate with every statistic undefined, for series too short to test.
    #[must_use]
    pub const fn undefined(n: usize) -> Self {
        Self { mean: f64::NAN, std_error: f64::NAN, t_stat: f64::NAN, p_value: f64::NAN, n, lags: None }
    }
}

impl StandardError {
    /// Estimate the mean of `series` and its standard error.
    ///
    /// # Errors
    /// Returns `MathError::InsufficientData` for fewer than two observations
    /// and `MathError::LinearAlgebra` if the series has non-finite values.
    pub fn estimate(&self, series: &[f64]) -> Result<MeanEstimate, MathError> {
        let n = series.len();
        if n < 2 {
            return Err(MathError::InsufficientData { required: 2, actual: n });
        }
        if series.iter().any(|x| !x.is_finite()) {
            return Err(MathError::LinearAlgebra("series contains non-finite values".to_string()));
        }

        let t = n as f64;
        let mean = series.iter().sum::<f64>() / t;

        let (std_error, lags) = match *self {
            Self::Plain => {
                let var = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (t - 1.0);
                ((var / t).sqrt(), None)
            }
            Self::NeweyWest { lags } => {
                let max_lag = lags.unwrap_or_else(|| newey_west_lags(n)).min(n - 1);
                let mut s = autocovariance(series, mean, 0);
                for lag in 1..=max_lag {
                    s += 2.0 * bartlett_weight(lag, max_lag) * autocovariance(series, mean, lag);
                }
                ((s.max(0.0) / t).sqrt(), Some(max_lag))
            }
        };

        let t_stat = if std_error > 0.0 { mean / std_error } else { f64::NAN };
        let p_value = two_sided_p_value(t_stat, n - 1);

        Ok(MeanEstimate { mean, std_error, t_stat, p_value, n, lags })
    }
}

/// γ_l with the 1/T normalization.
fn autocovariance(series: &[f64], mean: f64, lag: usize) -> f64 {
    let sum: f64 = (lag..series.len()).map(|t| (series[t] - mean) * (series[t - lag] - mean)).sum();
    sum / series.len() as f64
}

fn two_sided_p_value(t_stat: f64, dof: usize) -> f64 {
    if !t_stat.is_finite() || dof == 0 {
        return f64::NAN;
    }
    StudentsT::new(0.0, 1.0, dof as f64)
        .map(|dist| 2.0 * (1.0 - dist.cdf(t_stat.abs())))
        .unwrap_or(f64::NAN)
}
