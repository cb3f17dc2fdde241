//! Time-series summaries of portfolio returns.

use empirica_math::{MeanEstimate, StandardError, finite_mean};
use empirica_primitives::{PortfolioKey, PortfolioReturns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Time-series summary of one portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Portfolio identifier.
    pub key: PortfolioKey,
    /// Average return across periods with a return.
    pub mean_return: f64,
    /// Standard error of the mean return.
    pub std_error: f64,
    /// t-statistic of the mean return.
    pub t_stat: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Number of periods with a return.
    pub n_periods: usize,
    /// Average number of constituents.
    pub mean_count: f64,
    /// Time-series average of the sorting characteristic, when tracked.
    pub mean_characteristic: Option<f64>,
}

impl PortfolioSummary {
    /// Summarize a return series.
    ///
    /// Series with fewer than two returns get undefined inference statistics.
    #[must_use]
    pub fn from_series(series: &PortfolioReturns, standard_error: &StandardError) -> Self {
        let observed = series.observed();
        let estimate = standard_error.estimate(&observed).unwrap_or_else(|e| {
            log::warn!("cannot test mean of {}: {e}", series.key);
            MeanEstimate {
                mean: finite_mean(&observed).unwrap_or(f64::NAN),
                ..MeanEstimate::undefined(observed.len())
            }
        });

        Self {
            key: series.key,
            mean_return: estimate.mean,
            std_error: estimate.std_error,
            t_stat: estimate.t_stat,
            p_value: estimate.p_value,
            n_periods: observed.len(),
            mean_count: series.mean_count(),
            mean_characteristic: None,
        }
    }

    /// Attach the average sorting characteristic.
    #[must_use]
    pub const fn with_characteristic(mut self, value: Option<f64>) -> Self {
        self.mean_characteristic = value;
        self
    }
}

/// Summaries as a DataFrame with columns
/// `portfolio | mean_return | std_error | t_stat | p_value | n_periods | mean_count | mean_characteristic`.
///
/// # Errors
/// Returns `PolarsError` if the frame cannot be assembled.
pub fn summary_frame(summaries: &[PortfolioSummary]) -> PolarsResult<DataFrame> {
    let portfolio: Vec<String> = summaries.iter().map(|s| s.key.to_string()).collect();
    let mean_return: Vec<f64> = summaries.iter().map(|s| s.mean_return).collect();
    let std_error: Vec<f64> = summaries.iter().map(|s| s.std_error).collect();
    let t_stat: Vec<f64> = summaries.iter().map(|s| s.t_stat).collect();
    let p_value: Vec<f64> = summaries.iter().map(|s| s.p_value).collect();
    let n_periods: Vec<u32> = summaries.iter().map(|s| s.n_periods as u32).collect();
    let mean_count: Vec<f64> = summaries.iter().map(|s| s.mean_count).collect();
    let mean_characteristic: Vec<Option<f64>> =
        summaries.iter().map(|s| s.mean_characteristic).collect();

    DataFrame::new(vec![
        Column::new("portfolio".into(), portfolio),
        Column::new("mean_return".into(), mean_return),
        Column::new("std_error".into(), std_error),
        Column::new("t_stat".into(), t_stat),
        Column::new("p_value".into(), p_value),
        Column::new("n_periods".into(), n_periods),
        Column::new("mean_count".into(), mean_count),
        Column::new("mean_characteristic".into(), mean_characteristic),
    ])
}

/// Return series in long format with columns `period | portfolio | return | count`.
///
/// # Errors
/// Returns `PolarsError` if the frame cannot be assembled.
pub fn returns_frame<'a>(
    series: impl IntoIterator<Item = &'a PortfolioReturns>,
) -> PolarsResult<DataFrame> {
    let mut periods: Vec<i64> = Vec::new();
    let mut portfolios: Vec<String> = Vec::new();
    let mut returns: Vec<Option<f64>> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();

    for s in series {
        let label = s.key.to_string();
        for ((period, ret), count) in s.periods.iter().zip(&s.returns).zip(&s.counts) {
            periods.push(period.value());
            portfolios.push(label.clone());
            returns.push(*ret);
            counts.push(*count as u32);
        }
    }

    DataFrame::new(vec![
        Column::new("period".into(), periods),
        Column::new("portfolio".into(), portfolios),
        Column::new("return".into(), returns),
        Column::new("count".into(), counts),
    ])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use empirica_primitives::Period;

    use super::*;

    fn series(values: &[Option<f64>]) -> PortfolioReturns {
        let mut s = PortfolioReturns::new(PortfolioKey::Single(1));
        for (t, v) in values.iter().enumerate() {
            s.push(Period::new(t as i64), *v, if v.is_some() { 10 } else { 0 });
        }
        s
    }

    #[test]
    fn summary_statistics() {
        let s = series(&[Some(0.01), Some(0.02), None, Some(0.03)]);
        let summary = PortfolioSummary::from_series(&s, &StandardError::Plain);

        assert_relative_eq!(summary.mean_return, 0.02, epsilon = 1e-12);
        assert_relative_eq!(summary.std_error, (0.0001_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(summary.n_periods, 3);
        assert_relative_eq!(summary.mean_count, 10.0);
        assert_eq!(summary.mean_characteristic, None);
    }

    #[test]
    fn single_period_is_undefined() {
        let s = series(&[Some(0.05), None]);
        let summary = PortfolioSummary::from_series(&s, &StandardError::default());

        assert_relative_eq!(summary.mean_return, 0.05);
        assert!(summary.std_error.is_nan());
        assert!(summary.t_stat.is_nan());
        assert_eq!(summary.n_periods, 1);
    }

    #[test]
    fn summary_frame_columns() {
        let s = series(&[Some(0.01), Some(0.03)]);
        let summary =
            PortfolioSummary::from_series(&s, &StandardError::Plain).with_characteristic(Some(1.5));
        let df = summary_frame(&[summary]).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(
            df.get_column_names(),
            vec![
                "portfolio",
                "mean_return",
                "std_error",
                "t_stat",
                "p_value",
                "n_periods",
                "mean_count",
                "mean_characteristic"
            ]
        );
        assert_eq!(df.column("portfolio").unwrap().str().unwrap().get(0), Some("P1"));
        assert_eq!(df.column("mean_characteristic").unwrap().f64().unwrap().get(0), Some(1.5));
    }

    #[test]
    fn returns_frame_is_long() {
        let a = series(&[Some(0.01), None]);
        let mut b = series(&[Some(0.02), Some(0.04)]);
        b.key = PortfolioKey::HighMinusLow;

        let df = returns_frame([&a, &b]).unwrap();

        assert_eq!(df.shape(), (4, 4));
        assert_eq!(df.column("return").unwrap().null_count(), 1);
        assert_eq!(df.column("portfolio").unwrap().str().unwrap().get(3), Some("HML"));
    }
}
