//! Fama-MacBeth two-pass regressions.

use std::collections::HashSet;

use empirica_math::{CenterXSection, StandardError, winsorize};
use empirica_primitives::{CrossSection, CrossSectionFit, Panel, RegressionResult};
use empirica_traits::{CrossSectionRegressor, EstimatorError, PanelEstimator};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{CrossSectionOls, OlsConfig, RegressionError};

/// Name of the intercept term.
pub const INTERCEPT: &str = "intercept";

/// Configuration for Fama-MacBeth estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FamaMacBethConfig {
    /// Characteristics used as regressors.
    pub regressors: Vec<String>,
    /// Estimate an intercept.
    pub intercept: bool,
    /// Weighted least squares with the observation weights.
    pub weighted: bool,
    /// Per-period winsorization of regressors at this tail fraction (None to disable).
    pub winsorize: Option<f64>,
    /// Per-period standardization of regressors.
    pub standardize: bool,
    /// Minimum usable observations per period; defaults to parameters + 1.
    pub min_observations: Option<usize>,
    /// Standard error of the coefficient means.
    pub standard_error: StandardError,
}

impl Default for FamaMacBethConfig {
    fn default() -> Self {
        Self {
            regressors: Vec::new(),
            intercept: true,
            weighted: false,
            winsorize: None,
            standardize: false,
            min_observations: None,
            standard_error: StandardError::default(),
        }
    }
}

impl FamaMacBethConfig {
    /// Default configuration on the given regressors.
    #[must_use]
    pub fn new<S: Into<String>>(regressors: impl IntoIterator<Item = S>) -> Self {
        Self { regressors: regressors.into_iter().map(Into::into).collect(), ..Self::default() }
    }
}

/// Fama-MacBeth estimator.
///
/// Runs one cross-sectional regression per period, then averages each
/// coefficient over time.
#[derive(Debug, Clone)]
pub struct FamaMacBeth {
    config: FamaMacBethConfig,
    regressor: CrossSectionOls,
    standardizer: CenterXSection,
}

impl FamaMacBeth {
    /// Create an estimator from its configuration.
    ///
    /// # Errors
    /// Returns `RegressionError::InvalidConfig` for an empty or duplicated
    /// regressor list or a winsorization fraction outside (0, 0.5).
    pub fn with_config(config: FamaMacBethConfig) -> Result<Self, RegressionError> {
        if config.regressors.is_empty() {
            return Err(RegressionError::InvalidConfig("no regressors".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = config.regressors.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(RegressionError::InvalidConfig(format!("duplicate regressor: {dup}")));
        }
        if let Some(fraction) = config.winsorize
            && !(fraction > 0.0 && fraction < 0.5)
        {
            return Err(RegressionError::InvalidConfig(format!(
                "winsorize fraction must be in (0, 0.5), got {fraction}"
            )));
        }

        let regressor = CrossSectionOls::with_config(OlsConfig { intercept: config.intercept });
        Ok(Self { config, regressor, standardizer: CenterXSection::new(true) })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FamaMacBethConfig {
        &self.config
    }

    /// Term names in coefficient order.
    #[must_use]
    pub fn terms(&self) -> Vec<String> {
        let intercept = self.config.intercept.then(|| INTERCEPT.to_string());
        intercept.into_iter().chain(self.config.regressors.iter().cloned()).collect()
    }

    fn min_observations(&self) -> usize {
        self.config
            .min_observations
            .unwrap_or_else(|| self.regressor.n_params(self.config.regressors.len()) + 1)
    }

    /// Run both passes.
    ///
    /// # Errors
    /// Returns `RegressionError::UnknownCharacteristic` for a missing regressor
    /// and `RegressionError::InsufficientPeriods` if fewer than two periods
    /// could be estimated.
    pub fn fit(&self, panel: &Panel) -> Result<RegressionResult, RegressionError> {
        let indices = self
            .config
            .regressors
            .iter()
            .map(|name| {
                panel
                    .characteristic_index(name)
                    .ok_or_else(|| RegressionError::UnknownCharacteristic(name.clone()))
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let mut fits: Vec<CrossSectionFit> = Vec::new();
        for xs in panel.cross_sections() {
            match self.fit_cross_section(&xs, &indices) {
                Ok(Some(fit)) => fits.push(fit),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    log::warn!("skipping period {}: {e}", xs.period);
                }
                Err(e) => return Err(e),
            }
        }

        if fits.len() < 2 {
            return Err(RegressionError::InsufficientPeriods { required: 2, actual: fits.len() });
        }

        self.second_pass(fits)
    }

    /// First pass for one period; `None` when the period has too few usable rows.
    fn fit_cross_section(
        &self,
        xs: &CrossSection<'_>,
        indices: &[usize],
    ) -> Result<Option<CrossSectionFit>, RegressionError> {
        let returns = xs.forward_returns();
        let weights = xs.weights();
        let columns: Vec<Array1<f64>> = indices.iter().map(|&i| xs.characteristic(i)).collect();

        let usable: Vec<usize> = (0..xs.len())
            .filter(|&i| {
                returns[i].is_finite()
                    && columns.iter().all(|c| c[i].is_finite())
                    && (!self.config.weighted || (weights[i].is_finite() && weights[i] > 0.0))
            })
            .collect();

        let n = usable.len();
        if n < self.min_observations() {
            log::warn!(
                "skipping period {}: {} usable observations, need {}",
                xs.period,
                n,
                self.min_observations()
            );
            return Ok(None);
        }

        let y: Array1<f64> = usable.iter().map(|&i| returns[i]).collect();
        let w: Option<Array1<f64>> =
            self.config.weighted.then(|| usable.iter().map(|&i| weights[i]).collect());

        let mut x = Array2::zeros((n, columns.len()));
        for (j, column) in columns.iter().enumerate() {
            let mut values: Array1<f64> = usable.iter().map(|&i| column[i]).collect();
            if let Some(fraction) = self.config.winsorize {
                values = winsorize(&values, fraction)?;
            }
            if self.config.standardize {
                values = self.standardizer.apply(&values);
            }
            x.column_mut(j).assign(&values);
        }

        let fit = self.regressor.fit_single(xs.period, &y, &x, w.as_ref())?;
        log::debug!("period {}: n = {}, r2 = {:.4}", xs.period, fit.n_obs, fit.r_squared);
        Ok(Some(fit))
    }

    fn second_pass(&self, fits: Vec<CrossSectionFit>) -> Result<RegressionResult, RegressionError> {
        let terms = self.terms();
        let k = terms.len();
        let t = fits.len() as f64;

        let mut mean_coefficients = Array1::zeros(k);
        let mut standard_errors = Array1::zeros(k);
        let mut t_stats = Array1::zeros(k);
        let mut p_values = Array1::zeros(k);
        let mut lags = None;

        for j in 0..k {
            let series: Vec<f64> = fits.iter().map(|fit| fit.coefficients[j]).collect();
            let estimate = self.config.standard_error.estimate(&series)?;
            mean_coefficients[j] = estimate.mean;
            standard_errors[j] = estimate.std_error;
            t_stats[j] = estimate.t_stat;
            p_values[j] = estimate.p_value;
            lags = estimate.lags;
        }

        let mean_r_squared = fits.iter().map(|f| f.r_squared).sum::<f64>() / t;
        let adj: Vec<f64> =
            fits.iter().map(|f| f.adj_r_squared).filter(|r| r.is_finite()).collect();
        let mean_adj_r_squared =
            if adj.is_empty() { f64::NAN } else { adj.iter().sum::<f64>() / adj.len() as f64 };
        let mean_n_obs = fits.iter().map(|f| f.n_obs as f64).sum::<f64>() / t;

        log::info!(
            "Fama-MacBeth over {} periods on {} terms, mean r2 = {:.4}",
            fits.len(),
            k,
            mean_r_squared
        );

        Ok(RegressionResult {
            terms,
            per_period: fits,
            mean_coefficients,
            standard_errors,
            t_stats,
            p_values,
            mean_r_squared,
            mean_adj_r_squared,
            mean_n_obs,
            lags,
        })
    }
}

impl PanelEstimator for FamaMacBeth {
    fn estimate(&self, panel: &Panel) -> Result<RegressionResult, EstimatorError> {
        self.fit(panel).map_err(EstimatorError::from)
    }
}

/// Per-period coefficients in long format: `period | term | coefficient`.
///
/// # Errors
/// Returns `PolarsError` if the frame cannot be assembled.
pub fn period_frame(result: &RegressionResult) -> PolarsResult<DataFrame> {
    let mut periods: Vec<i64> = Vec::new();
    let mut terms: Vec<&str> = Vec::new();
    let mut coefficients: Vec<f64> = Vec::new();

    for fit in &result.per_period {
        for (term, coefficient) in result.terms.iter().zip(fit.coefficients.iter()) {
            periods.push(fit.period.value());
            terms.push(term);
            coefficients.push(*coefficient);
        }
    }

    DataFrame::new(vec![
        Column::new("period".into(), periods),
        Column::new("term".into(), terms),
        Column::new("coefficient".into(), coefficients),
    ])
}
