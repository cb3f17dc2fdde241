//! Univariate portfolio sorts.

use empirica_math::{StandardError, finite_mean};
use empirica_primitives::{
    BucketAssignment, CrossSection, Panel, PortfolioKey, PortfolioReturns,
};
use empirica_traits::{Sorter, ToFrame};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    BreakpointSpec, PortfolioAggregator, PortfolioError, PortfolioSummary, QuantileSorter,
    Weighting,
    aggregate::SeriesBuilder,
    summary::{returns_frame, summary_frame},
};

/// Configuration for a univariate sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnivariateConfig {
    /// Sorting characteristic.
    pub characteristic: String,
    /// Breakpoint placement.
    pub breakpoints: BreakpointSpec,
    /// Constituent weighting.
    pub weighting: Weighting,
    /// Minimum breakpoint sample per period; defaults to the number of buckets.
    pub min_observations: Option<usize>,
    /// Standard error of the portfolio means.
    pub standard_error: StandardError,
}

impl Default for UnivariateConfig {
    fn default() -> Self {
        Self {
            characteristic: String::new(),
            breakpoints: BreakpointSpec::default(),
            weighting: Weighting::default(),
            min_observations: None,
            standard_error: StandardError::default(),
        }
    }
}

impl UnivariateConfig {
    /// Default configuration sorting on `characteristic`.
    #[must_use]
    pub fn new(characteristic: impl Into<String>) -> Self {
        Self { characteristic: characteristic.into(), ..Self::default() }
    }
}

/// Sorts a panel into quantile portfolios on one characteristic.
#[derive(Debug, Clone)]
pub struct UnivariateSort {
    config: UnivariateConfig,
    sorter: QuantileSorter,
    aggregator: PortfolioAggregator,
}

/// Output of a univariate sort.
#[derive(Debug, Clone)]
pub struct UnivariateResult {
    /// Sorting characteristic.
    pub characteristic: String,
    /// Assignment per sorted period.
    pub assignments: Vec<BucketAssignment>,
    /// Return series per bucket, lowest first.
    pub portfolios: Vec<PortfolioReturns>,
    /// Highest minus lowest bucket.
    pub spread: PortfolioReturns,
    /// Summary of every bucket followed by the spread.
    pub summaries: Vec<PortfolioSummary>,
}

impl UnivariateSort {
    /// Create a sort from its configuration.
    ///
    /// # Errors
    /// Returns `PortfolioError::Sort` if the breakpoint specification is invalid.
    pub fn with_config(config: UnivariateConfig) -> Result<Self, PortfolioError> {
        let sorter = QuantileSorter::new(&config.breakpoints)?;
        let aggregator = PortfolioAggregator::new(config.weighting);
        Ok(Self { config, sorter, aggregator })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &UnivariateConfig {
        &self.config
    }

    /// Number of portfolios.
    #[must_use]
    pub fn n_portfolios(&self) -> usize {
        self.sorter.n_buckets()
    }

    fn min_observations(&self) -> usize {
        self.config.min_observations.unwrap_or_else(|| self.n_portfolios())
    }

    fn characteristic_index(&self, panel: &Panel) -> Result<usize, PortfolioError> {
        panel
            .characteristic_index(&self.config.characteristic)
            .ok_or_else(|| PortfolioError::UnknownCharacteristic(self.config.characteristic.clone()))
    }

    /// Bucket assignments for every period with enough eligible observations.
    ///
    /// # Errors
    /// Returns `PortfolioError::UnknownCharacteristic` if the characteristic is
    /// not in the panel.
    pub fn assign(&self, panel: &Panel) -> Result<Vec<BucketAssignment>, PortfolioError> {
        let index = self.characteristic_index(panel)?;
        let mut assignments = Vec::new();
        for xs in panel.cross_sections() {
            if let Some(assignment) = self.assign_cross_section(&xs, index)? {
                assignments.push(assignment);
            }
        }
        Ok(assignments)
    }

    fn assign_cross_section(
        &self,
        xs: &CrossSection<'_>,
        index: usize,
    ) -> Result<Option<BucketAssignment>, PortfolioError> {
        let values = xs.characteristic(index).to_vec();
        let eligible: Vec<bool> = xs
            .breakpoint_eligible()
            .into_iter()
            .zip(&values)
            .map(|(e, v)| e && v.is_finite())
            .collect();

        let n_eligible = eligible.iter().filter(|e| **e).count();
        if n_eligible < self.min_observations() {
            log::warn!(
                "skipping period {}: {} eligible observations for {}, need {}",
                xs.period,
                n_eligible,
                self.config.characteristic,
                self.min_observations()
            );
            return Ok(None);
        }

        let ranks = match self.sorter.assign(&values, &eligible) {
            Ok(ranks) => ranks,
            Err(e) if e.is_recoverable() => {
                log::warn!("skipping period {}: {e}", xs.period);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(BucketAssignment::new(xs.period, xs.assets(), ranks, self.n_portfolios() as u32)))
    }

    /// Run the sort: assign, aggregate and summarize.
    ///
    /// # Errors
    /// Returns `PortfolioError::UnknownCharacteristic` for a missing
    /// characteristic and `PortfolioError::NoPeriods` if every period was skipped.
    pub fn run(&self, panel: &Panel) -> Result<UnivariateResult, PortfolioError> {
        let index = self.characteristic_index(panel)?;
        let n = self.n_portfolios();

        let mut builder = SeriesBuilder::new((1..=n as u32).map(PortfolioKey::Single));
        let mut characteristic_means: Vec<Vec<f64>> = vec![Vec::new(); n];
        let mut assignments = Vec::new();

        for xs in panel.cross_sections() {
            let Some(assignment) = self.assign_cross_section(&xs, index)? else {
                continue;
            };

            let labels: Vec<Option<usize>> =
                assignment.ranks.iter().map(|r| r.map(|r| r as usize - 1)).collect();
            let returns = xs.forward_returns().to_vec();
            let weights = xs.weights().to_vec();

            builder.push(xs.period, &self.aggregator.aggregate(&returns, &weights, &labels, n));

            let values = xs.characteristic(index).to_vec();
            for (bucket, mean) in
                PortfolioAggregator::average_outcome(&values, &labels, n).into_iter().enumerate()
            {
                if let Some(mean) = mean {
                    characteristic_means[bucket].push(mean);
                }
            }

            assignments.push(assignment);
        }

        if assignments.is_empty() {
            return Err(PortfolioError::NoPeriods);
        }

        let portfolios = builder.finish();
        let spread = portfolios[n - 1].difference(&portfolios[0], PortfolioKey::HighMinusLow);

        let se = &self.config.standard_error;
        let mut summaries: Vec<PortfolioSummary> = portfolios
            .iter()
            .zip(&characteristic_means)
            .map(|(series, chars)| {
                PortfolioSummary::from_series(series, se).with_characteristic(finite_mean(chars))
            })
            .collect();
        summaries.push(PortfolioSummary::from_series(&spread, se));

        log::info!(
            "sorted {} periods into {} portfolios on {}",
            assignments.len(),
            n,
            self.config.characteristic
        );

        Ok(UnivariateResult {
            characteristic: self.config.characteristic.clone(),
            assignments,
            portfolios,
            spread,
            summaries,
        })
    }
}

impl UnivariateResult {
    /// Summary of a specific portfolio.
    #[must_use]
    pub fn summary(&self, key: PortfolioKey) -> Option<&PortfolioSummary> {
        self.summaries.iter().find(|s| s.key == key)
    }

    /// Bucket series followed by the spread.
    pub fn series(&self) -> impl Iterator<Item = &PortfolioReturns> {
        self.portfolios.iter().chain(std::iter::once(&self.spread))
    }

    /// Return series in long format.
    ///
    /// # Errors
    /// Returns `PolarsError` if the frame cannot be assembled.
    pub fn returns_frame(&self) -> PolarsResult<DataFrame> {
        returns_frame(self.series())
    }
}

impl ToFrame for UnivariateResult {
    fn to_frame(&self) -> PolarsResult<DataFrame> {
        summary_frame(&self.summaries)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use empirica_primitives::{Observation, Period, Symbol};

    use super::*;

    /// Ten assets over three periods; returns rise with the characteristic.
    fn panel() -> Panel {
        let mut obs = Vec::new();
        for t in 0..3 {
            for i in 0..10 {
                let x = f64::from(i + 1);
                obs.push(
                    Observation::new(
                        Symbol::new(format!("A{i}")),
                        Period::new(t),
                        vec![x],
                        0.01 * x + 0.001 * t as f64,
                    )
                    .with_weight(x),
                );
            }
        }
        Panel::new(vec!["size".to_string()], obs).unwrap()
    }

    #[test]
    fn quintile_assignments() {
        let sort = UnivariateSort::with_config(UnivariateConfig::new("size")).unwrap();
        let assignments = sort.assign(&panel()).unwrap();

        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[0].counts(), vec![2, 2, 2, 2, 2]);
        assert_eq!(assignments[0].get("A0"), Some(1));
        assert_eq!(assignments[0].get("A9"), Some(5));
    }

    #[test]
    fn equal_weighted_spread() {
        let sort = UnivariateSort::with_config(UnivariateConfig::new("size")).unwrap();
        let result = sort.run(&panel()).unwrap();

        assert_eq!(result.portfolios.len(), 5);
        // P1 holds x = 1, 2; P5 holds x = 9, 10.
        assert_relative_eq!(result.portfolios[0].get(Period::new(0)).unwrap(), 0.015, epsilon = 1e-12);
        assert_relative_eq!(result.portfolios[4].get(Period::new(0)).unwrap(), 0.095, epsilon = 1e-12);
        for t in 0..3 {
            assert_relative_eq!(result.spread.get(Period::new(t)).unwrap(), 0.08, epsilon = 1e-12);
        }

        let hml = result.summary(PortfolioKey::HighMinusLow).unwrap();
        assert_relative_eq!(hml.mean_return, 0.08, epsilon = 1e-12);
        assert_eq!(hml.n_periods, 3);

        let p1 = result.summary(PortfolioKey::Single(1)).unwrap();
        assert_relative_eq!(p1.mean_characteristic.unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(p1.mean_count, 2.0);
    }

    #[test]
    fn value_weighted_returns() {
        let config = UnivariateConfig { weighting: Weighting::Value, ..UnivariateConfig::new("size") };
        let result = UnivariateSort::with_config(config).unwrap().run(&panel()).unwrap();

        // (1 * 0.01 + 2 * 0.02) / 3
        assert_relative_eq!(
            result.portfolios[0].get(Period::new(0)).unwrap(),
            0.05 / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn thin_periods_are_skipped() {
        let config = UnivariateConfig { min_observations: Some(11), ..UnivariateConfig::new("size") };
        let sort = UnivariateSort::with_config(config).unwrap();

        assert!(sort.assign(&panel()).unwrap().is_empty());
        assert!(matches!(sort.run(&panel()), Err(PortfolioError::NoPeriods)));
    }

    #[test]
    fn unknown_characteristic_errors() {
        let sort = UnivariateSort::with_config(UnivariateConfig::new("beta")).unwrap();
        assert!(matches!(sort.run(&panel()), Err(PortfolioError::UnknownCharacteristic(_))));
    }

    #[test]
    fn frames_have_expected_shape() {
        let sort = UnivariateSort::with_config(UnivariateConfig::new("size")).unwrap();
        let result = sort.run(&panel()).unwrap();

        assert_eq!(result.to_frame().unwrap().height(), 6);
        assert_eq!(result.returns_frame().unwrap().height(), 18);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: UnivariateConfig =
            serde_json::from_str(r#"{"characteristic": "bm", "weighting": "value"}"#).unwrap();
        assert_eq!(config.characteristic, "bm");
        assert_eq!(config.weighting, Weighting::Value);
        assert_eq!(config.breakpoints, BreakpointSpec::Equal(5));
    }
}
