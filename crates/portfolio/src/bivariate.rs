//! Bivariate portfolio sorts.
//!
//! Independent sorts rank both characteristics on the full sample. Dependent
//! sorts rank the second characteristic within each bucket of the first,
//! which balances the grid when the two are correlated.

use empirica_math::StandardError;
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

/// How the second characteristic is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMethod {
    /// Both characteristics on the full sample.
    #[default]
    Independent,
    /// Second characteristic within buckets of the first.
    Dependent,
}

/// Configuration for a bivariate sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BivariateConfig {
    /// First sorting characteristic.
    pub first: String,
    /// Second sorting characteristic.
    pub second: String,
    /// Breakpoints of the first characteristic.
    pub first_breakpoints: BreakpointSpec,
    /// Breakpoints of the second characteristic.
    pub second_breakpoints: BreakpointSpec,
    /// Independent or dependent sort.
    pub method: SortMethod,
    /// Constituent weighting.
    pub weighting: Weighting,
    /// Minimum sample per period; defaults to the number of grid cells.
    pub min_observations: Option<usize>,
    /// Standard error of the portfolio means.
    pub standard_error: StandardError,
}

impl Default for BivariateConfig {
    fn default() -> Self {
        Self {
            first: String::new(),
            second: String::new(),
            first_breakpoints: BreakpointSpec::default(),
            second_breakpoints: BreakpointSpec::default(),
            method: SortMethod::default(),
            weighting: Weighting::default(),
            min_observations: None,
            standard_error: StandardError::default(),
        }
    }
}

impl BivariateConfig {
    /// Default configuration sorting on `first` then `second`.
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self { first: first.into(), second: second.into(), ..Self::default() }
    }
}

/// Sorts a panel into a grid of portfolios on two characteristics.
#[derive(Debug, Clone)]
pub struct BivariateSort {
    config: BivariateConfig,
    first_sorter: QuantileSorter,
    second_sorter: QuantileSorter,
    aggregator: PortfolioAggregator,
}

/// Output of a bivariate sort.
///
/// Grid cells are stored row-major: `grid[(i - 1) * n2 + (j - 1)]` holds
/// `Pair(i, j)`.
#[derive(Debug, Clone)]
pub struct BivariateResult {
    /// First characteristic.
    pub first: String,
    /// Second characteristic.
    pub second: String,
    /// Sort method used.
    pub method: SortMethod,
    /// Number of first-characteristic buckets.
    pub n_first: usize,
    /// Number of second-characteristic buckets.
    pub n_second: usize,
    /// First-characteristic assignment per sorted period.
    pub first_assignments: Vec<BucketAssignment>,
    /// Second-characteristic assignment per sorted period.
    pub second_assignments: Vec<BucketAssignment>,
    /// Cell series.
    pub grid: Vec<PortfolioReturns>,
    /// `Pair(n1, j) - Pair(1, j)` per second bucket.
    pub first_spreads: Vec<PortfolioReturns>,
    /// `Pair(i, n2) - Pair(i, 1)` per first bucket.
    pub second_spreads: Vec<PortfolioReturns>,
    /// First buckets averaged across second buckets.
    pub first_averaged: Vec<PortfolioReturns>,
    /// Second buckets averaged across first buckets.
    pub second_averaged: Vec<PortfolioReturns>,
    /// Spread of the first characteristic controlling for the second.
    pub first_averaged_spread: PortfolioReturns,
    /// Spread of the second characteristic controlling for the first.
    pub second_averaged_spread: PortfolioReturns,
    /// Summary of every series above.
    pub summaries: Vec<PortfolioSummary>,
}

impl BivariateSort {
    /// Create a sort from its configuration.
    ///
    /// # Errors
    /// Returns `PortfolioError::Sort` if a breakpoint specification is invalid
    /// and `PortfolioError::InvalidConfig` if both characteristics are the same.
    pub fn with_config(config: BivariateConfig) -> Result<Self, PortfolioError> {
        if config.first == config.second {
            return Err(PortfolioError::InvalidConfig(format!(
                "cannot sort {} against itself",
                config.first
            )));
        }
        let first_sorter = QuantileSorter::new(&config.first_breakpoints)?;
        let second_sorter = QuantileSorter::new(&config.second_breakpoints)?;
        let aggregator = PortfolioAggregator::new(config.weighting);
        Ok(Self { config, first_sorter, second_sorter, aggregator })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &BivariateConfig {
        &self.config
    }

    /// Grid dimensions `(n1, n2)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.first_sorter.n_buckets(), self.second_sorter.n_buckets())
    }

    fn min_observations(&self) -> usize {
        let (n1, n2) = self.shape();
        self.config.min_observations.unwrap_or(n1 * n2)
    }

    fn indices(&self, panel: &Panel) -> Result<(usize, usize), PortfolioError> {
        let lookup = |name: &str| {
            panel
                .characteristic_index(name)
                .ok_or_else(|| PortfolioError::UnknownCharacteristic(name.to_string()))
        };
        Ok((lookup(&self.config.first)?, lookup(&self.config.second)?))
    }

    /// Bucket assignments on both characteristics for every sorted period.
    ///
    /// # Errors
    /// Returns `PortfolioError::UnknownCharacteristic` if either characteristic
    /// is not in the panel.
    pub fn assign(
        &self,
        panel: &Panel,
    ) -> Result<Vec<(BucketAssignment, BucketAssignment)>, PortfolioError> {
        let (i1, i2) = self.indices(panel)?;
        let mut assignments = Vec::new();
        for xs in panel.cross_sections() {
            if let Some(pair) = self.assign_cross_section(&xs, i1, i2)? {
                assignments.push(pair);
            }
        }
        Ok(assignments)
    }

    fn assign_cross_section(
        &self,
        xs: &CrossSection<'_>,
        i1: usize,
        i2: usize,
    ) -> Result<Option<(BucketAssignment, BucketAssignment)>, PortfolioError> {
        let (n1, n2) = self.shape();
        let raw1 = xs.characteristic(i1);
        let raw2 = xs.characteristic(i2);

        // Restrict to observations with both characteristics.
        let in_sample: Vec<bool> =
            raw1.iter().zip(raw2.iter()).map(|(a, b)| a.is_finite() && b.is_finite()).collect();
        let mask = |raw: &[f64]| -> Vec<f64> {
            raw.iter().zip(&in_sample).map(|(x, s)| if *s { *x } else { f64::NAN }).collect()
        };
        let first_values = mask(&raw1.to_vec());
        let second_values = mask(&raw2.to_vec());
        let eligible: Vec<bool> =
            xs.breakpoint_eligible().into_iter().zip(&in_sample).map(|(e, s)| e && *s).collect();

        let n_eligible = eligible.iter().filter(|e| **e).count();
        if n_eligible < self.min_observations() {
            log::warn!(
                "skipping period {}: {} eligible observations for {} x {}, need {}",
                xs.period,
                n_eligible,
                self.config.first,
                self.config.second,
                self.min_observations()
            );
            return Ok(None);
        }

        let sorted = self.first_sorter.assign(&first_values, &eligible).and_then(|first| {
            let second = match self.config.method {
                SortMethod::Independent => self.second_sorter.assign(&second_values, &eligible)?,
                SortMethod::Dependent => {
                    self.sort_within(xs, &first, n1, &second_values, &eligible)?
                }
            };
            Ok((first, second))
        });

        let (first, second) = match sorted {
            Ok(ranks) => ranks,
            Err(e) if e.is_recoverable() => {
                log::warn!("skipping period {}: {e}", xs.period);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let assets = xs.assets();
        Ok(Some((
            BucketAssignment::new(xs.period, assets.clone(), first, n1 as u32),
            BucketAssignment::new(xs.period, assets, second, n2 as u32),
        )))
    }

    /// Ranks on the second characteristic within each first-characteristic bucket.
    fn sort_within(
        &self,
        xs: &CrossSection<'_>,
        first: &[Option<u32>],
        n1: usize,
        values: &[f64],
        eligible: &[bool],
    ) -> Result<Vec<Option<u32>>, empirica_traits::SortError> {
        let mut ranks = vec![None; values.len()];
        for bucket in 1..=n1 as u32 {
            let members: Vec<bool> = first.iter().map(|r| *r == Some(bucket)).collect();
            if !members.iter().any(|m| *m) {
                continue;
            }
            if !members.iter().zip(eligible).any(|(m, e)| *m && *e) {
                log::warn!(
                    "period {}: no breakpoint observations in {} bucket {bucket}",
                    xs.period,
                    self.config.first
                );
                continue;
            }

            let bucket_values: Vec<f64> = values
                .iter()
                .zip(&members)
                .map(|(x, m)| if *m { *x } else { f64::NAN })
                .collect();
            let bucket_eligible: Vec<bool> =
                eligible.iter().zip(&members).map(|(e, m)| *e && *m).collect();

            let within = self.second_sorter.assign(&bucket_values, &bucket_eligible)?;
            for (rank, (r, m)) in ranks.iter_mut().zip(within.into_iter().zip(&members)) {
                if *m {
                    *rank = r;
                }
            }
        }
        Ok(ranks)
    }

    /// Run the sort: assign, aggregate the grid, build spreads and summaries.
    ///
    /// # Errors
    /// Returns `PortfolioError::UnknownCharacteristic` for a missing
    /// characteristic and `PortfolioError::NoPeriods` if every period was skipped.
    pub fn run(&self, panel: &Panel) -> Result<BivariateResult, PortfolioError> {
        let (i1, i2) = self.indices(panel)?;
        let (n1, n2) = self.shape();

        let keys = (1..=n1 as u32).flat_map(|i| (1..=n2 as u32).map(move |j| PortfolioKey::Pair(i, j)));
        let mut builder = SeriesBuilder::new(keys);
        let mut first_assignments = Vec::new();
        let mut second_assignments = Vec::new();

        for xs in panel.cross_sections() {
            let Some((first, second)) = self.assign_cross_section(&xs, i1, i2)? else {
                continue;
            };

            let labels: Vec<Option<usize>> = first
                .ranks
                .iter()
                .zip(&second.ranks)
                .map(|(a, b)| a.zip(*b).map(|(a, b)| (a as usize - 1) * n2 + (b as usize - 1)))
                .collect();
            let returns = xs.forward_returns().to_vec();
            let weights = xs.weights().to_vec();
            builder.push(xs.period, &self.aggregator.aggregate(&returns, &weights, &labels, n1 * n2));

            first_assignments.push(first);
            second_assignments.push(second);
        }

        if first_assignments.is_empty() {
            return Err(PortfolioError::NoPeriods);
        }

        let grid = builder.finish();
        let cell = |i: usize, j: usize| &grid[(i - 1) * n2 + (j - 1)];

        let first_spreads: Vec<PortfolioReturns> = (1..=n2)
            .map(|j| cell(n1, j).difference(cell(1, j), PortfolioKey::FirstSpread(j as u32)))
            .collect();
        let second_spreads: Vec<PortfolioReturns> = (1..=n1)
            .map(|i| cell(i, n2).difference(cell(i, 1), PortfolioKey::SecondSpread(i as u32)))
            .collect();

        let first_averaged: Vec<PortfolioReturns> = (1..=n1)
            .map(|i| {
                let row: Vec<&PortfolioReturns> = (1..=n2).map(|j| cell(i, j)).collect();
                PortfolioReturns::average(&row, PortfolioKey::FirstAveraged(i as u32))
            })
            .collect();
        let second_averaged: Vec<PortfolioReturns> = (1..=n2)
            .map(|j| {
                let column: Vec<&PortfolioReturns> = (1..=n1).map(|i| cell(i, j)).collect();
                PortfolioReturns::average(&column, PortfolioKey::SecondAveraged(j as u32))
            })
            .collect();

        let first_averaged_spread = first_averaged[n1 - 1]
            .difference(&first_averaged[0], PortfolioKey::FirstAveragedSpread);
        let second_averaged_spread = second_averaged[n2 - 1]
            .difference(&second_averaged[0], PortfolioKey::SecondAveragedSpread);

        let se = &self.config.standard_error;
        let summaries: Vec<PortfolioSummary> = grid
            .iter()
            .chain(&first_spreads)
            .chain(&second_spreads)
            .chain(&first_averaged)
            .chain(&second_averaged)
            .chain([&first_averaged_spread, &second_averaged_spread])
            .map(|series| PortfolioSummary::from_series(series, se))
            .collect();

        log::info!(
            "sorted {} periods into {}x{} {:?} portfolios on {} and {}",
            first_assignments.len(),
            n1,
            n2,
            self.config.method,
            self.config.first,
            self.config.second
        );

        Ok(BivariateResult {
            first: self.config.first.clone(),
            second: self.config.second.clone(),
            method: self.config.method,
            n_first: n1,
            n_second: n2,
            first_assignments,
            second_assignments,
            grid,
            first_spreads,
            second_spreads,
            first_averaged,
            second_averaged,
            first_averaged_spread,
            second_averaged_spread,
            summaries,
        })
    }
}

impl BivariateResult {
    /// Series of cell `(i, j)`, 1-based.
    #[must_use]
    pub fn cell(&self, i: usize, j: usize) -> Option<&PortfolioReturns> {
        if i == 0 || j == 0 || i > self.n_first || j > self.n_second {
            return None;
        }
        self.grid.get((i - 1) * self.n_second + (j - 1))
    }

    /// Summary of a specific portfolio.
    #[must_use]
    pub fn summary(&self, key: PortfolioKey) -> Option<&PortfolioSummary> {
        self.summaries.iter().find(|s| s.key == key)
    }

    /// Every series in summary order.
    pub fn series(&self) -> impl Iterator<Item = &PortfolioReturns> {
        self.grid
            .iter()
            .chain(&self.first_spreads)
            .chain(&self.second_spreads)
            .chain(&self.first_averaged)
            .chain(&self.second_averaged)
            .chain([&self.first_averaged_spread, &self.second_averaged_spread])
    }

    /// Return series in long format.
    ///
    /// # Errors
    /// Returns `PolarsError` if the frame cannot be assembled.
    pub fn returns_frame(&self) -> PolarsResult<DataFrame> {
        returns_frame(self.series())
    }
}

impl ToFrame for BivariateResult {
    fn to_frame(&self) -> PolarsResult<DataFrame> {
        summary_frame(&self.summaries)
    }
}
