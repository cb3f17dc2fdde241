//! Observations, panels and per-period cross-sections.

use std::{collections::BTreeMap, ops::Range};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{PanelError, Period, Symbol};

/// One asset in one period.
///
/// Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Asset identifier.
    pub asset: Symbol,
    /// Period the characteristics are measured in.
    pub period: Period,
    /// Characteristic values, ordered as the panel's characteristic names.
    pub characteristics: Vec<f64>,
    /// Return realized over the following period.
    pub forward_return: f64,
    /// Optional weight (typically lagged market capitalization).
    pub weight: Option<f64>,
    /// Whether the observation participates in breakpoint computation.
    pub breakpoint_eligible: bool,
}

impl Observation {
    /// Create an unweighted, breakpoint-eligible observation.
    #[must_use]
    pub const fn new(
        asset: Symbol,
        period: Period,
        characteristics: Vec<f64>,
        forward_return: f64,
    ) -> Self {
        Self { asset, period, characteristics, forward_return, weight: None, breakpoint_eligible: true }
    }

    /// Attach a weight.
    #[must_use]
    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set breakpoint eligibility.
    #[must_use]
    pub const fn with_breakpoint_eligible(mut self, eligible: bool) -> Self {
        self.breakpoint_eligible = eligible;
        self
    }

    /// Finite characteristic value at `index`.
    #[must_use]
    pub fn characteristic(&self, index: usize) -> Option<f64> {
        self.characteristics.get(index).copied().filter(|x| x.is_finite())
    }
}

/// Validated collection of observations.
///
/// Holds at most one observation per (asset, period), stored ordered by
/// period and then asset.
#[derive(Debug, Clone)]
pub struct Panel {
    characteristic_names: Vec<String>,
    observations: Vec<Observation>,
    index: BTreeMap<Period, Range<usize>>,
}

impl Panel {
    /// Build a panel.
    ///
    /// # Errors
    /// Returns `PanelError` on a repeated (asset, period) pair or a
    /// characteristic vector of the wrong length.
    pub fn new(
        characteristic_names: Vec<String>,
        mut observations: Vec<Observation>,
    ) -> Result<Self, PanelError> {
        let expected = characteristic_names.len();
        if let Some(obs) = observations.iter().find(|o| o.characteristics.len() != expected) {
            return Err(PanelError::CharacteristicCount {
                asset: obs.asset.clone(),
                expected,
                actual: obs.characteristics.len(),
            });
        }

        observations.sort_by(|a, b| a.period.cmp(&b.period).then_with(|| a.asset.cmp(&b.asset)));

        if let Some(pair) =
            observations.windows(2).find(|w| w[0].period == w[1].period && w[0].asset == w[1].asset)
        {
            return Err(PanelError::DuplicateObservation {
                asset: pair[1].asset.clone(),
                period: pair[1].period,
            });
        }

        let mut index = BTreeMap::new();
        let mut start = 0;
        for i in 1..=observations.len() {
            if i == observations.len() || observations[i].period != observations[start].period {
                index.insert(observations[start].period, start..i);
                start = i;
            }
        }

        Ok(Self { characteristic_names, observations, index })
    }

    /// Characteristic names.
    #[must_use]
    pub fn characteristic_names(&self) -> &[String] {
        &self.characteristic_names
    }

    /// Position of a characteristic by name.
    #[must_use]
    pub fn characteristic_index(&self, name: &str) -> Option<usize> {
        self.characteristic_names.iter().position(|n| n == name)
    }

    /// All observations, ordered by (period, asset).
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct periods in ascending order.
    #[must_use]
    pub fn periods(&self) -> Vec<Period> {
        self.index.keys().copied().collect()
    }

    /// Cross-section for a single period.
    #[must_use]
    pub fn cross_section(&self, period: Period) -> Option<CrossSection<'_>> {
        self.index
            .get(&period)
            .map(|range| CrossSection { period, observations: &self.observations[range.clone()] })
    }

    /// Cross-sections in ascending period order.
    pub fn cross_sections(&self) -> impl Iterator<Item = CrossSection<'_>> + '_ {
        self.index.iter().map(|(&period, range)| CrossSection {
            period,
            observations: &self.observations[range.clone()],
        })
    }
}

/// Borrowed view of the observations of one period.
#[derive(Debug, Clone, Copy)]
pub struct CrossSection<'a> {
    /// Period of the cross-section.
    pub period: Period,
    /// Observations, ordered by asset.
    pub observations: &'a [Observation],
}

impl CrossSection<'_> {
    /// Number of assets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Asset symbols.
    #[must_use]
    pub fn assets(&self) -> Vec<Symbol> {
        self.observations.iter().map(|o| o.asset.clone()).collect()
    }

    /// Characteristic values (NaN where missing).
    #[must_use]
    pub fn characteristic(&self, index: usize) -> Array1<f64> {
        self.observations.iter().map(|o| o.characteristic(index).unwrap_or(f64::NAN)).collect()
    }

    /// Forward returns.
    #[must_use]
    pub fn forward_returns(&self) -> Array1<f64> {
        self.observations.iter().map(|o| o.forward_return).collect()
    }

    /// Weights (NaN where absent).
    #[must_use]
    pub fn weights(&self) -> Array1<f64> {
        self.observations.iter().map(|o| o.weight.unwrap_or(f64::NAN)).collect()
    }

    /// Breakpoint eligibility flags.
    #[must_use]
    pub fn breakpoint_eligible(&self) -> Vec<bool> {
        self.observations.iter().map(|o| o.breakpoint_eligible).collect()
    }
}
