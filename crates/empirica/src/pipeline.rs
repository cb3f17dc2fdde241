//! End-to-end analysis of a CSV panel, as run by the `analyze` binary.
//!
//! A [`RunConfig`] names the input file, its columns, optional data
//! preparation (forward returns, forward fill) and one [`Analysis`]. It is
//! plain serde, so the binary accepts it as JSON:
//!
//! ```json
//! {
//!   "input": "panel.csv",
//!   "columns": { "period": "date", "asset": "permno", "weight": "lag_mcap" },
//!   "returns": { "column": "ret", "horizon": 1 },
//!   "analysis": { "kind": "univariate", "characteristic": "bm", "weighting": "value" },
//!   "output": "out/bm"
//! }
//! ```

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    portfolio::{BivariateConfig, BivariateSort, PortfolioError, UnivariateConfig, UnivariateSort},
    primitives::Panel,
    regression::{FamaMacBeth, FamaMacBethConfig, RegressionError, period_frame},
    traits::ToFrame,
    utils::{
        FORWARD_RETURN, PanelColumns, UtilsError, fill_features, forward_returns, panel_from_frame,
    },
};

/// Errors that can occur while running a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),

    /// Data preparation error.
    #[error(transparent)]
    Utils(#[from] UtilsError),

    /// Portfolio sort error.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Regression error.
    #[error(transparent)]
    Regression(#[from] RegressionError),
}

/// The analysis to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    /// Univariate portfolio sort.
    Univariate(UnivariateConfig),
    /// Bivariate portfolio sort.
    Bivariate(BivariateConfig),
    /// Fama-MacBeth regression.
    FamaMacbeth(FamaMacBethConfig),
}

impl Analysis {
    /// Characteristics read by the analysis.
    #[must_use]
    pub fn characteristics(&self) -> Vec<String> {
        match self {
            Self::Univariate(c) => vec![c.characteristic.clone()],
            Self::Bivariate(c) => vec![c.first.clone(), c.second.clone()],
            Self::FamaMacbeth(c) => c.regressors.clone(),
        }
    }
}

/// Realized return column to turn into forward returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSource {
    /// Per-period return column.
    pub column: String,
    /// Number of periods ahead.
    #[serde(default = "default_horizon")]
    pub horizon: usize,
}

const fn default_horizon() -> usize {
    1
}

/// Full description of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// CSV file with one row per asset and period.
    pub input: PathBuf,
    /// Column mapping; characteristics default to those of the analysis.
    #[serde(default)]
    pub columns: PanelColumns,
    /// Build forward returns from a realized return column.
    #[serde(default)]
    pub returns: Option<ReturnSource>,
    /// Forward fill characteristics per asset.
    #[serde(default)]
    pub fill: bool,
    /// What to compute.
    pub analysis: Analysis,
    /// Output prefix; `<prefix>_summary.csv` and `<prefix>_series.csv` are written.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl RunConfig {
    /// Read a JSON configuration file.
    ///
    /// # Errors
    /// Returns `PipelineError` if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Column mapping with the characteristics filled in.
    #[must_use]
    pub fn panel_columns(&self) -> PanelColumns {
        let mut columns = self.columns.clone();
        if columns.characteristics.is_empty() {
            columns.characteristics = self.analysis.characteristics();
        }
        if self.returns.is_some() {
            columns.forward_return = FORWARD_RETURN.to_string();
        }
        columns
    }
}

/// Tables produced by an analysis.
#[derive(Debug, Clone)]
pub struct Report {
    /// Portfolio summaries or regression coefficients.
    pub summary: DataFrame,
    /// Portfolio returns or per-period coefficients, in long format.
    pub series: DataFrame,
}

impl Report {
    /// Write both tables as CSV next to `prefix`.
    ///
    /// # Errors
    /// Returns `PipelineError` if a file cannot be written.
    pub fn write_csv(&mut self, prefix: &Path) -> Result<(), PipelineError> {
        let stem = prefix.file_name().and_then(|s| s.to_str()).unwrap_or("empirica");
        for (suffix, df) in [("summary", &mut self.summary), ("series", &mut self.series)] {
            let path = prefix.with_file_name(format!("{stem}_{suffix}.csv"));
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
            log::info!("wrote {}", path.display());
        }
        Ok(())
    }
}

/// Read a CSV file, parsing date columns.
///
/// # Errors
/// Returns `PipelineError` if the file cannot be read.
pub fn read_csv(path: &Path) -> Result<DataFrame, PipelineError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Prepare a raw frame and build the panel.
///
/// # Errors
/// Returns `PipelineError` if preparation fails or the panel is invalid.
pub fn prepare(df: DataFrame, config: &RunConfig) -> Result<Panel, PipelineError> {
    let columns = config.panel_columns();
    let mut lf = df.lazy();

    if let Some(source) = &config.returns {
        lf = forward_returns(lf, &source.column, &columns.period, &columns.asset, source.horizon)?;
    }
    if config.fill {
        let names: Vec<&str> = columns.characteristics.iter().map(String::as_str).collect();
        lf = fill_features(lf, &names, &columns.period, &columns.asset);
    }

    Ok(panel_from_frame(&lf.collect()?, &columns)?)
}

/// Run an analysis on a panel.
///
/// # Errors
/// Returns `PipelineError` if the analysis fails.
pub fn execute(analysis: &Analysis, panel: &Panel) -> Result<Report, PipelineError> {
    match analysis {
        Analysis::Univariate(config) => {
            let result = UnivariateSort::with_config(config.clone())?.run(panel)?;
            Ok(Report { summary: result.to_frame()?, series: result.returns_frame()? })
        }
        Analysis::Bivariate(config) => {
            let result = BivariateSort::with_config(config.clone())?.run(panel)?;
            Ok(Report { summary: result.to_frame()?, series: result.returns_frame()? })
        }
        Analysis::FamaMacbeth(config) => {
            let result = FamaMacBeth::with_config(config.clone())?.fit(panel)?;
            Ok(Report { summary: result.to_frame()?, series: period_frame(&result)? })
        }
    }
}

/// Read, prepare, analyze and optionally write the results.
///
/// # Errors
/// Returns `PipelineError` from any stage.
pub fn run(config: &RunConfig) -> Result<Report, PipelineError> {
    let df = read_csv(&config.input)?;
    log::info!("read {} rows from {}", df.height(), config.input.display());

    let panel = prepare(df, config)?;
    log::info!("panel has {} observations over {} periods", panel.len(), panel.periods().len());

    let mut report = execute(&config.analysis, &panel)?;
    if let Some(prefix) = &config.output {
        report.write_csv(prefix)?;
    }
    Ok(report)
}
