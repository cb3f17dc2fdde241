//! Portfolio sort and Fama-MacBeth CLI tool.
//!
//! Reads a long CSV panel (one row per asset and period) and prints the
//! summary table of the requested analysis.
//!
//! Usage: `cargo run --features cli --bin analyze -- univariate panel.csv --characteristic bm`
//! Example: `cargo run --features cli --bin analyze -- run --config sort.json`

use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use empirica::{
    math::StandardError,
    pipeline::{Analysis, ReturnSource, RunConfig},
    portfolio::{BivariateConfig, BreakpointSpec, SortMethod, UnivariateConfig, Weighting},
    regression::FamaMacBethConfig,
    utils::PanelColumns,
};

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "Portfolio sorts and Fama-MacBeth regressions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort on one characteristic
    Univariate {
        #[command(flatten)]
        data: DataArgs,

        /// Sorting characteristic
        #[arg(long)]
        characteristic: String,

        /// Number of equal-frequency buckets
        #[arg(long, default_value = "5")]
        buckets: usize,

        /// Explicit interior percentiles, e.g. 30,70
        #[arg(long, value_delimiter = ',')]
        percentiles: Vec<f64>,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Sort on two characteristics
    Bivariate {
        #[command(flatten)]
        data: DataArgs,

        /// First (control) characteristic
        #[arg(long)]
        first: String,

        /// Second characteristic
        #[arg(long)]
        second: String,

        /// Buckets on the first characteristic
        #[arg(long, default_value = "5")]
        first_buckets: usize,

        /// Buckets on the second characteristic
        #[arg(long, default_value = "5")]
        second_buckets: usize,

        /// Sort the second characteristic within first buckets
        #[arg(long)]
        dependent: bool,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Fama-MacBeth cross-sectional regressions
    FamaMacbeth {
        #[command(flatten)]
        data: DataArgs,

        /// Regressors, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        regressors: Vec<String>,

        /// Omit the intercept
        #[arg(long)]
        no_intercept: bool,

        /// Weighted least squares with the weight column
        #[arg(long)]
        weighted: bool,

        /// Winsorize regressors at this fraction per tail
        #[arg(long)]
        winsorize: Option<f64>,

        /// Standardize regressors per period
        #[arg(long)]
        standardize: bool,

        #[command(flatten)]
        inference: InferenceArgs,
    },

    /// Run from a JSON configuration file
    Run {
        /// Configuration file
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Input CSV file
    input: PathBuf,

    /// Period column (date or integer)
    #[arg(long, default_value = "date")]
    period: String,

    /// Asset identifier column
    #[arg(long, default_value = "symbol")]
    asset: String,

    /// Forward return column
    #[arg(long, default_value = "forward_return")]
    forward_return: String,

    /// Build forward returns from this per-period return column
    #[arg(long)]
    returns: Option<String>,

    /// Periods ahead for built forward returns
    #[arg(long, default_value = "1")]
    horizon: usize,

    /// Weight column (e.g. lagged market cap)
    #[arg(long)]
    weight: Option<String>,

    /// Boolean column marking breakpoint observations
    #[arg(long)]
    breakpoint_flag: Option<String>,

    /// Forward fill characteristics per asset
    #[arg(long)]
    fill: bool,

    /// Output prefix for CSV files
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SortArgs {
    /// Value-weight portfolio returns
    #[arg(long)]
    value_weighted: bool,

    /// Minimum eligible observations per period
    #[arg(long)]
    min_observations: Option<usize>,

    #[command(flatten)]
    inference: InferenceArgs,
}

#[derive(Args)]
struct InferenceArgs {
    /// Newey-West lags (automatic when omitted)
    #[arg(long, conflicts_with = "plain")]
    lags: Option<usize>,

    /// Plain standard errors instead of Newey-West
    #[arg(long)]
    plain: bool,
}

impl InferenceArgs {
    const fn standard_error(&self) -> StandardError {
        if self.plain { StandardError::Plain } else { StandardError::NeweyWest { lags: self.lags } }
    }
}

impl SortArgs {
    const fn weighting(&self) -> Weighting {
        if self.value_weighted { Weighting::Value } else { Weighting::Equal }
    }
}

impl DataArgs {
    fn into_config(self, analysis: Analysis) -> RunConfig {
        RunConfig {
            input: self.input,
            columns: PanelColumns {
                period: self.period,
                asset: self.asset,
                characteristics: analysis.characteristics(),
                forward_return: self.forward_return,
                weight: self.weight,
                breakpoint_flag: self.breakpoint_flag,
            },
            returns: self.returns.map(|column| ReturnSource { column, horizon: self.horizon }),
            fill: self.fill,
            analysis,
            output: self.output,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Univariate { data, characteristic, buckets, percentiles, sort } => {
            let breakpoints = if percentiles.is_empty() {
                BreakpointSpec::Equal(buckets)
            } else {
                BreakpointSpec::Percentiles(percentiles)
            };
            let analysis = Analysis::Univariate(UnivariateConfig {
                breakpoints,
                weighting: sort.weighting(),
                min_observations: sort.min_observations,
                standard_error: sort.inference.standard_error(),
                ..UnivariateConfig::new(characteristic)
            });
            data.into_config(analysis)
        }
        Commands::Bivariate { data, first, second, first_buckets, second_buckets, dependent, sort } => {
            let analysis = Analysis::Bivariate(BivariateConfig {
                first_breakpoints: BreakpointSpec::Equal(first_buckets),
                second_breakpoints: BreakpointSpec::Equal(second_buckets),
                method: if dependent { SortMethod::Dependent } else { SortMethod::Independent },
                weighting: sort.weighting(),
                min_observations: sort.min_observations,
                standard_error: sort.inference.standard_error(),
                ..BivariateConfig::new(first, second)
            });
            data.into_config(analysis)
        }
        Commands::FamaMacbeth {
            data,
            regressors,
            no_intercept,
            weighted,
            winsorize,
            standardize,
            inference,
        } => {
            let analysis = Analysis::FamaMacbeth(FamaMacBethConfig {
                intercept: !no_intercept,
                weighted,
                winsorize,
                standardize,
                standard_error: inference.standard_error(),
                ..FamaMacBethConfig::new(regressors)
            });
            data.into_config(analysis)
        }
        Commands::Run { config } => RunConfig::from_json_file(&config)?,
    };

    let report = empirica::pipeline::run(&config)?;

    println!("\n{}", report.summary);
    if config.output.is_none() {
        println!("\nPer-period series ({} rows); pass --output to save them.", report.series.height());
    }

    Ok(())
}
