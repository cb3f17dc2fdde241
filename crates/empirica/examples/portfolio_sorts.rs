//! Example: Univariate and Bivariate Portfolio Sorts
//!
//! This example walks through the portfolio sort workflow on a simulated
//! monthly panel:
//! 1. Build a long DataFrame of realized returns, book-to-market and size
//! 2. Turn realized returns into next-month forward returns
//! 3. Run equal- and value-weighted univariate sorts on book-to-market
//! 4. Run a dependent size x book-to-market sort

use empirica::{
    portfolio::{BivariateConfig, BivariateSort, SortMethod, UnivariateConfig, UnivariateSort, Weighting},
    primitives::PortfolioKey,
    traits::ToFrame,
    utils::{PanelColumns, forward_returns, panel_from_frame},
};
use polars::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

const N_ASSETS: usize = 300;
const N_MONTHS: i64 = 120;

/// Monthly return premium per unit of book-to-market.
const VALUE_PREMIUM: f64 = 0.004;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Portfolio Sorts on a Simulated Panel ===\n");

    // =========================================================================
    // SIMULATE DATA
    // =========================================================================

    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.06)?;
    let drift = Normal::new(0.0, 0.05)?;

    let mut bm_level: Vec<f64> =
        (0..N_ASSETS).map(|_| 1.0 + drift.sample(&mut rng) * 6.0).collect();
    let mut log_size: Vec<f64> = (0..N_ASSETS).map(|_| 6.0 + drift.sample(&mut rng) * 30.0).collect();

    let mut months = Vec::new();
    let mut symbols = Vec::new();
    let mut rets = Vec::new();
    let mut bms = Vec::new();
    let mut sizes = Vec::new();
    let mut mcaps = Vec::new();

    for month in 1..=N_MONTHS {
        for asset in 0..N_ASSETS {
            // Return realized this month, priced on last month's book-to-market.
            let ret = VALUE_PREMIUM * bm_level[asset] + noise.sample(&mut rng);
            bm_level[asset] += drift.sample(&mut rng) * 0.2;
            log_size[asset] += ret;

            months.push(month);
            symbols.push(format!("S{asset:03}"));
            rets.push(ret);
            bms.push(bm_level[asset]);
            sizes.push(log_size[asset]);
            mcaps.push(log_size[asset].exp());
        }
    }

    let df = df! {
        "month" => months,
        "symbol" => symbols,
        "ret" => rets,
        "bm" => bms,
        "size" => sizes,
        "mcap" => mcaps,
    }?;
    println!("Simulated {} rows for {N_ASSETS} assets over {N_MONTHS} months\n", df.height());

    // =========================================================================
    // BUILD PANEL
    // =========================================================================

    // Characteristics observed at the end of month t earn the month t+1 return.
    let df = forward_returns(df.lazy(), "ret", "month", "symbol", 1)?.collect()?;
    let columns = PanelColumns {
        period: "month".to_string(),
        weight: Some("mcap".to_string()),
        ..PanelColumns::new(["bm", "size"])
    };
    let panel = panel_from_frame(&df, &columns)?;
    println!("Panel: {} observations over {} periods\n", panel.len(), panel.periods().len());

    // =========================================================================
    // UNIVARIATE SORTS
    // =========================================================================

    for weighting in [Weighting::Equal, Weighting::Value] {
        let config = UnivariateConfig { weighting, ..UnivariateConfig::new("bm") };
        let result = UnivariateSort::with_config(config)?.run(&panel)?;

        println!("--- Quintiles on bm ({weighting:?} weighted) ---");
        println!("{}", result.to_frame()?);

        if let Some(hml) = result.summary(PortfolioKey::HighMinusLow) {
            println!(
                "HML: {:.4} per month (t = {:.2}, Newey-West lags {})\n",
                hml.mean_return,
                hml.t_stat,
                empirica::math::newey_west_lags(result.spread.observed().len())
            );
        }
    }

    // =========================================================================
    // BIVARIATE SORT
    // =========================================================================

    let config = BivariateConfig {
        method: SortMethod::Dependent,
        ..BivariateConfig::new("size", "bm")
    };
    let sort = BivariateSort::with_config(config)?;
    let (n_size, n_bm) = sort.shape();
    let result = sort.run(&panel)?;

    println!("--- Dependent {n_size}x{n_bm} sort: bm within size ---");
    for i in 1..=n_size as u32 {
        let row: Vec<String> = (1..=n_bm as u32)
            .map(|j| {
                result
                    .summary(PortfolioKey::Pair(i, j))
                    .map_or_else(|| "   n/a".to_string(), |s| format!("{:>7.4}", s.mean_return))
            })
            .collect();
        println!("size {i}: {}", row.join(" "));
    }

    if let Some(spread) = result.summary(PortfolioKey::SecondAveragedSpread) {
        println!(
            "\nbm spread averaged across size buckets: {:.4} (t = {:.2})",
            spread.mean_return, spread.t_stat
        );
    }

    Ok(())
}
