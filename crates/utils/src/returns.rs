//! Forward return construction.

use polars::prelude::*;

use crate::UtilsError;

/// Name of the column added by [`forward_returns`].
pub const FORWARD_RETURN: &str = "forward_return";

/// Attach the return earned over the next `horizon` periods per asset.
///
/// For `horizon = 1` this is the next row's return; longer horizons compound
/// `prod(1 + r_{t+k}) - 1` for `k = 1..=horizon`. Rows without a complete
/// window get null.
///
/// # Arguments
/// * `df` - Input LazyFrame with one row per (asset, period)
/// * `return_col` - Per-period return column
/// * `sort_col` - Column to sort by (typically the period)
/// * `over_col` - Column to partition by (typically the asset)
/// * `horizon` - Number of periods ahead
///
/// # Errors
/// Returns `UtilsError::InvalidParameter` if `horizon` is zero.
pub fn forward_returns(
    df: LazyFrame,
    return_col: &str,
    sort_col: &str,
    over_col: &str,
    horizon: usize,
) -> Result<LazyFrame, UtilsError> {
    if horizon == 0 {
        return Err(UtilsError::InvalidParameter("horizon must be at least 1".to_string()));
    }

    let sort_options = SortMultipleOptions::new().with_maintain_order(true);
    let lf = df.sort([sort_col], sort_options);

    let lead = |k: usize| {
        col(return_col).cast(DataType::Float64).shift(lit(-(k as i64))).over([col(over_col)])
    };

    let forward = if horizon == 1 {
        lead(1)
    } else {
        let growth =
            (2..=horizon).fold(lead(1) + lit(1.0), |acc, k| acc * (lead(k) + lit(1.0)));
        growth - lit(1.0)
    };

    Ok(lf.with_column(forward.alias(FORWARD_RETURN)))
}
