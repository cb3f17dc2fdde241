//! Characteristic filling utilities.

use polars::prelude::*;

/// Forward fill characteristic columns per asset.
///
/// Casts to float, turns NaN/Inf into null, then forward fills within each
/// partition in `sort_col` order.
///
/// # Arguments
/// * `df` - Input LazyFrame
/// * `features` - Column names to fill
/// * `sort_col` - Column to sort by (typically the period)
/// * `over_col` - Column to partition by (typically the asset)
///
/// # Returns
/// LazyFrame with filled characteristics.
pub fn fill_features(
    df: LazyFrame,
    features: &[&str],
    sort_col: &str,
    over_col: &str,
) -> LazyFrame {
    let sort_options = SortMultipleOptions::new().with_maintain_order(true);
    let mut lf = df.sort([sort_col], sort_options);

    for &feat in features {
        let value = col(feat).cast(DataType::Float64);
        lf = lf.with_column(
            when(value.clone().is_finite())
                .then(value)
                .otherwise(lit(NULL).cast(DataType::Float64))
                .forward_fill(None)
                .over([col(over_col)])
                .alias(feat),
        );
    }

    lf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, asset: &str, column: &str) -> Vec<Option<f64>> {
        let rows = df
            .clone()
            .lazy()
            .filter(col("asset").eq(lit(asset)))
            .sort(["period"], SortMultipleOptions::default())
            .collect()
            .unwrap();
        rows.column(column).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn fill_within_asset() {
        let df = df! {
            "period" => &[1, 2, 3, 1, 2, 3],
            "asset" => &["A", "A", "A", "B", "B", "B"],
            "bm" => &[Some(1.0), None, Some(3.0), None, Some(10.0), None],
        }
        .unwrap()
        .lazy();

        let result = fill_features(df, &["bm"], "period", "asset").collect().unwrap();

        assert_eq!(values(&result, "A", "bm"), vec![Some(1.0), Some(1.0), Some(3.0)]);
        // Leading gaps stay empty; fills never cross assets.
        assert_eq!(values(&result, "B", "bm"), vec![None, Some(10.0), Some(10.0)]);
    }

    #[test]
    fn non_finite_values_are_filled() {
        let df = df! {
            "period" => &[1, 2, 3],
            "asset" => &["A", "A", "A"],
            "size" => &[2.0, f64::NAN, f64::INFINITY],
            "mom" => &[Some(1), None, Some(3)],
        }
        .unwrap()
        .lazy();

        let result = fill_features(df, &["size", "mom"], "period", "asset").collect().unwrap();

        assert_eq!(values(&result, "A", "size"), vec![Some(2.0), Some(2.0), Some(2.0)]);
        assert_eq!(values(&result, "A", "mom"), vec![Some(1.0), Some(1.0), Some(3.0)]);
    }
}
