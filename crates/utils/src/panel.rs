//! Panel ingestion from long DataFrames.

use empirica_primitives::{Observation, Panel, Period, Symbol};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{FORWARD_RETURN, UtilsError};

/// Column mapping of a long (one row per asset and period) DataFrame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelColumns {
    /// Period column: `Date`, `Datetime` or integer.
    pub period: String,
    /// Asset identifier column.
    pub asset: String,
    /// Characteristic columns, in panel order.
    pub characteristics: Vec<String>,
    /// Forward return column.
    pub forward_return: String,
    /// Optional weight column (e.g. lagged market cap).
    pub weight: Option<String>,
    /// Optional boolean column marking breakpoint observations.
    pub breakpoint_flag: Option<String>,
}

impl Default for PanelColumns {
    fn default() -> Self {
        Self {
            period: "date".to_string(),
            asset: "symbol".to_string(),
            characteristics: Vec::new(),
            forward_return: FORWARD_RETURN.to_string(),
            weight: None,
            breakpoint_flag: None,
        }
    }
}

impl PanelColumns {
    /// Default column names with the given characteristics.
    #[must_use]
    pub fn new<S: Into<String>>(characteristics: impl IntoIterator<Item = S>) -> Self {
        Self {
            characteristics: characteristics.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn required(&self) -> impl Iterator<Item = &str> {
        [self.period.as_str(), self.asset.as_str(), self.forward_return.as_str()]
            .into_iter()
            .chain(self.characteristics.iter().map(String::as_str))
            .chain(self.weight.as_deref())
            .chain(self.breakpoint_flag.as_deref())
    }
}

/// Build a validated panel from a long DataFrame.
///
/// Null characteristics and returns become NaN; a null breakpoint flag
/// counts as not eligible. Rows with a null period or asset are dropped.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` for an absent column,
/// `UtilsError::InvalidParameter` for an unsupported period type and
/// `UtilsError::Panel` for duplicate (asset, period) rows.
pub fn panel_from_frame(df: &DataFrame, columns: &PanelColumns) -> Result<Panel, UtilsError> {
    let names = df.get_column_names();
    if let Some(missing) = columns.required().find(|c| !names.iter().any(|n| n.as_str() == *c)) {
        return Err(UtilsError::MissingColumn(missing.to_string()));
    }

    let periods = period_values(df.column(&columns.period)?)?;
    let assets_col = df.column(&columns.asset)?.cast(&DataType::String)?;
    let assets = assets_col.str()?;
    let returns = float_values(df.column(&columns.forward_return)?)?;
    let characteristics: Vec<Vec<f64>> = columns
        .characteristics
        .iter()
        .map(|c| float_values(df.column(c)?))
        .collect::<Result<_, _>>()?;
    let weights: Option<Vec<Option<f64>>> = match &columns.weight {
        Some(c) => Some(df.column(c)?.cast(&DataType::Float64)?.f64()?.into_iter().collect()),
        None => None,
    };
    let flags: Option<Vec<bool>> = match &columns.breakpoint_flag {
        Some(c) => Some(
            df.column(c)?.cast(&DataType::Boolean)?.bool()?.into_iter().map(|f| f == Some(true)).collect(),
        ),
        None => None,
    };

    let mut observations = Vec::with_capacity(df.height());
    let mut dropped = 0usize;
    for (row, (period, asset)) in periods.iter().zip(assets.into_iter()).enumerate() {
        let (Some(period), Some(asset)) = (period, asset) else {
            dropped += 1;
            continue;
        };

        let values = characteristics.iter().map(|c| c[row]).collect();
        let mut obs = Observation::new(Symbol::new(asset), Period::new(*period), values, returns[row]);
        if let Some(w) = weights.as_ref().and_then(|w| w[row]) {
            obs = obs.with_weight(w);
        }
        if let Some(flags) = &flags {
            obs = obs.with_breakpoint_eligible(flags[row]);
        }
        observations.push(obs);
    }

    if dropped > 0 {
        log::warn!("dropped {dropped} rows with a null {} or {}", columns.period, columns.asset);
    }

    let panel = Panel::new(columns.characteristics.clone(), observations)?;
    log::debug!("built panel with {} observations over {} periods", panel.len(), panel.periods().len());
    Ok(panel)
}

/// Period keys: days since the epoch for temporal columns, the value for integers.
fn period_values(column: &Column) -> Result<Vec<Option<i64>>, UtilsError> {
    match column.dtype() {
        DataType::Date | DataType::Datetime(_, _) => Ok(column
            .cast(&DataType::Date)?
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|d| d.map(i64::from))
            .collect()),
        dtype if dtype.is_integer() => {
            Ok(column.cast(&DataType::Int64)?.i64()?.into_iter().collect())
        }
        other => Err(UtilsError::InvalidParameter(format!(
            "period column {} has unsupported type {other}",
            column.name()
        ))),
    }
}

fn float_values(column: &Column) -> Result<Vec<f64>, UtilsError> {
    Ok(column.cast(&DataType::Float64)?.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    use super::*;

    fn frame() -> DataFrame {
        df! {
            "month" => &[Some(1), Some(1), Some(2), Some(2), None],
            "ticker" => &[Some("A"), Some("B"), Some("A"), Some("B"), Some("C")],
            "bm" => &[Some(0.5), None, Some(0.7), Some(1.1), Some(0.9)],
            "ret" => &[0.01, 0.02, 0.03, 0.04, 0.05],
            "mcap" => &[Some(10.0), Some(20.0), None, Some(40.0), Some(50.0)],
            "nyse" => &[true, false, true, true, false],
        }
        .unwrap()
    }

    fn columns() -> PanelColumns {
        PanelColumns {
            period: "month".to_string(),
            asset: "ticker".to_string(),
            forward_return: "ret".to_string(),
            weight: Some("mcap".to_string()),
            breakpoint_flag: Some("nyse".to_string()),
            ..PanelColumns::new(["bm"])
        }
    }

    #[test]
    fn builds_panel_from_integer_periods() {
        let panel = panel_from_frame(&frame(), &columns()).unwrap();

        assert_eq!(panel.len(), 4);
        assert_eq!(panel.periods(), vec![Period::new(1), Period::new(2)]);
        assert_eq!(panel.characteristic_names(), ["bm"]);

        let xs = panel.cross_section(Period::new(1)).unwrap();
        assert!(xs.characteristic(0)[1].is_nan());
        assert_relative_eq!(xs.weights()[1], 20.0);
        assert_eq!(xs.breakpoint_eligible(), vec![true, false]);

        let xs = panel.cross_section(Period::new(2)).unwrap();
        assert!(xs.weights()[0].is_nan());
        assert_relative_eq!(xs.forward_returns()[1], 0.04);
    }

    #[test]
    fn date_periods_count_days_since_epoch() {
        let dates = [NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()];
        let df = df! {
            "date" => &dates,
            "symbol" => &["A", "A"],
            "bm" => &[0.5, 0.6],
            "forward_return" => &[0.01, 0.02],
        }
        .unwrap();

        let panel = panel_from_frame(&df, &PanelColumns::new(["bm"])).unwrap();

        assert_eq!(panel.periods(), vec![Period::from_date(dates[0]), Period::from_date(dates[1])]);
        assert_eq!(panel.periods()[0], Period::new(19753));
    }

    #[test]
    fn missing_column_errors() {
        let err = panel_from_frame(&frame(), &PanelColumns::new(["bm"])).unwrap_err();
        assert!(matches!(err, UtilsError::MissingColumn(c) if c == "date"));
    }

    #[test]
    fn duplicate_rows_error() {
        let df = df! {
            "date" => &[1, 1],
            "symbol" => &["A", "A"],
            "forward_return" => &[0.01, 0.02],
        }
        .unwrap();

        let err = panel_from_frame(&df, &PanelColumns::default()).unwrap_err();
        assert!(matches!(err, UtilsError::Panel(_)));
    }

    #[test]
    fn string_periods_are_rejected() {
        let df = df! {
            "date" => &["2024-01", "2024-02"],
            "symbol" => &["A", "A"],
            "forward_return" => &[0.01, 0.02],
        }
        .unwrap();

        assert!(matches!(
            panel_from_frame(&df, &PanelColumns::default()),
            Err(UtilsError::InvalidParameter(_))
        ));
    }
}
