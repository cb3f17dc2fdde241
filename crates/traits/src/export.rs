//! DataFrame export.

use empirica_primitives::RegressionResult;
use polars::prelude::*;

/// Conversion of a result into a polars `DataFrame`.
pub trait ToFrame {
    /// Build the frame.
    ///
    /// # Errors
    /// Returns `PolarsError` if the columns cannot be assembled.
    fn to_frame(&self) -> PolarsResult<DataFrame>;
}

/// Coefficient table: `term | coefficient | std_error | t_stat | p_value`.
impl ToFrame for RegressionResult {
    fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new("term".into(), self.terms.clone()),
            Column::new("coefficient".into(), self.mean_coefficients.to_vec()),
            Column::new("std_error".into(), self.standard_errors.to_vec()),
            Column::new("t_stat".into(), self.t_stats.to_vec()),
            Column::new("p_value".into(), self.p_values.to_vec()),
        ])
    }
}
