//! Winsorization operations for outlier handling.

use ndarray::Array1;

use crate::{MathError, percentile};

/// Winsorize a 1D array to symmetric percentiles.
///
/// Values below the lower percentile are clipped to that value.
/// Values above the upper percentile are clipped to that value.
/// Thresholds are linearly interpolated, as in [`percentile`].
///
/// # Arguments
/// * `data` - Input array
/// * `fraction` - Tail fraction (e.g., 0.01 for 1st/99th percentiles)
///
/// # Returns
/// Winsorized array. Non-finite values are left untouched.
///
/// # Errors
/// Returns `MathError::InvalidPercentile` if fraction is not in (0, 0.5).
pub fn winsorize(data: &Array1<f64>, fraction: f64) -> Result<Array1<f64>, MathError> {
    if fraction <= 0.0 || fraction >= 0.5 {
        return Err(MathError::InvalidPercentile(fraction));
    }

    let mut valid_values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if valid_values.is_empty() {
        return Ok(data.clone());
    }
    valid_values.sort_by(f64::total_cmp);

    let lower_bound = percentile(&valid_values, 100.0 * fraction)?;
    let upper_bound = percentile(&valid_values, 100.0 * (1.0 - fraction))?;

    Ok(data.mapv(|x| if x.is_finite() { x.clamp(lower_bound, upper_bound) } else { x }))
}
