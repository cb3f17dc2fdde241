//! Cross-sectional statistics.

use ndarray::Array1;

/// Mean of the finite values.
#[must_use]
pub fn finite_mean(data: &[f64]) -> Option<f64> {
    let (sum, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(sum, n), x| (sum + x, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Weighted mean over pairs with a finite value and a finite, strictly
/// positive weight.
#[must_use]
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    let (num, den) = values
        .iter()
        .zip(weights)
        .filter(|(x, w)| x.is_finite() && w.is_finite() && **w > 0.0)
        .fold((0.0, 0.0), |(num, den), (x, w)| (num + x * w, den + w));
    (den > 0.0).then(|| num / den)
}

/// Cross-sectional centering transform.
///
/// Statistics are computed over finite values; non-finite entries pass
/// through unchanged.
#[derive(Debug, Clone)]
pub struct CenterXSection {
    /// Whether to also standardize (divide by std).
    pub standardize: bool,
}

impl CenterXSection {
    /// Create a new centering transform.
    #[must_use]
    pub const fn new(standardize: bool) -> Self {
        Self { standardize }
    }

    /// Apply centering to an array.
    #[must_use]
    pub fn apply(&self, data: &Array1<f64>) -> Array1<f64> {
        let Some(mean) = finite_mean(&data.to_vec()) else {
            return data.clone();
        };

        let centered = data.mapv(|x| x - mean);

        if self.standardize {
            let std = self.compute_std(&centered);
            if std > 0.0 { centered / std } else { centered }
        } else {
            centered
        }
    }

    fn compute_std(&self, centered: &Array1<f64>) -> f64 {
        let finite: Vec<f64> = centered.iter().copied().filter(|x| x.is_finite()).collect();
        let n = finite.len() as f64;
        if n <= 1.0 {
            return 0.0;
        }
        let variance: f64 = finite.iter().map(|x| x.powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    }
}

impl Default for CenterXSection {
    fn default() -> Self {
        Self::new(true)
    }
}
