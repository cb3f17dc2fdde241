//! Weighted least squares for cross-sectional regressions.

use ndarray::{Array1, Array2, Axis, s};

use crate::MathError;

/// Result of a least squares regression.
#[derive(Debug, Clone)]
pub struct LeastSquaresResult {
    /// Estimated coefficients.
    pub coefficients: Array1<f64>,
    /// Residuals on the original (unweighted) scale.
    pub residuals: Array1<f64>,
    /// R-squared (weighted when weights are supplied).
    pub r_squared: f64,
    /// Adjusted R-squared, NaN when there are no residual degrees of freedom.
    pub adj_r_squared: f64,
}

/// Ordinary or weighted least squares.
///
/// Minimizes `sum(w_i * (y_i - X_i * beta)^2)` through the normal equations,
/// with `w_i = 1` when no weights are given. Negative weights count as zero.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p), including any intercept column
/// * `weights` - Optional weight vector (n,)
///
/// # Errors
/// Returns `MathError::DimensionMismatch` for inconsistent shapes,
/// `MathError::InsufficientData` when n < p and `MathError::LinearAlgebra`
/// when `X'WX` is singular.
pub fn least_squares(
    y: &Array1<f64>,
    x: &Array2<f64>,
    weights: Option<&Array1<f64>>,
) -> Result<LeastSquaresResult, MathError> {
    let (n, p) = x.dim();
    if y.len() != n {
        return Err(MathError::DimensionMismatch { expected: y.len(), actual: n });
    }
    let w = match weights {
        Some(w) if w.len() != n => {
            return Err(MathError::DimensionMismatch { expected: n, actual: w.len() });
        }
        Some(w) => w.mapv(|v| v.max(0.0)),
        None => Array1::ones(n),
    };
    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }
    if n < p {
        return Err(MathError::InsufficientData { required: p, actual: n });
    }

    let xw = x * &w.view().insert_axis(Axis(1));
    let gram = xw.t().dot(x);
    let moment = xw.t().dot(y);
    let coefficients = cholesky_solve(&gram, &moment)?;

    let residuals = y - &x.dot(&coefficients);
    let total_weight = w.sum();
    let y_bar = if total_weight > 0.0 { w.dot(y) / total_weight } else { 0.0 };
    let ss_tot = w.dot(&y.mapv(|v| (v - y_bar).powi(2)));
    let ss_res = w.dot(&residuals.mapv(|r| r * r));
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
    let adj_r_squared = if n > p {
        1.0 - (1.0 - r_squared) * (n - 1) as f64 / (n - p) as f64
    } else {
        f64::NAN
    };

    Ok(LeastSquaresResult { coefficients, residuals, r_squared, adj_r_squared })
}

/// Solve the symmetric positive definite system `A x = b` with `A = L L'`.
///
/// The system is first equilibrated to a unit diagonal, `D A D` with
/// `D = diag(1 / sqrt(a_jj))`, so regressors on any scale share one
/// tolerance. A scaled pivot below `1e-12` marks the system as singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let p = a.nrows();
    let scale = a.diag().mapv(|d| if d > 0.0 { 1.0 / d.sqrt() } else { f64::NAN });
    if let Some(j) = scale.iter().position(|d| !d.is_finite()) {
        return Err(MathError::LinearAlgebra(format!(
            "normal equations are singular at column {j}"
        )));
    }
    let a = a * &scale.view().insert_axis(Axis(1)) * &scale.view().insert_axis(Axis(0));
    let b = b * &scale;
    let tol = 1e-12;

    let mut l = Array2::<f64>::zeros((p, p));
    for j in 0..p {
        let head = l.slice(s![j, ..j]);
        let pivot = a[[j, j]] - head.dot(&head);
        if pivot.is_nan() || pivot <= tol {
            return Err(MathError::LinearAlgebra(format!(
                "normal equations are singular at column {j}"
            )));
        }
        let diag = pivot.sqrt();
        l[[j, j]] = diag;
        for i in (j + 1)..p {
            let off = (a[[i, j]] - l.slice(s![i, ..j]).dot(&l.slice(s![j, ..j]))) / diag;
            l[[i, j]] = off;
        }
    }

    let mut z = Array1::<f64>::zeros(p);
    for i in 0..p {
        let value = (b[i] - l.slice(s![i, ..i]).dot(&z.slice(s![..i]))) / l[[i, i]];
        z[i] = value;
    }

    let mut solution = Array1::<f64>::zeros(p);
    for i in (0..p).rev() {
        let tail = l.slice(s![i + 1.., i]).dot(&solution.slice(s![i + 1..]));
        let value = (z[i] - tail) / l[[i, i]];
        solution[i] = value;
    }

    Ok(solution * &scale)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    /// Intercept plus x = 1..=5.
    fn line_design() -> Array2<f64> {
        let mut x = Array2::ones((5, 2));
        x.column_mut(1).assign(&array![1.0, 2.0, 3.0, 4.0, 5.0]);
        x
    }

    #[test]
    fn exact_line_is_recovered() {
        let y = array![2.5, 4.5, 6.5, 8.5, 10.5];
        let fit = least_squares(&y, &line_design(), None).unwrap();

        assert_relative_eq!(fit.coefficients[0], 0.5, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-10));
    }

    #[test]
    fn weights_discount_observations() {
        let y = array![1.0, 2.0, 3.0, 4.0, 100.0];
        let w = array![1.0, 1.0, 1.0, 1.0, 0.0];
        let fit = least_squares(&y, &line_design(), Some(&w)).unwrap();

        assert_relative_eq!(fit.coefficients[1], 1.0, epsilon = 1e-10);
        // The zero-weight point keeps its residual.
        assert_relative_eq!(fit.residuals[4], 95.0, epsilon = 1e-8);
    }

    #[test]
    fn three_regressors() {
        let x = Array2::from_shape_vec(
            (6, 3),
            vec![
                1.0, 0.0, 1.0, //
                1.0, 1.0, 0.0, //
                1.0, 2.0, 1.0, //
                1.0, 3.0, 0.0, //
                1.0, 4.0, 1.0, //
                1.0, 5.0, 0.0,
            ],
        )
        .unwrap();
        let y = x.dot(&array![0.01, -0.02, 0.03]);
        let fit = least_squares(&y, &x, None).unwrap();

        assert_relative_eq!(fit.coefficients[0], 0.01, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], -0.02, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[2], 0.03, epsilon = 1e-10);
    }

    #[test]
    fn adjusted_r_squared() {
        let y = array![1.0, 3.0, 2.0, 5.0, 4.0];
        let fit = least_squares(&y, &line_design(), None).unwrap();

        // Slope 0.8 and r2 0.64.
        assert_relative_eq!(fit.r_squared, 0.64, epsilon = 1e-10);
        assert_relative_eq!(fit.adj_r_squared, 1.0 - 0.36 * 4.0 / 3.0, epsilon = 1e-10);
    }

    #[rstest]
    #[case(1e6)]
    #[case(1e9)]
    fn large_scale_regressor(#[case] scale: f64) {
        let n = 50;
        let mut x = Array2::ones((n, 2));
        let cap: Array1<f64> = (0..n).map(|i| scale * (1.0 + 0.2 * i as f64)).collect();
        x.column_mut(1).assign(&cap);
        let wiggle: Array1<f64> = (0..n).map(|i| if i % 2 == 0 { 1e-3 } else { -1e-3 }).collect();
        let y = cap.mapv(|c| 0.01 + 2e-3 * c / scale) + &wiggle;

        let fit = least_squares(&y, &x, None).unwrap();

        assert_relative_eq!(fit.coefficients[0], 0.01, epsilon = 1e-3);
        assert_relative_eq!(fit.coefficients[1] * scale, 2e-3, epsilon = 1e-4);
    }

    #[test]
    fn collinear_columns_are_singular() {
        let y = array![1.0, 2.0, 3.0];
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]).unwrap();
        assert!(matches!(least_squares(&y, &x, None), Err(MathError::LinearAlgebra(_))));
    }

    #[test]
    fn more_parameters_than_rows() {
        let y = array![1.0];
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            least_squares(&y, &x, None),
            Err(MathError::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn shape_checks() {
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            least_squares(&y, &line_design(), None),
            Err(MathError::DimensionMismatch { expected: 3, actual: 5 })
        ));

        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let w = array![1.0, 1.0];
        assert!(matches!(
            least_squares(&y, &line_design(), Some(&w)),
            Err(MathError::DimensionMismatch { expected: 5, actual: 2 })
        ));
    }
}
