//! Linear least squares through Householder QR.
//!
//! Used by the exponential fitting of tabulated kernels: the linear
//! prediction system and the amplitude system are both tall and real.

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors of the least-squares solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LeastSquaresError {
    #[error("Least squares needs at least as many rows as columns: {rows} rows, {cols} columns")]
    Underdetermined { rows: usize, cols: usize },
    #[error("Right-hand side has {got} entries, matrix has {expected} rows")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Matrix is rank deficient (column {column}, |R_kk| = {diagonal:e})")]
    RankDeficient { column: usize, diagonal: f64 },
    #[error("Matrix or right-hand side contains non-finite values")]
    NonFinite,
}

/// Relative threshold on the diagonal of R below which the system is
/// considered rank deficient.
pub const RANK_TOLERANCE: f64 = 1e-13;

/// Minimise ||A x - b||₂ for a tall matrix A (rows ≥ columns)
pub fn least_squares(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, LeastSquaresError> {
    let (m, n) = a.dim();
    if m < n {
        return Err(LeastSquaresError::Underdetermined { rows: m, cols: n });
    }
    if b.len() != m {
        return Err(LeastSquaresError::DimensionMismatch {
            expected: m,
            got: b.len(),
        });
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(LeastSquaresError::NonFinite);
    }

    let mut r = a.clone();
    let mut qtb = b.clone();
    let scale = r.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    for k in 0..n {
        let norm = (k..m).map(|i| r[[i, k]] * r[[i, k]]).sum::<f64>().sqrt();
        if norm <= RANK_TOLERANCE * scale.max(f64::MIN_POSITIVE) {
            return Err(LeastSquaresError::RankDeficient {
                column: k,
                diagonal: norm,
            });
        }

        // Householder vector v = x + sign(x0)|x| e0, stored in column k below the diagonal
        let alpha = if r[[k, k]] >= 0.0 { -norm } else { norm };
        let mut v: Vec<f64> = (k..m).map(|i| r[[i, k]]).collect();
        v[0] -= alpha;
        let v_norm_sqr: f64 = v.iter().map(|x| x * x).sum();
        if v_norm_sqr == 0.0 {
            continue;
        }

        for j in k..n {
            let dot: f64 = v.iter().enumerate().map(|(p, vp)| vp * r[[k + p, j]]).sum();
            let factor = 2.0 * dot / v_norm_sqr;
            for (p, vp) in v.iter().enumerate() {
                r[[k + p, j]] -= factor * vp;
            }
        }
        let dot: f64 = v.iter().enumerate().map(|(p, vp)| vp * qtb[k + p]).sum();
        let factor = 2.0 * dot / v_norm_sqr;
        for (p, vp) in v.iter().enumerate() {
            qtb[k + p] -= factor * vp;
        }
    }

    let diag_max = (0..n).fold(0.0_f64, |acc, k| acc.max(r[[k, k]].abs()));
    let mut x = Array1::zeros(n);
    for k in (0..n).rev() {
        let diagonal = r[[k, k]];
        if diagonal.abs() <= RANK_TOLERANCE * diag_max {
            return Err(LeastSquaresError::RankDeficient {
                column: k,
                diagonal: diagonal.abs(),
            });
        }
        let mut acc = qtb[k];
        for j in (k + 1)..n {
            acc -= r[[k, j]] * x[j];
        }
        x[k] = acc / diagonal;
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_square_system_is_solved_exactly() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![3.0, 5.0];
        let x = least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_line_fit_through_consistent_points() {
        // y = 2 - 0.5 t sampled exactly
        let t = [0.0, 1.0, 2.0, 3.0, 4.0];
        let a = Array2::from_shape_fn((5, 2), |(i, j)| if j == 0 { 1.0 } else { t[i] });
        let b = Array1::from_iter(t.iter().map(|ti| 2.0 - 0.5 * ti));
        let x = least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_overdetermined_minimises_residual() {
        // Mean of the samples is the least-squares constant
        let a = Array2::from_elem((4, 1), 1.0);
        let b = array![1.0, 2.0, 3.0, 6.0];
        let x = least_squares(&a, &b).unwrap();
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_deficient_is_reported() {
        let a = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let b = array![1.0, 2.0, 3.0];
        assert!(matches!(
            least_squares(&a, &b),
            Err(LeastSquaresError::RankDeficient { .. })
        ));
    }

    #[test]
    fn test_underdetermined_is_rejected() {
        let a = Array2::<f64>::zeros((1, 2));
        let b = array![1.0];
        assert_eq!(
            least_squares(&a, &b).unwrap_err(),
            LeastSquaresError::Underdetermined { rows: 1, cols: 2 }
        );
    }
}
