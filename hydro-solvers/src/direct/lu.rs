//! LU decomposition with partial pivoting for dense systems.
//!
//! Influence systems are fully populated once the symmetric blocks have been
//! expanded, so the BEM solve goes through this factorization.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2, Axis};
use num_traits::{FromPrimitive, Zero};
use thiserror::Error;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is singular or nearly singular (pivot {column})")]
    SingularMatrix { column: usize },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

fn pivot_threshold<R: FromPrimitive + Zero>() -> R {
    R::from_f64(1e-30).unwrap_or_else(R::zero)
}

/// LU factorization result
///
/// L (unit lower triangular) and U share one array; `pivots[k]` is the row
/// swapped with row `k` at elimination step `k`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Combined L and U factors
    pub lu: Array2<T>,
    /// Row interchanges, in elimination order
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Solve Ax = b using the pre-computed factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x = b.clone();
        for (k, &p) in self.pivots.iter().enumerate() {
            if p != k {
                x.swap(k, p);
            }
        }

        for i in 0..self.n {
            let mut acc = x[i];
            for j in 0..i {
                acc -= self.lu[[i, j]] * x[j];
            }
            x[i] = acc;
        }

        let tiny = pivot_threshold::<T::Real>();
        for i in (0..self.n).rev() {
            let mut acc = x[i];
            for j in (i + 1)..self.n {
                acc -= self.lu[[i, j]] * x[j];
            }
            let u_ii = self.lu[[i, i]];
            if u_ii.norm() < tiny {
                return Err(LuError::SingularMatrix { column: i });
            }
            x[i] = acc * u_ii.inv();
        }

        Ok(x)
    }
}

/// Compute the LU factorization with partial pivoting
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let tiny = pivot_threshold::<T::Real>();
    let mut lu = a.clone();
    let mut pivots = Vec::with_capacity(n);

    for k in 0..n {
        let (max_row, max_val) = (k..n)
            .map(|i| (i, lu[[i, k]].norm()))
            .fold((k, T::Real::zero()), |best, cur| {
                if cur.1 > best.1 { cur } else { best }
            });

        if max_val < tiny {
            return Err(LuError::SingularMatrix { column: k });
        }

        if max_row != k {
            let (mut upper, mut lower) = lu.view_mut().split_at(Axis(0), max_row);
            let mut row_k = upper.row_mut(k);
            let mut row_p = lower.row_mut(0);
            ndarray::Zip::from(&mut row_k)
                .and(&mut row_p)
                .for_each(std::mem::swap);
        }
        pivots.push(max_row);

        let inv_pivot = lu[[k, k]].inv();
        for i in (k + 1)..n {
            let mult = lu[[i, k]] * inv_pivot;
            lu[[i, k]] = mult;
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

/// Solve Ax = b with a fresh LU factorization
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    lu_factorize(a)?.solve(b)
}
