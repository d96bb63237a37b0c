//! Row-parallel filling of influence matrices, with a sequential fallback
//! when the `parallel` feature is disabled.

use ndarray::Array2;
use num_complex::Complex64;

/// Map over `0..count`, in parallel when available
#[cfg(feature = "parallel")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Map over `0..count` (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

/// Scalar stored in influence matrices
pub trait MatrixEntry: Copy + Send + Sync + Default {}

impl MatrixEntry for f64 {}
impl MatrixEntry for Complex64 {}

/// Build the pair (S, V) row by row; `fill_row(i, s_row, v_row)` writes row `i`.
pub fn assemble_rows<T, F>(nrows: usize, ncols: usize, fill_row: F) -> (Array2<T>, Array2<T>)
where
    T: MatrixEntry,
    F: Fn(usize, &mut [T], &mut [T]) + Sync + Send,
{
    let rows = parallel_map_indexed(nrows, |i| {
        let mut s_row = vec![T::default(); ncols];
        let mut v_row = vec![T::default(); ncols];
        fill_row(i, &mut s_row, &mut v_row);
        (s_row, v_row)
    });

    let mut s = Array2::from_elem((nrows, ncols), T::default());
    let mut v = Array2::from_elem((nrows, ncols), T::default());
    for (i, (s_row, v_row)) in rows.into_iter().enumerate() {
        for j in 0..ncols {
            s[[i, j]] = s_row[j];
            v[[i, j]] = v_row[j];
        }
    }
    (s, v)
}
