//! Portable parallel iteration
//!
//! - `parallel` feature: rayon thread pools
//! - otherwise: sequential iteration
//!
//! ## Usage
//!
//! ```ignore
//! use crate::core::parallel::*;
//!
//! // One state per chunk of consecutive problems, created by `init`
//! let results = parallel_map_init(4, &problems, || solver.fresh(), |s, p| s.solve(p))?;
//! ```

use crate::core::error::{BemError, Result};

/// Check if parallel processing is available
#[inline]
pub fn is_parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Parallel map over a slice
#[cfg(feature = "parallel")]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    data.par_iter().map(f).collect()
}

/// Parallel map over a slice (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    data.iter().map(f).collect()
}

/// Map over a slice with `workers` threads.
///
/// `data` is cut into at most `workers` contiguous chunks; each chunk is
/// mapped in order with one state created by `init`, so consecutive items
/// share that state. Results are in the order of `data`.
#[cfg(feature = "parallel")]
pub fn parallel_map_init<T, S, U, I, F>(workers: usize, data: &[T], init: I, f: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    I: Fn() -> S + Sync + Send,
    F: Fn(&mut S, &T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    if workers <= 1 || data.len() <= 1 {
        let mut state = init();
        return Ok(data.iter().map(|item| f(&mut state, item)).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| BemError::ThreadPool(e.to_string()))?;
    let chunk_size = data.len().div_ceil(workers);
    let chunks: Vec<Vec<U>> = pool.install(|| {
        data.par_chunks(chunk_size)
            .map(|chunk| {
                let mut state = init();
                chunk.iter().map(|item| f(&mut state, item)).collect()
            })
            .collect()
    });
    Ok(chunks.into_iter().flatten().collect())
}

/// Map over a slice with a single state (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn parallel_map_init<T, S, U, I, F>(workers: usize, data: &[T], init: I, f: F) -> Result<Vec<U>>
where
    I: Fn() -> S,
    F: Fn(&mut S, &T) -> U,
{
    if workers > 1 {
        log::debug!("Built without the parallel feature: {workers} workers requested, using 1");
    }
    let mut state = init();
    Ok(data.iter().map(|item| f(&mut state, item)).collect())
}
