//! Sums of exponentials fitted by Prony's method
//!
//! For samples `f(x₀ + iΔx)` of `Σ aₖ exp(λₖ x)` the sequence satisfies a
//! linear recurrence of order n whose characteristic roots are
//! `exp(λₖ Δx)`. The recurrence is fitted by least squares, its roots give
//! the exponents and a second least-squares problem gives the amplitudes.

use crate::core::error::FitError;
use math_hydro_solvers::{least_squares, polynomial_roots};
use ndarray::{Array1, Array2};

/// Relative tolerance on the spacing of the abscissas
const GRID_TOLERANCE: f64 = 1e-8;

/// Exponents closer than this (relatively) are merged
const DUPLICATE_TOLERANCE: f64 = 1e-8;

fn uniform_step(x: &[f64]) -> Result<f64, FitError> {
    let step = x[1] - x[0];
    if step == 0.0 || !step.is_finite() {
        return Err(FitError::NonUniformGrid);
    }
    let uniform = x
        .windows(2)
        .all(|w| ((w[1] - w[0]) - step).abs() <= GRID_TOLERANCE * step.abs());
    if uniform {
        Ok(step)
    } else {
        Err(FitError::NonUniformGrid)
    }
}

/// Fit `f(x) ≈ Σ aₖ exp(λₖ x)` with at most `nb_terms` terms.
///
/// `x` must be equally spaced with at least `2 nb_terms` samples. Exponents
/// outside the open interval `exponent_bounds` are discarded, as are
/// duplicates (complex conjugate roots give the same real exponent), so
/// fewer terms than requested may be returned.
///
/// # Returns
/// `(amplitudes, exponents)`
pub fn fit(
    x: &[f64],
    f: &[f64],
    nb_terms: usize,
    exponent_bounds: Option<(f64, f64)>,
) -> Result<(Vec<f64>, Vec<f64>), FitError> {
    if x.len() != f.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            f: f.len(),
        });
    }
    let needed = (2 * nb_terms).max(2);
    if nb_terms == 0 || x.len() < needed {
        return Err(FitError::NotEnoughSamples {
            terms: nb_terms,
            needed,
            got: x.len(),
        });
    }
    let step = uniform_step(x)?;

    // Linear prediction: f[i + n] = Σₖ pₖ f[i + n − 1 − k]
    let n = nb_terms;
    let rows = f.len() - n;
    let prediction = Array2::from_shape_fn((rows, n), |(i, k)| f[i + n - 1 - k]);
    let targets = Array1::from_iter(f[n..].iter().copied());
    let p = least_squares(&prediction, &targets)?;

    let mut coefficients = Vec::with_capacity(n + 1);
    coefficients.push(1.0);
    coefficients.extend(p.iter().map(|c| -c));
    let roots = polynomial_roots(&coefficients)?;

    let (lower, upper) = exponent_bounds.unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
    let mut exponents: Vec<f64> = Vec::with_capacity(n);
    for root in roots {
        let modulus = root.norm();
        if modulus <= f64::MIN_POSITIVE {
            continue;
        }
        let exponent = modulus.ln() / step;
        if !exponent.is_finite() || exponent <= lower || exponent >= upper {
            continue;
        }
        let duplicate = exponents
            .iter()
            .any(|e| (e - exponent).abs() <= DUPLICATE_TOLERANCE * e.abs().max(1.0));
        if !duplicate {
            exponents.push(exponent);
        }
    }
    if exponents.is_empty() {
        return Err(FitError::NoExponent);
    }

    let basis = Array2::from_shape_fn((x.len(), exponents.len()), |(i, k)| {
        (exponents[k] * x[i]).exp()
    });
    let values = Array1::from_iter(f.iter().copied());
    let amplitudes = least_squares(&basis, &values)?;

    Ok((amplitudes.to_vec(), exponents))
}

/// Mean squared residual of the fit over the samples
pub fn fit_error(x: &[f64], f: &[f64], amplitudes: &[f64], exponents: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let total: f64 = x
        .iter()
        .zip(f)
        .map(|(&xi, &fi)| {
            let approximation: f64 = amplitudes
                .iter()
                .zip(exponents)
                .map(|(a, l)| a * (l * xi).exp())
                .sum();
            (fi - approximation).powi(2)
        })
        .sum();
    total / x.len() as f64
}

/// `n` equally spaced points from `start` to `end` included
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}
