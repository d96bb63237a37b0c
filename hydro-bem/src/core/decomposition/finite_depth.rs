//! Fitting driver for the finite-depth auxiliary kernel
//!
//! The number of terms is increased until the fit, validated on a grid
//! twice as fine as the one it was computed on, is accurate enough.

use super::ExponentialDecomposition;
use super::prony::{fit, fit_error, linspace};
use crate::core::error::FitError;
use math_hydro_green::finite_depth_kernel;
use serde::{Deserialize, Serialize};

fn default_min_terms() -> usize {
    4
}
fn default_max_terms() -> usize {
    30
}
fn default_term_step() -> usize {
    2
}
fn default_x_min() -> f64 {
    -0.1
}
fn default_x_max() -> f64 {
    20.0
}
fn default_tolerance() -> f64 {
    1e-4
}
fn default_exponent_bounds() -> Option<(f64, f64)> {
    Some((-20.0, 0.0))
}

/// Parameters of the decomposition driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionConfig {
    /// First number of terms tried
    #[serde(default = "default_min_terms")]
    pub min_terms: usize,
    /// Last number of terms tried
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,
    /// Increment of the number of terms
    #[serde(default = "default_term_step")]
    pub term_step: usize,
    /// Start of the fitting interval
    #[serde(default = "default_x_min")]
    pub x_min: f64,
    /// End of the fitting interval
    #[serde(default = "default_x_max")]
    pub x_max: f64,
    /// Accepted mean squared error on the validation grid
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Open interval of admissible exponents
    #[serde(default = "default_exponent_bounds")]
    pub exponent_bounds: Option<(f64, f64)>,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            min_terms: default_min_terms(),
            max_terms: default_max_terms(),
            term_step: default_term_step(),
            x_min: default_x_min(),
            x_max: default_x_max(),
            tolerance: default_tolerance(),
            exponent_bounds: default_exponent_bounds(),
        }
    }
}

impl DecompositionConfig {
    /// Numbers of terms in the order they are tried
    pub fn term_counts(&self) -> impl Iterator<Item = usize> {
        let step = self.term_step.max(1);
        (self.min_terms.max(1)..=self.max_terms).step_by(step)
    }

    /// Set the accepted error
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the largest number of terms
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }
}

fn sample(x: &[f64], omega_bar: f64, k_bar: f64) -> Vec<f64> {
    x.iter()
        .map(|&xi| finite_depth_kernel(xi, omega_bar, k_bar))
        .collect()
}

/// Exponential decomposition of the auxiliary kernel for `ω̄ = ω²h/g` and
/// `k̄ = kh`.
///
/// Each attempt with `n` terms is fitted on `4n + 1` points and validated
/// on `8n + 1` points of the interval. The first attempt below the
/// tolerance is returned. Otherwise the last successful attempt is
/// returned, flagged as not converged; an error is returned only when every
/// attempt failed.
pub fn decompose_finite_depth_kernel(
    omega_bar: f64,
    k_bar: f64,
    config: &DecompositionConfig,
) -> Result<ExponentialDecomposition, FitError> {
    let mut best: Option<(Vec<f64>, Vec<f64>)> = None;
    let mut last_error = FitError::NoExponent;

    for nb_terms in config.term_counts() {
        let coarse = linspace(config.x_min, config.x_max, 4 * nb_terms + 1);
        let attempt = fit(
            &coarse,
            &sample(&coarse, omega_bar, k_bar),
            nb_terms,
            config.exponent_bounds,
        );
        let (amplitudes, exponents) = match attempt {
            Ok(coefficients) => coefficients,
            Err(err) => {
                log::debug!("Fit with {nb_terms} exponentials failed: {err}");
                last_error = err;
                continue;
            }
        };

        let fine = linspace(config.x_min, config.x_max, 8 * nb_terms + 1);
        let error = fit_error(&fine, &sample(&fine, omega_bar, k_bar), &amplitudes, &exponents);
        log::debug!(
            "Fit with {nb_terms} exponentials ({} kept): error {error:.3e}",
            exponents.len()
        );
        if error < config.tolerance {
            return Ok(ExponentialDecomposition::new(&amplitudes, &exponents, true));
        }
        best = Some((amplitudes, exponents));
    }

    match best {
        Some((amplitudes, exponents)) => Ok(ExponentialDecomposition::new(&amplitudes, &exponents, false)),
        None => Err(last_error),
    }
}
