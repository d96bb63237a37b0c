//! Exponential decomposition of the finite-depth kernel
//!
//! - `prony`: generic fit of a sum of exponentials
//! - `finite_depth`: the fitting driver for the finite-depth auxiliary kernel

pub mod finite_depth;
pub mod prony;

pub use finite_depth::{DecompositionConfig, decompose_finite_depth_kernel};
pub use prony::{fit, fit_error, linspace};

/// Length of the padded coefficient arrays
pub const MAX_EXPONENTIAL_TERMS: usize = 31;

/// Cache key of a decomposition: exact bit patterns of the dimensionless
/// frequency `ω²h/g` and wavenumber `kh`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecompositionKey {
    omega_bits: u64,
    wavenumber_bits: u64,
}

impl DecompositionKey {
    /// Key of `(ω̄, k̄)`
    pub fn new(dimensionless_omega: f64, dimensionless_wavenumber: f64) -> Self {
        Self {
            omega_bits: dimensionless_omega.to_bits(),
            wavenumber_bits: dimensionless_wavenumber.to_bits(),
        }
    }

    /// ω̄
    pub fn dimensionless_omega(&self) -> f64 {
        f64::from_bits(self.omega_bits)
    }

    /// k̄
    pub fn dimensionless_wavenumber(&self) -> f64 {
        f64::from_bits(self.wavenumber_bits)
    }
}

/// Fitted `Σ aₖ exp(λₖ x)`, zero-padded to [`MAX_EXPONENTIAL_TERMS`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialDecomposition {
    amplitudes: Vec<f64>,
    exponents: Vec<f64>,
    nb_terms: usize,
    converged: bool,
}

impl ExponentialDecomposition {
    /// Pad the fitted coefficients. Terms beyond [`MAX_EXPONENTIAL_TERMS`]
    /// are dropped.
    pub fn new(amplitudes: &[f64], exponents: &[f64], converged: bool) -> Self {
        let nb_terms = amplitudes.len().min(exponents.len()).min(MAX_EXPONENTIAL_TERMS);
        let mut padded_amplitudes = vec![0.0; MAX_EXPONENTIAL_TERMS];
        let mut padded_exponents = vec![0.0; MAX_EXPONENTIAL_TERMS];
        padded_amplitudes[..nb_terms].copy_from_slice(&amplitudes[..nb_terms]);
        padded_exponents[..nb_terms].copy_from_slice(&exponents[..nb_terms]);
        Self {
            amplitudes: padded_amplitudes,
            exponents: padded_exponents,
            nb_terms,
            converged,
        }
    }

    /// The empty decomposition used in infinite depth
    pub fn zero() -> Self {
        Self::new(&[], &[], true)
    }

    /// Padded amplitudes
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Padded exponents
    pub fn exponents(&self) -> &[f64] {
        &self.exponents
    }

    /// Number of fitted terms
    pub fn nb_terms(&self) -> usize {
        self.nb_terms
    }

    /// Whether the fit reached the requested accuracy
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Value of the sum at `x`
    pub fn evaluate(&self, x: f64) -> f64 {
        self.amplitudes[..self.nb_terms]
            .iter()
            .zip(&self.exponents[..self.nb_terms])
            .map(|(a, l)| a * (l * x).exp())
            .sum()
    }
}
