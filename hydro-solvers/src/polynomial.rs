//! Roots of real polynomials.
//!
//! Simultaneous Aberth–Ehrlich iteration on all roots. Coefficients are
//! given highest degree first, as in `c[0] zⁿ + c[1] zⁿ⁻¹ + … + c[n]`.

use num_complex::Complex64;
use std::f64::consts::PI;
use thiserror::Error;

/// Errors of the root finder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolynomialError {
    #[error("Polynomial has no non-zero coefficient")]
    ZeroPolynomial,
    #[error("Polynomial coefficients contain non-finite values")]
    NonFinite,
    #[error("Root iteration did not converge after {iterations} iterations (last step {last_step:e})")]
    NotConverged { iterations: usize, last_step: f64 },
}

const MAX_ITERATIONS: usize = 500;
const STEP_TOLERANCE: f64 = 1e-14;
const ACCEPT_TOLERANCE: f64 = 1e-8;

/// Evaluate p(z) and p'(z) by Horner's scheme
fn horner(coefficients: &[f64], z: Complex64) -> (Complex64, Complex64) {
    let mut p = Complex64::new(coefficients[0], 0.0);
    let mut dp = Complex64::new(0.0, 0.0);
    for &c in &coefficients[1..] {
        dp = dp * z + p;
        p = p * z + c;
    }
    (p, dp)
}

/// All complex roots of a real polynomial, with multiplicity.
///
/// Leading zero coefficients are dropped; trailing zeros contribute roots at
/// the origin.
pub fn polynomial_roots(coefficients: &[f64]) -> Result<Vec<Complex64>, PolynomialError> {
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(PolynomialError::NonFinite);
    }
    let first = coefficients
        .iter()
        .position(|&c| c != 0.0)
        .ok_or(PolynomialError::ZeroPolynomial)?;
    let last = coefficients
        .iter()
        .rposition(|&c| c != 0.0)
        .ok_or(PolynomialError::ZeroPolynomial)?;

    let nb_zero_roots = coefficients.len() - 1 - last;
    let lead = coefficients[first];
    let monic: Vec<f64> = coefficients[first..=last].iter().map(|c| c / lead).collect();
    let degree = monic.len() - 1;

    let mut roots = vec![Complex64::new(0.0, 0.0); nb_zero_roots];
    match degree {
        0 => {}
        1 => roots.push(Complex64::new(-monic[1], 0.0)),
        _ => roots.extend(aberth(&monic)?),
    }
    Ok(roots)
}

fn aberth(monic: &[f64]) -> Result<Vec<Complex64>, PolynomialError> {
    let degree = monic.len() - 1;

    let radius = monic[1..]
        .iter()
        .enumerate()
        .map(|(k, c)| c.abs().powf(1.0 / (k + 1) as f64))
        .fold(0.0_f64, f64::max)
        .max(1e-3);
    let mut z: Vec<Complex64> = (0..degree)
        .map(|k| Complex64::from_polar(radius, 2.0 * PI * k as f64 / degree as f64 + 0.4))
        .collect();

    let mut last_step = f64::INFINITY;
    for _ in 0..MAX_ITERATIONS {
        last_step = 0.0;
        for k in 0..degree {
            let (p, dp) = horner(monic, z[k]);
            if p.norm() == 0.0 {
                continue;
            }
            let newton = if dp.norm() == 0.0 {
                p
            } else {
                p / dp
            };
            let repulsion: Complex64 = (0..degree)
                .filter(|&j| j != k)
                .map(|j| z[k] - z[j])
                .filter(|d| d.norm() > 0.0)
                .map(|d| d.inv())
                .sum();
            let step = newton / (Complex64::new(1.0, 0.0) - newton * repulsion);
            if !step.re.is_finite() || !step.im.is_finite() {
                continue;
            }
            z[k] -= step;
            last_step = last_step.max(step.norm() / z[k].norm().max(1.0));
        }
        if last_step < STEP_TOLERANCE {
            return Ok(z);
        }
    }

    if last_step < ACCEPT_TOLERANCE {
        Ok(z)
    } else {
        Err(PolynomialError::NotConverged {
            iterations: MAX_ITERATIONS,
            last_step,
        })
    }
}
