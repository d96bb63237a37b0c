//! Exponential integral of a complex argument
//!
//! ```text
//! E₁(z) = ∫_z^∞ e^{-t}/t dt        (principal branch, cut along z < 0)
//! ```
//!
//! The wave part of the free-surface Green function only ever needs the
//! product `e^z E₁(z)`, which stays bounded where `E₁` alone overflows, so
//! that is the primary quantity computed here.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Euler–Mascheroni constant
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

const SERIES_LIMIT: f64 = 10.0;
const MAX_TERMS: usize = 500;
const TOLERANCE: f64 = 1e-15;

/// e^z E₁(z)
///
/// Power series when `|z| + Re z < 10`, continued fraction (modified Lentz)
/// otherwise.
pub fn exp_e1(z: Complex64) -> Complex64 {
    if z.norm() + z.re < SERIES_LIMIT {
        z.exp() * e1_series(z)
    } else {
        exp_e1_continued_fraction(z)
    }
}

/// E₁(z)
pub fn e1(z: Complex64) -> Complex64 {
    if z.norm() + z.re < SERIES_LIMIT {
        e1_series(z)
    } else {
        exp_e1_continued_fraction(z) * (-z).exp()
    }
}

/// E₁(z) = -γ - ln z - Σ_{k≥1} (-z)^k / (k k!)
fn e1_series(z: Complex64) -> Complex64 {
    let mut term = Complex64::new(1.0, 0.0);
    let mut sum = Complex64::new(0.0, 0.0);
    for k in 1..MAX_TERMS {
        term *= -z / k as f64;
        let contribution = term / k as f64;
        sum += contribution;
        if contribution.norm() <= TOLERANCE * sum.norm() && k as f64 > z.norm() {
            break;
        }
    }
    -EULER_GAMMA - z.ln() - sum
}

/// e^z E₁(z) = 1/(z + 1 - 1²/(z + 3 - 2²/(z + 5 - …)))
fn exp_e1_continued_fraction(z: Complex64) -> Complex64 {
    let tiny = Complex64::new(1e-300, 0.0);
    let one = Complex64::new(1.0, 0.0);

    let mut b = z + 1.0;
    let mut c = one / tiny;
    let mut d = one / b;
    let mut h = d;
    for i in 1..MAX_TERMS {
        let a = -((i * i) as f64);
        b += 2.0;
        d = one / (d * a + b);
        c = b + c.inv() * a;
        let delta = c * d;
        h *= delta;
        if (delta - one).norm() < TOLERANCE {
            break;
        }
    }
    h
}

/// Integrand of the tabulated wave integrals
///
/// ```text
/// J(ζ) = e^ζ (E₁(ζ) + iπ sign(Im ζ))
/// ```
///
/// with `sign(0) = +1`; on the negative real axis this is the real
/// principal value `-e^ζ Ei(-ζ)`.
pub fn wave_integrand(zeta: Complex64) -> Complex64 {
    let sign = if zeta.im >= 0.0 { 1.0 } else { -1.0 };
    exp_e1(zeta) + zeta.exp() * Complex64::new(0.0, sign * PI)
}
