//! Auxiliary kernel of the finite-depth Green function
//!
//! With `ω̄ = ω²h/g` and `k̄ = kh` (so that `k̄ tanh k̄ = ω̄`), the integrand of
//! the finite-depth wave part is split as
//!
//! ```text
//! (x + ω̄) eˣ / (x sinh x − ω̄ cosh x) = 2 + C/(x − k̄) + ff(x)
//! C = (k̄ + ω̄)² / (k̄² − ω̄² + ω̄)
//! ```
//!
//! The constant and the pole are integrated in closed form; `ff` is smooth,
//! decays for large x and is approximated by a sum of exponentials.

/// Residue of the pole at `x = k̄`
pub fn pole_coefficient(omega_bar: f64, k_bar: f64) -> f64 {
    (k_bar + omega_bar).powi(2) / (k_bar * k_bar - omega_bar * omega_bar + omega_bar)
}

/// Half-width of the interval around the pole where the kernel is
/// interpolated instead of evaluated
pub fn pole_tolerance(k_bar: f64) -> f64 {
    0.1_f64.max(0.1 * k_bar)
}

/// `(x + ω̄) eˣ / (x sinh x − ω̄ cosh x)`, numerator and denominator divided
/// by eˣ
fn ratio(x: f64, omega_bar: f64) -> f64 {
    let decay = (-2.0 * x).exp();
    let sinh = 0.5 * (1.0 - decay);
    let cosh = 0.5 * (1.0 + decay);
    (x + omega_bar) / (x * sinh - omega_bar * cosh)
}

fn kernel_off_pole(x: f64, omega_bar: f64, k_bar: f64, coefficient: f64) -> f64 {
    ratio(x, omega_bar) - coefficient / (x - k_bar) - 2.0
}

/// Limit of the kernel at the pole
fn kernel_at_pole(omega_bar: f64, k_bar: f64) -> f64 {
    let decay = (-2.0 * k_bar).exp();
    let sinh = 0.5 * (1.0 - decay);
    let cosh = 0.5 * (1.0 + decay);
    let numerator = k_bar + omega_bar;
    let numerator_dx = k_bar + omega_bar + 1.0;
    let denominator_dx = sinh + k_bar * cosh - omega_bar * sinh;
    let denominator_dxx = (2.0 - omega_bar) * cosh + k_bar * sinh;
    numerator_dx / denominator_dx
        - numerator * denominator_dxx / (2.0 * denominator_dx * denominator_dx)
        - 2.0
}

/// The smooth kernel `ff(x)` approximated by the exponential decomposition.
///
/// Within [`pole_tolerance`] of `k̄` the value is taken from the quadratic
/// through both ends of that interval and the limit at `k̄`.
pub fn finite_depth_kernel(x: f64, omega_bar: f64, k_bar: f64) -> f64 {
    let coefficient = pole_coefficient(omega_bar, k_bar);
    let tolerance = pole_tolerance(k_bar);
    let offset = x - k_bar;
    if offset.abs() > tolerance {
        return kernel_off_pole(x, omega_bar, k_bar, coefficient);
    }

    let below = kernel_off_pole(k_bar - tolerance, omega_bar, k_bar, coefficient);
    let above = kernel_off_pole(k_bar + tolerance, omega_bar, k_bar, coefficient);
    let center = kernel_at_pole(omega_bar, k_bar);
    let slope = (above - below) / (2.0 * tolerance);
    let curvature = (above - 2.0 * center + below) / (2.0 * tolerance * tolerance);
    center + slope * offset + curvature * offset * offset
}
