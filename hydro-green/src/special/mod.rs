//! Special functions for the free-surface Green function
//!
//! - Exponential integral E₁ of complex argument and the product e^z E₁(z)
//! - Bessel functions J₀, J₁, Y₀, Y₁ of real argument
//!
//! The wave integrals are tabulated once from E₁; Bessel functions only
//! appear in the far-field asymptotics outside the table.

mod exponential_integral;

pub use exponential_integral::{EULER_GAMMA, e1, exp_e1, wave_integrand};

/// J₀, J₁, Y₀, Y₁ at `x > 0`
pub fn bessel_01(x: f64) -> [f64; 4] {
    use spec_math::Bessel;

    [x.bessel_jv(0.0), x.bessel_jv(1.0), x.bessel_yv(0.0), x.bessel_yv(1.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_bessel_wronskian() {
        // J₁ Y₀ - J₀ Y₁ = 2 / (π x)
        for x in [0.5, 3.0, 25.0, 140.0] {
            let [j0, j1, y0, y1] = bessel_01(x);
            assert_relative_eq!(j1 * y0 - j0 * y1, 2.0 / (PI * x), max_relative = 1e-8);
        }
    }

    #[test]
    fn test_bessel_values() {
        let [j0, j1, _, _] = bessel_01(1.0);
        assert_relative_eq!(j0, 0.765_197_686_557_966_6, epsilon = 1e-10);
        assert_relative_eq!(j1, 0.440_050_585_744_933_5, epsilon = 1e-10);
    }
}
