//! Wave part of the Green function
//!
//! Infinite depth, with z and ζ measured from the free surface:
//!
//! ```text
//! G = 1/r − 1/r₁ + k W(kR, k(z + ζ))
//! ```
//!
//! Finite depth h, with `cᵢ ∈ {z+ζ, z−ζ−2h, ζ−z−2h, −z−ζ−4h}`:
//!
//! ```text
//! G = 1/r + 1/r₂ + Σᵢ 1/√(R² + cᵢ²)
//!                + ½ Σᵢ Σₖ aₖ/√(R² + (cᵢ + λₖh)²)
//!                + C/(4h) Σᵢ T(kR, kcᵢ)
//! ```
//!
//! where `T = W − 2/ρ` is the regular part of the tabulated integrals and
//! `(aₖ, λₖ)` the exponential decomposition of the auxiliary kernel. This
//! module evaluates the last line (finite depth) or `kW` (infinite depth) by
//! a one-point rule at the panel centers.

use crate::finite_depth::pole_coefficient;
use crate::geometry::{Collocation, Panels};
use crate::parallel::{assemble_rows, parallel_map_indexed};
use crate::tabulation::TabulatedIntegrals;
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Upper bound on z + ζ for the finite depth pole term
const SURFACE_CLAMP: f64 = -1e-12;

/// Physical parameters of the wave part
#[derive(Debug, Clone, Copy)]
pub struct WaveParameters<'a> {
    /// Height of the free surface
    pub free_surface: f64,
    /// Water depth; `f64::INFINITY` in deep water
    pub depth: f64,
    pub wavenumber: f64,
    /// ω²h/g in finite depth (unused in deep water)
    pub dimensionless_omega: f64,
    /// Exponential decomposition of the auxiliary kernel (finite depth)
    pub amplitudes: &'a [f64],
    pub exponents: &'a [f64],
}

impl<'a> WaveParameters<'a> {
    pub fn infinite_depth(free_surface: f64, wavenumber: f64) -> Self {
        Self {
            free_surface,
            depth: f64::INFINITY,
            wavenumber,
            dimensionless_omega: f64::INFINITY,
            amplitudes: &[],
            exponents: &[],
        }
    }

    pub fn is_infinite_depth(&self) -> bool {
        self.depth.is_infinite()
    }
}

/// Kernel value and its derivatives with respect to the horizontal distance
/// and the receiver height
#[derive(Debug, Clone, Copy, Default)]
struct KernelValues {
    value: Complex64,
    d_dr: Complex64,
    d_dz: Complex64,
}

fn infinite_depth_kernel(
    tables: &TabulatedIntegrals,
    r: f64,
    z: f64,
    zeta: f64,
    k: f64,
) -> KernelValues {
    let w = tables.wave_part(k * r, k * (z + zeta));
    KernelValues {
        value: w.value * k,
        d_dr: w.d_dr * (k * k),
        d_dz: w.d_dz * (k * k),
    }
}

fn finite_depth_kernel(
    tables: &TabulatedIntegrals,
    r: f64,
    z: f64,
    zeta: f64,
    params: &WaveParameters<'_>,
) -> KernelValues {
    let h = params.depth;
    let k = params.wavenumber;
    let images = [
        (z + zeta, 1.0),
        (z - zeta - 2.0 * h, 1.0),
        (zeta - z - 2.0 * h, -1.0),
        (-z - zeta - 4.0 * h, -1.0),
    ];
    let pole_factor = pole_coefficient(params.dimensionless_omega, k * h) / (4.0 * h);

    let mut out = KernelValues::default();
    for (i, &(c, sign)) in images.iter().enumerate() {
        let mut value = 0.0;
        let mut d_dr = 0.0;
        let mut d_dc = 0.0;

        let rho = r.hypot(c);
        value += 1.0 / rho;
        d_dr -= r / rho.powi(3);
        d_dc -= c / rho.powi(3);

        for (a, lambda) in params.amplitudes.iter().zip(params.exponents) {
            let shifted = c + lambda * h;
            let rho = r.hypot(shifted);
            value += 0.5 * a / rho;
            d_dr -= 0.5 * a * r / rho.powi(3);
            d_dc -= 0.5 * a * shifted / rho.powi(3);
        }

        let c_pole = if i == 0 { c.min(SURFACE_CLAMP) } else { c };
        let t = tables.regular_part(k * r, k * c_pole);

        out.value += value + t.value * pole_factor;
        out.d_dr += d_dr + t.d_dr * (pole_factor * k);
        out.d_dz += (t.d_dz * (pole_factor * k) + d_dc) * sign;
    }
    out
}

/// S and V entries of the pair (receiver `i`, source `j`) from the kernel
fn entries(
    kernel: &KernelValues,
    offset: [f64; 2],
    r: f64,
    receiver_normal: [f64; 3],
    area: f64,
) -> (Complex64, Complex64) {
    let factor = -area / (4.0 * PI);
    let horizontal = if r > 1e-12 {
        kernel.d_dr * ((receiver_normal[0] * offset[0] + receiver_normal[1] * offset[1]) / r)
    } else {
        Complex64::new(0.0, 0.0)
    };
    (
        kernel.value * factor,
        (horizontal + kernel.d_dz * receiver_normal[2]) * factor,
    )
}

/// Wave part of the influence matrices between receivers and source panels.
///
/// With `same_mesh` (receivers are the centers of `sources`) in deep water
/// the kernel, which is symmetric in the pair, is evaluated once per pair.
pub fn wave_matrices(
    tables: &TabulatedIntegrals,
    receivers: &Collocation<'_>,
    sources: &Panels<'_>,
    params: &WaveParameters<'_>,
    same_mesh: bool,
) -> (Array2<Complex64>, Array2<Complex64>) {
    let surface = params.free_surface;
    let kernel = |i: usize, j: usize| -> (KernelValues, [f64; 2], f64) {
        let x = receivers.point(i);
        let xi = sources.center(j);
        let offset = [x[0] - xi[0], x[1] - xi[1]];
        let r = offset[0].hypot(offset[1]);
        let (z, zeta) = (x[2] - surface, xi[2] - surface);
        let values = if params.is_infinite_depth() {
            infinite_depth_kernel(tables, r, z, zeta, params.wavenumber)
        } else {
            finite_depth_kernel(tables, r, z, zeta, params)
        };
        (values, offset, r)
    };

    let n = receivers.len();
    if same_mesh && params.is_infinite_depth() && n == sources.nb_faces() {
        let upper = parallel_map_indexed(n, |i| {
            (i..n).map(|j| kernel(i, j)).collect::<Vec<_>>()
        });
        let zero = Complex64::new(0.0, 0.0);
        let mut s = Array2::from_elem((n, n), zero);
        let mut v = Array2::from_elem((n, n), zero);
        for (i, row) in upper.into_iter().enumerate() {
            for (index, (values, offset, r)) in row.into_iter().enumerate() {
                let j = i + index;
                let (s_ij, v_ij) =
                    entries(&values, offset, r, receivers.normal(i), sources.areas[j]);
                s[[i, j]] = s_ij;
                v[[i, j]] = v_ij;
                if j != i {
                    let mirrored = [-offset[0], -offset[1]];
                    let (s_ji, v_ji) =
                        entries(&values, mirrored, r, receivers.normal(j), sources.areas[i]);
                    s[[j, i]] = s_ji;
                    v[[j, i]] = v_ji;
                }
            }
        }
        return (s, v);
    }

    assemble_rows(n, sources.nb_faces(), |i, s_row, v_row| {
        let receiver_normal = receivers.normal(i);
        for j in 0..sources.nb_faces() {
            let (values, offset, r) = kernel(i, j);
            let (s_ij, v_ij) = entries(&values, offset, r, receiver_normal, sources.areas[j]);
            s_row[j] = s_ij;
            v_row[j] = v_ij;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabulation::TabulationConfig;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    fn tables() -> TabulatedIntegrals {
        TabulatedIntegrals::new(TabulationConfig {
            nb_r: 120,
            nb_z: 46,
            nb_theta: 61,
        })
    }

    struct TwoPanels {
        vertices: Array2<f64>,
        faces: Vec<[usize; 4]>,
        centers: Array2<f64>,
        normals: Array2<f64>,
        areas: Array1<f64>,
        radiuses: Array1<f64>,
    }

    impl TwoPanels {
        fn new() -> Self {
            Self {
                vertices: Array2::zeros((1, 3)),
                faces: vec![[0, 0, 0, 0]; 2],
                centers: array![[0.0, 0.0, -1.0], [1.5, 0.5, -2.0]],
                normals: array![[0.0, 0.0, -1.0], [0.6, 0.8, 0.0]],
                areas: array![0.2, 0.3],
                radiuses: array![0.3, 0.4],
            }
        }

        fn panels(&self) -> Panels<'_> {
            Panels {
                vertices: self.vertices.view(),
                faces: &self.faces,
                centers: self.centers.view(),
                normals: self.normals.view(),
                areas: self.areas.view(),
                radiuses: self.radiuses.view(),
            }
        }
    }

    #[test]
    fn test_same_mesh_shortcut_matches_full_evaluation() {
        let tables = tables();
        let mesh = TwoPanels::new();
        let panels = mesh.panels();
        let receivers = Collocation::from_panels(&panels);
        let params = WaveParameters::infinite_depth(0.0, 1.2);
        let (s1, v1) = wave_matrices(&tables, &receivers, &panels, &params, true);
        let (s2, v2) = wave_matrices(&tables, &receivers, &panels, &params, false);
        for (a, b) in s1.iter().zip(s2.iter()).chain(v1.iter().zip(v2.iter())) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_deep_water_limit_of_finite_depth() {
        // For kh → ∞, C/(4h) → k and only the first image keeps an
        // imaginary part, so both kernels radiate the same wave
        let tables = tables();
        let k: f64 = 0.8;
        let h = 60.0;
        let omega_bar = k * h * (k * h).tanh();
        let params = WaveParameters {
            free_surface: 0.0,
            depth: h,
            wavenumber: k,
            dimensionless_omega: omega_bar,
            amplitudes: &[],
            exponents: &[],
        };
        let (r, z, zeta) = (1.3, -0.7, -1.1);
        let finite = finite_depth_kernel(&tables, r, z, zeta, &params);
        let deep = infinite_depth_kernel(&tables, r, z, zeta, k);
        assert_relative_eq!(finite.value.im, deep.value.im, max_relative = 1e-9);
        assert_relative_eq!(finite.d_dr.im, deep.d_dr.im, max_relative = 1e-9);

        // Real parts differ by the rest of the Rankine images:
        // 1/r₁ here against 2/r₁ in kW, plus the three far images
        let r1 = r.hypot(z + zeta);
        assert_relative_eq!(finite.value.re - deep.value.re, -1.0 / r1, epsilon = 0.05);
    }

    #[test]
    fn test_vertical_derivative_by_finite_difference() {
        let tables = tables();
        let k: f64 = 0.9;
        let h = 4.0;
        let omega_bar = k * h * (k * h).tanh();
        let amplitudes = [0.3, -0.1];
        let exponents = [-0.8, -2.5];
        let params = WaveParameters {
            free_surface: 0.0,
            depth: h,
            wavenumber: k,
            dimensionless_omega: omega_bar,
            amplitudes: &amplitudes,
            exponents: &exponents,
        };
        let (r, z, zeta, dz) = (2.2, -1.4, -2.1, 1e-5);
        let center = finite_depth_kernel(&tables, r, z, zeta, &params);
        let up = finite_depth_kernel(&tables, r, z + dz, zeta, &params);
        let down = finite_depth_kernel(&tables, r, z - dz, zeta, &params);
        let numerical = (up.value - down.value) / (2.0 * dz);
        assert_relative_eq!(center.d_dz.re, numerical.re, epsilon = 5e-3);
        assert_relative_eq!(center.d_dz.im, numerical.im, epsilon = 5e-3);
    }
}
