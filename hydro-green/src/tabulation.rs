//! Tabulated wave integrals of the infinite-depth Green function
//!
//! In dimensionless variables `r = kR ≥ 0`, `z = k(z + ζ) ≤ 0`, the wave
//! part of the Green function is
//!
//! ```text
//! W(r, z) = 2/ρ + (4/π) ∫₀^{π/2} Re J(z + i r cos θ) dθ  +  i 2π e^z J₀(r)
//! ∂W/∂r   = −2r/ρ³ − (2/r)(1 − |z|/ρ) − (4/π) ∫₀^{π/2} cos θ Im J dθ  −  i 2π e^z J₁(r)
//! ∂W/∂z   = W − 2z/ρ³
//! ```
//!
//! with `ρ = √(r² + z²)` and `J(ζ) = e^ζ (E₁(ζ) + iπ)`. The four integrals
//! are precomputed on a fixed (r, z) grid by quadrature in θ and
//! interpolated with 5-point Lagrange polynomials in each direction.
//! Outside the grid the far-field expansion is used.

use crate::parallel::parallel_map_indexed;
use crate::special::{bessel_01, wave_integrand};
use ndarray::Array3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn default_nb_r() -> usize {
    328
}

fn default_nb_z() -> usize {
    46
}

fn default_nb_theta() -> usize {
    251
}

/// Size of the tabulation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabulationConfig {
    /// Number of horizontal distance samples
    #[serde(default = "default_nb_r")]
    pub nb_r: usize,
    /// Number of vertical samples
    #[serde(default = "default_nb_z")]
    pub nb_z: usize,
    /// Quadrature points in θ (rounded up to an odd count)
    #[serde(default = "default_nb_theta")]
    pub nb_theta: usize,
}

impl Default for TabulationConfig {
    fn default() -> Self {
        Self {
            nb_r: default_nb_r(),
            nb_z: default_nb_z(),
            nb_theta: default_nb_theta(),
        }
    }
}

impl TabulationConfig {
    pub fn with_nb_theta(mut self, nb_theta: usize) -> Self {
        self.nb_theta = nb_theta;
        self
    }
}

/// Wave part and its derivatives at one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveValues {
    pub value: Complex64,
    pub d_dr: Complex64,
    pub d_dz: Complex64,
}

/// Horizontal grid: logarithmic near 0, then uniform steps of 1/3
pub fn horizontal_grid(nb_r: usize) -> Vec<f64> {
    (1..=nb_r)
        .map(|i| {
            if i == 1 {
                0.0
            } else {
                let linear = 4.0 / 3.0 + (i as f64 - 32.0).abs() / 3.0;
                if i < 40 {
                    10f64.powf((i as f64 - 1.0) / 5.0 - 6.0).min(linear)
                } else {
                    linear
                }
            }
        })
        .collect()
}

/// Vertical grid (non-positive, decreasing), logarithmic down to -16
pub fn vertical_grid(nb_z: usize) -> Vec<f64> {
    (1..=nb_z)
        .map(|j| {
            let j = j as f64;
            -(10f64.powf(j / 5.0 - 6.0))
                .min(10f64.powf(j / 8.0 - 4.5))
                .min(16.0)
        })
        .collect()
}

/// Quadrature nodes on θ ∈ [0, π/2]: (cos θ, weight).
///
/// Simpson's rule in s with θ = (π/2)(1 − s²), which grades the nodes
/// towards θ = π/2 where J has a logarithmic peak for z close to 0.
fn quadrature_nodes(nb_theta: usize) -> Vec<(f64, f64)> {
    let n = (nb_theta.max(3)) | 1;
    let step = 1.0 / (n - 1) as f64;
    (0..n)
        .map(|k| {
            let factor = if k == 0 || k == n - 1 {
                1.0
            } else if k % 2 == 1 {
                4.0
            } else {
                2.0
            };
            let s = k as f64 * step;
            let cos_theta = (PI / 2.0 * s * s).sin();
            (cos_theta, factor * step / 3.0 * PI * s)
        })
        .collect()
}

/// The four tabulated integrals at (r, z):
/// `[re value, im value, re d/dr, im d/dr]`, without the closed-form terms.
fn wave_integrals(r: f64, z: f64, nodes: &[(f64, f64)]) -> [f64; 4] {
    let mut real = 0.0;
    let mut real_dr = 0.0;
    let mut imag = 0.0;
    let mut imag_dr = 0.0;
    for &(cos_theta, weight) in nodes {
        let j = wave_integrand(Complex64::new(z, r * cos_theta));
        real += weight * j.re;
        real_dr += weight * cos_theta * j.im;
        let phase = r * cos_theta;
        imag += weight * phase.cos();
        imag_dr += weight * cos_theta * phase.sin();
    }
    let ez = z.exp();
    [
        4.0 / PI * real,
        4.0 * ez * imag,
        -4.0 / PI * real_dr,
        -4.0 * ez * imag_dr,
    ]
}

const STENCIL: usize = 5;

/// First node of the `STENCIL`-point window around `x` and the Lagrange
/// weights of its nodes at `x`
fn lagrange_window(grid: &[f64], x: f64) -> (usize, [f64; STENCIL]) {
    let upper = grid.partition_point(|&g| g <= x);
    let start = upper
        .saturating_sub(STENCIL / 2 + 1)
        .min(grid.len() - STENCIL);
    let nodes = &grid[start..start + STENCIL];
    let mut weights = [1.0; STENCIL];
    for (a, weight) in weights.iter_mut().enumerate() {
        for (b, node) in nodes.iter().enumerate() {
            if a != b {
                *weight *= (x - node) / (nodes[a] - node);
            }
        }
    }
    (start, weights)
}

/// Precomputed wave integrals, built once and shared read-only
#[derive(Debug, Clone)]
pub struct TabulatedIntegrals {
    config: TabulationConfig,
    r_grid: Vec<f64>,
    /// |z| samples, increasing
    depth_grid: Vec<f64>,
    values: Array3<f64>,
}

impl TabulatedIntegrals {
    /// Compute the table (parallel over the r samples when enabled)
    pub fn new(config: TabulationConfig) -> Self {
        let config = TabulationConfig {
            nb_r: config.nb_r.max(STENCIL),
            nb_z: config.nb_z.max(STENCIL),
            nb_theta: config.nb_theta,
        };
        log::debug!(
            "Tabulating wave integrals on a {}x{} grid with {} quadrature points",
            config.nb_r,
            config.nb_z,
            config.nb_theta
        );
        let r_grid = horizontal_grid(config.nb_r);
        let z_grid = vertical_grid(config.nb_z);
        let nodes = quadrature_nodes(config.nb_theta);

        let rows = parallel_map_indexed(config.nb_r, |i| {
            z_grid
                .iter()
                .map(|&z| wave_integrals(r_grid[i], z, &nodes))
                .collect::<Vec<_>>()
        });

        let mut values = Array3::zeros((config.nb_r, config.nb_z, 4));
        for (i, row) in rows.into_iter().enumerate() {
            for (j, entry) in row.into_iter().enumerate() {
                for (p, v) in entry.into_iter().enumerate() {
                    values[[i, j, p]] = v;
                }
            }
        }

        Self {
            config,
            r_grid,
            depth_grid: z_grid.iter().map(|z| -z).collect(),
            values,
        }
    }

    pub fn config(&self) -> TabulationConfig {
        self.config
    }

    /// Largest tabulated r
    pub fn r_max(&self) -> f64 {
        self.r_grid[self.r_grid.len() - 1]
    }

    /// Deepest tabulated z (negative)
    pub fn z_min(&self) -> f64 {
        -self.depth_grid[self.depth_grid.len() - 1]
    }

    /// Shallowest tabulated z (negative, close to 0)
    pub fn z_max(&self) -> f64 {
        -self.depth_grid[0]
    }

    fn interpolate(&self, r: f64, depth: f64) -> [f64; 4] {
        let (i0, wr) = lagrange_window(&self.r_grid, r);
        let (j0, wz) = lagrange_window(&self.depth_grid, depth);
        let mut out = [0.0; 4];
        for (a, wa) in wr.iter().enumerate() {
            for (b, wb) in wz.iter().enumerate() {
                let weight = wa * wb;
                for (p, o) in out.iter_mut().enumerate() {
                    *o += weight * self.values[[i0 + a, j0 + b, p]];
                }
            }
        }
        out
    }

    /// W − 2/ρ and its derivatives, with z clamped below the free surface
    pub fn regular_part(&self, r: f64, z: f64) -> WaveValues {
        let z = z.min(self.z_max());
        let rho = r.hypot(z);

        if r <= self.r_max() && z >= self.z_min() {
            let [re, im, re_dr, im_dr] = self.interpolate(r, -z);
            let value = Complex64::new(re, im);
            let closed_form_dr = if r > 1e-12 {
                (2.0 / r) * (1.0 - z.abs() / rho)
            } else {
                0.0
            };
            WaveValues {
                value,
                d_dr: Complex64::new(re_dr - closed_form_dr, im_dr),
                d_dz: value + 2.0 / rho,
            }
        } else {
            let full = far_field(r, z);
            WaveValues {
                value: full.value - 2.0 / rho,
                d_dr: full.d_dr - 2.0 * r / rho.powi(3),
                d_dz: full.d_dz - 2.0 * z / rho.powi(3),
            }
        }
    }

    /// W and its derivatives
    pub fn wave_part(&self, r: f64, z: f64) -> WaveValues {
        let z = z.min(self.z_max());
        let rho = r.hypot(z);
        let regular = self.regular_part(r, z);
        WaveValues {
            value: regular.value + 2.0 / rho,
            d_dr: regular.d_dr - 2.0 * r / rho.powi(3),
            d_dz: regular.d_dz - 2.0 * z / rho.powi(3),
        }
    }
}

/// Far-field expansion of W, for r or |z| beyond the table.
///
/// The real part keeps the first two moments of the non-oscillating part
/// and the pole term `−2π e^z Y₀(r)`; the latter is dropped for r < 1,
/// where it is only reached at depths with e^z < e^{-16}.
fn far_field(r: f64, z: f64) -> WaveValues {
    let rho = r.hypot(z);
    let depth = z.abs();
    let quadrupole = 2.0 * z * z - r * r;
    let smooth = -2.0 * (depth / rho.powi(3) + quadrupole / rho.powi(5));
    let smooth_dr = 6.0 * depth * r / rho.powi(5)
        + 4.0 * r / rho.powi(5)
        + 10.0 * r * quadrupole / rho.powi(7);

    let ez = z.exp();
    let (j0, j1, y0, y1) = if r > 0.0 {
        let [j0, j1, y0, y1] = bessel_01(r);
        (j0, j1, y0, y1)
    } else {
        (1.0, 0.0, 0.0, 0.0)
    };
    let (pole, pole_dr) = if r >= 1.0 {
        (-2.0 * PI * ez * y0, 2.0 * PI * ez * y1)
    } else {
        (0.0, 0.0)
    };

    let value = Complex64::new(smooth + pole, 2.0 * PI * ez * j0);
    WaveValues {
        value,
        d_dr: Complex64::new(smooth_dr + pole_dr, -2.0 * PI * ez * j1),
        d_dz: value - 2.0 * z / rho.powi(3),
    }
}
