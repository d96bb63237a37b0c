//! The three terms of the dense influence matrices
//!
//! ```text
//! infinite depth:  G = 1/r − 1/r_fs + wave part
//! finite depth:    G = 1/r + 1/r_sb + wave part
//! ```
//!
//! where `r_fs` and `r_sb` are the distances to the image of the source
//! across the free surface and across the sea bottom.

use crate::core::cache::MatrixPair;
use crate::core::decomposition::{DecompositionKey, ExponentialDecomposition};
use crate::core::mesh::Mesh;
use math_hydro_green::{Collocation, GreenFunction, WaveParameters};
use ndarray::Array2;
use num_complex::Complex64;

/// Physical parameters of the Green function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreenParameters {
    /// Height of the free surface; `f64::INFINITY` without free surface
    pub free_surface: f64,
    /// Height of the sea bottom; `f64::NEG_INFINITY` in deep water
    pub sea_bottom: f64,
    /// Wavenumber k
    pub wavenumber: f64,
    /// ω²h/g in finite depth, unused otherwise
    pub dimensionless_omega: f64,
}

impl GreenParameters {
    /// Deep water with the free surface at z = 0
    pub fn infinite_depth(wavenumber: f64) -> Self {
        Self {
            free_surface: 0.0,
            sea_bottom: f64::NEG_INFINITY,
            wavenumber,
            dimensionless_omega: f64::INFINITY,
        }
    }

    /// Water of depth `depth` below a free surface at z = 0
    pub fn finite_depth(depth: f64, wavenumber: f64, dimensionless_omega: f64) -> Self {
        Self {
            free_surface: 0.0,
            sea_bottom: -depth,
            wavenumber,
            dimensionless_omega,
        }
    }

    /// Unbounded fluid, Rankine term only
    pub fn no_free_surface() -> Self {
        Self {
            free_surface: f64::INFINITY,
            sea_bottom: f64::NEG_INFINITY,
            wavenumber: 0.0,
            dimensionless_omega: f64::INFINITY,
        }
    }

    /// Water depth
    pub fn depth(&self) -> f64 {
        self.free_surface - self.sea_bottom
    }

    /// Whether the image and wave terms are present
    pub fn has_free_surface(&self) -> bool {
        self.free_surface.is_finite()
    }

    /// Whether the sea bottom is at infinity
    pub fn is_infinite_depth(&self) -> bool {
        self.sea_bottom == f64::NEG_INFINITY
    }

    /// kh
    pub fn dimensionless_wavenumber(&self) -> f64 {
        self.wavenumber * self.depth()
    }

    /// Key of the exponential decomposition needed by the wave term, in
    /// finite depth only
    pub fn decomposition_key(&self) -> Option<DecompositionKey> {
        (self.has_free_surface() && !self.is_infinite_depth()).then(|| {
            DecompositionKey::new(self.dimensionless_omega, self.dimensionless_wavenumber())
        })
    }

    /// Parameters identifying the image term in the block cache
    pub(crate) fn image_signature(&self) -> [f64; 2] {
        [self.free_surface, self.sea_bottom]
    }

    /// Parameters identifying the wave term in the block cache
    pub(crate) fn wave_signature(&self) -> Vec<f64> {
        if self.is_infinite_depth() {
            vec![self.free_surface, self.sea_bottom, self.wavenumber]
        } else {
            vec![
                self.free_surface,
                self.sea_bottom,
                self.wavenumber,
                self.dimensionless_omega,
            ]
        }
    }
}

fn to_complex(pair: (Array2<f64>, Array2<f64>)) -> MatrixPair {
    let (s, v) = pair;
    (
        s.mapv(|x| Complex64::new(x, 0.0)),
        v.mapv(|x| Complex64::new(x, 0.0)),
    )
}

/// Influence of `sources` on the face centers of `receivers`, G = 1/r
pub fn rankine_term(green: &dyn GreenFunction, receivers: &Mesh, sources: &Mesh) -> MatrixPair {
    let source_panels = sources.panels();
    let receiver_panels = receivers.panels();
    to_complex(green.rankine(&Collocation::from_panels(&receiver_panels), &source_panels))
}

/// Image term: receivers reflected across the free surface (deep water,
/// with a negative sign) or across the sea bottom
pub fn image_term(
    green: &dyn GreenFunction,
    receivers: &Mesh,
    sources: &Mesh,
    params: &GreenParameters,
) -> MatrixPair {
    let plane = if params.is_infinite_depth() {
        params.free_surface
    } else {
        params.sea_bottom
    };
    let (points, normals) = receivers.reflected_collocation(plane);
    let collocation = Collocation {
        points: points.view(),
        normals: normals.view(),
    };
    let (s, v) = to_complex(green.rankine(&collocation, &sources.panels()));
    if params.is_infinite_depth() {
        (-s, -v)
    } else {
        (s, v)
    }
}

/// Wave part of the Green function. In finite depth `decomposition` must be
/// the decomposition of the auxiliary kernel for these parameters.
pub fn wave_term(
    green: &dyn GreenFunction,
    receivers: &Mesh,
    sources: &Mesh,
    params: &GreenParameters,
    decomposition: &ExponentialDecomposition,
) -> MatrixPair {
    let wave = if params.is_infinite_depth() {
        WaveParameters::infinite_depth(params.free_surface, params.wavenumber)
    } else {
        WaveParameters {
            free_surface: params.free_surface,
            depth: params.depth(),
            wavenumber: params.wavenumber,
            dimensionless_omega: params.dimensionless_omega,
            amplitudes: decomposition.amplitudes(),
            exponents: decomposition.exponents(),
        }
    };
    let receiver_panels = receivers.panels();
    green.wave(
        &Collocation::from_panels(&receiver_panels),
        &sources.panels(),
        &wave,
        receivers.id() == sources.id(),
    )
}
