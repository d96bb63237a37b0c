//! Green function interface consumed by the BEM assembler

use crate::geometry::{Collocation, Panels};
use crate::rankine::{DEFAULT_NEAR_FIELD_RATIO, rankine_matrices};
use crate::tabulation::{TabulatedIntegrals, TabulationConfig};
use crate::wave::{WaveParameters, wave_matrices};
use ndarray::Array2;
use num_complex::Complex64;
use std::fmt::Debug;
use std::sync::Arc;

/// Influence matrices of a Green function, split into a free-space part
/// and a wave part.
///
/// Both return the pair (S, V) with `S_ij = −1/(4π) ∫_j G dS` and
/// `V_ij = −1/(4π) ∫_j ∂G/∂n_i dS`, receivers along rows.
pub trait GreenFunction: Send + Sync + Debug {
    /// Free-space part, G = 1/r
    fn rankine(
        &self,
        receivers: &Collocation<'_>,
        sources: &Panels<'_>,
    ) -> (Array2<f64>, Array2<f64>);

    /// Wave part. `same_mesh` tells that the receivers are the centers of
    /// `sources`, which allows reuse of symmetric kernel values.
    fn wave(
        &self,
        receivers: &Collocation<'_>,
        sources: &Panels<'_>,
        params: &WaveParameters<'_>,
        same_mesh: bool,
    ) -> (Array2<Complex64>, Array2<Complex64>);
}

/// Delhommeau's Green function: exact Rankine panel integrals near the
/// receiver, tabulated wave integrals.
#[derive(Debug, Clone)]
pub struct Delhommeau {
    tables: Arc<TabulatedIntegrals>,
    near_field_ratio: f64,
}

impl Delhommeau {
    /// Build the tables for the given grid
    pub fn new(config: TabulationConfig) -> Self {
        Self::from_tables(Arc::new(TabulatedIntegrals::new(config)))
    }

    /// Share already computed tables
    pub fn from_tables(tables: Arc<TabulatedIntegrals>) -> Self {
        Self {
            tables,
            near_field_ratio: DEFAULT_NEAR_FIELD_RATIO,
        }
    }

    pub fn with_near_field_ratio(mut self, ratio: f64) -> Self {
        self.near_field_ratio = ratio;
        self
    }

    pub fn tables(&self) -> &Arc<TabulatedIntegrals> {
        &self.tables
    }

    pub fn near_field_ratio(&self) -> f64 {
        self.near_field_ratio
    }
}

impl Default for Delhommeau {
    fn default() -> Self {
        Self::new(TabulationConfig::default())
    }
}

impl GreenFunction for Delhommeau {
    fn rankine(
        &self,
        receivers: &Collocation<'_>,
        sources: &Panels<'_>,
    ) -> (Array2<f64>, Array2<f64>) {
        rankine_matrices(receivers, sources, self.near_field_ratio)
    }

    fn wave(
        &self,
        receivers: &Collocation<'_>,
        sources: &Panels<'_>,
        params: &WaveParameters<'_>,
        same_mesh: bool,
    ) -> (Array2<Complex64>, Array2<Complex64>) {
        wave_matrices(&self.tables, receivers, sources, params, same_mesh)
    }
}
