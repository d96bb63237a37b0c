//! High-level solver API
//!
//! [`BemSolver`] owns the Green function, the caches and the observer. A
//! resolution assembles the influence matrices of the body on itself,
//! solves `(V + ½I) σ = bc` for the source strengths, computes the potential
//! `φ = S σ` and integrates the pressure on each degree of freedom.
//!
//! # Example
//!
//! ```ignore
//! use math_hydro_bem::core::{BemSolver, FloatingBody, LinearPotentialFlowProblem, SolverConfig};
//!
//! let mut body = FloatingBody::new(mesh);
//! body.add_translation_dof([0.0, 0.0, 1.0], "Heave")?;
//! let problem = LinearPotentialFlowProblem::radiation(Arc::new(body), "Heave", 1.0)?;
//!
//! let mut solver = BemSolver::new(SolverConfig::default());
//! let result = solver.solve(&problem, false)?;
//! println!("added mass {:?}", result.added_mass("Heave"));
//! ```

use std::sync::Arc;

use math_hydro_green::{Delhommeau, GreenFunction};
use math_hydro_solvers::block;
use ndarray::Array1;
use num_complex::Complex64;

use crate::core::assembly::{Assembler, GreenParameters, InfluenceMatrices};
use crate::core::cache::{BlockCache, LruCache};
use crate::core::config::SolverConfig;
use crate::core::decomposition::{
    DecompositionKey, ExponentialDecomposition, decompose_finite_depth_kernel,
};
use crate::core::error::{BemError, Result};
use crate::core::mesh::BodyMesh;
use crate::core::observer::{AssemblyEvent, AssemblyObserver, LogObserver};
use crate::core::parallel::parallel_map_init;
use crate::core::problem::LinearPotentialFlowProblem;
use crate::core::result::LinearPotentialFlowResult;

/// Panels larger than this fraction of the wavelength trigger a warning
const PANELS_PER_WAVELENGTH: f64 = 8.0;

/// BEM solver for linear potential flow problems
#[derive(Debug, Clone)]
pub struct BemSolver {
    config: SolverConfig,
    green: Arc<dyn GreenFunction>,
    observer: Arc<dyn AssemblyObserver>,
    decompositions: LruCache<DecompositionKey, ExponentialDecomposition>,
    blocks: BlockCache,
}

impl Default for BemSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl BemSolver {
    /// Solver with Delhommeau's Green function, tabulated once here
    pub fn new(config: SolverConfig) -> Self {
        let green = Delhommeau::new(config.tabulation).with_near_field_ratio(config.near_field_ratio);
        Self::with_green_function(config, Arc::new(green))
    }

    /// Solver using an existing Green function
    pub fn with_green_function(config: SolverConfig, green: Arc<dyn GreenFunction>) -> Self {
        let blocks = if config.cache.store_blocks {
            BlockCache::new(config.cache.block_capacity)
        } else {
            BlockCache::disabled()
        };
        Self {
            decompositions: LruCache::new(config.cache.decomposition_capacity),
            blocks,
            config,
            green,
            observer: Arc::new(LogObserver),
        }
    }

    /// Report events to `observer` instead of the logger
    pub fn with_observer(mut self, observer: Arc<dyn AssemblyObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Same Green function and observer, empty caches
    pub fn fresh(&self) -> Self {
        Self::with_green_function(self.config.clone(), Arc::clone(&self.green))
            .with_observer(Arc::clone(&self.observer))
    }

    /// Configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Green function
    pub fn green_function(&self) -> &Arc<dyn GreenFunction> {
        &self.green
    }

    /// Cached exponential decompositions
    pub fn decomposition_cache(&self) -> &LruCache<DecompositionKey, ExponentialDecomposition> {
        &self.decompositions
    }

    /// Cached influence blocks
    pub fn block_cache(&self) -> &BlockCache {
        &self.blocks
    }

    /// Drop every cached decomposition and block
    pub fn clear_caches(&mut self) {
        self.decompositions.clear();
        self.blocks.clear();
    }

    /// Solve one problem.
    ///
    /// With `keep_details` the sources and the potential on the body are
    /// stored in the result, which is needed by
    /// [`get_potential_on_mesh`](Self::get_potential_on_mesh).
    pub fn solve(
        &mut self,
        problem: &LinearPotentialFlowProblem,
        keep_details: bool,
    ) -> Result<LinearPotentialFlowResult> {
        problem.validate()?;
        self.observer.notify(&AssemblyEvent::SolveStarted {
            problem: problem.to_string(),
        });

        let body = problem.body();
        let mesh = body.mesh();
        if problem.has_free_surface() {
            let max_radius = mesh.mesh().radiuses().fold(0.0, |m: f64, &r| m.max(r));
            let wavelength = problem.wavelength();
            if wavelength < PANELS_PER_WAVELENGTH * max_radius {
                self.observer.notify(&AssemblyEvent::CoarseMesh {
                    wavelength,
                    max_radius,
                });
            }
        }

        let params = problem.green_parameters();
        let (s, v) = self.build_matrices(mesh, mesh, &params, false)?;

        let boundary_condition = problem.boundary_condition()?;
        let mut lhs = v;
        lhs.add_to_diagonal(Complex64::new(0.5, 0.0));
        let sources = block::solve(&lhs, &boundary_condition)?;
        let potential = s.matvec(&sources.view());

        let mut result = LinearPotentialFlowResult::new(problem.clone());
        let areas = mesh.mesh().areas();
        for dof in body.dofs() {
            let normal_motion = body.normal_motion(&dof.name)?;
            let integrated: Complex64 = potential
                .iter()
                .zip(normal_motion.iter().zip(areas.iter()))
                .map(|(phi, (n, a))| phi * (n * a))
                .sum();
            result.store_force(dof.name.clone(), -problem.rho * integrated);
        }

        if keep_details {
            result.sources = Some(sources);
            result.potential = Some(potential);
        }
        log::debug!("Done solving {problem}");
        Ok(result)
    }

    /// Solve several problems with `workers` threads.
    ///
    /// Problems are sorted by frequency and depth and cut into `workers`
    /// runs of consecutive problems. Each run is solved by a fresh solver,
    /// so problems sharing a frequency reuse its caches. Results are
    /// returned in the order of `problems`.
    pub fn solve_all(
        &self,
        problems: &[LinearPotentialFlowProblem],
        workers: usize,
        keep_details: bool,
    ) -> Result<Vec<LinearPotentialFlowResult>> {
        let mut order: Vec<(usize, &LinearPotentialFlowProblem)> = problems.iter().enumerate().collect();
        order.sort_by(|(_, a), (_, b)| {
            let (a, b) = (a.sort_key(), b.sort_key());
            a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
        });

        let solved = parallel_map_init(
            workers.max(1),
            &order,
            || self.fresh(),
            |solver, &(index, problem)| (index, solver.solve(problem, keep_details)),
        )?;

        let mut results: Vec<Option<LinearPotentialFlowResult>> = vec![None; problems.len()];
        for (index, result) in solved {
            results[index] = Some(result?);
        }
        Ok(results.into_iter().flatten().collect())
    }

    /// Exponential decomposition needed by the wave term, from the cache
    /// or fitted. Infinite depth and unbounded fluid use the empty
    /// decomposition.
    pub fn exponential_decomposition(
        &mut self,
        params: &GreenParameters,
    ) -> Result<ExponentialDecomposition> {
        let Some(key) = params.decomposition_key() else {
            return Ok(ExponentialDecomposition::zero());
        };
        if let Some(decomposition) = self.decompositions.get(&key) {
            self.observer
                .notify(&AssemblyEvent::DecompositionReused { key });
            return Ok(decomposition.clone());
        }

        let decomposition = decompose_finite_depth_kernel(
            key.dimensionless_omega(),
            key.dimensionless_wavenumber(),
            &self.config.decomposition,
        )?;
        if !decomposition.is_converged() {
            self.observer.notify(&AssemblyEvent::DecompositionNotConverged {
                key,
                nb_terms: decomposition.nb_terms(),
            });
        }
        self.observer.notify(&AssemblyEvent::DecompositionComputed {
            key,
            nb_terms: decomposition.nb_terms(),
        });
        self.decompositions.put(key, decomposition.clone());
        Ok(decomposition)
    }

    /// Influence matrices `(S, V)` of the sources on `mesh2` at the faces
    /// of `mesh1`. With `force_full` the symmetries are ignored.
    pub fn build_matrices(
        &mut self,
        mesh1: &BodyMesh,
        mesh2: &BodyMesh,
        params: &GreenParameters,
        force_full: bool,
    ) -> Result<InfluenceMatrices> {
        let decomposition = self.exponential_decomposition(params)?;
        let mut assembler = Assembler::new(self.green.as_ref(), &mut self.blocks, self.observer.as_ref());
        assembler.assemble(mesh1, mesh2, params, &decomposition, force_full)
    }

    /// Potential generated on the faces of `mesh` by the sources of a
    /// solved problem
    pub fn get_potential_on_mesh(
        &mut self,
        result: &LinearPotentialFlowResult,
        mesh: &BodyMesh,
    ) -> Result<Array1<Complex64>> {
        let sources = result.sources.as_ref().ok_or(BemError::SourcesNotAvailable)?;
        log::info!("Compute potential on {} for {}.", mesh.name(), result.problem());
        let params = result.problem().green_parameters();
        let body_mesh = result.problem().body().mesh();
        let (s, _) = self.build_matrices(mesh, body_mesh, &params, false)?;
        Ok(s.matvec(&sources.view()))
    }

    /// Free surface elevation `iω/g φ` on the faces of `free_surface`.
    /// With `keep_details` it is also stored in the result.
    pub fn get_free_surface_elevation(
        &mut self,
        result: &mut LinearPotentialFlowResult,
        free_surface: &BodyMesh,
        keep_details: bool,
    ) -> Result<Array1<Complex64>> {
        let factor = Complex64::new(0.0, result.omega() / result.g());
        let elevation = self.get_potential_on_mesh(result, free_surface)? * factor;
        if keep_details {
            result.store_fs_elevation(free_surface.id(), elevation.clone());
        }
        Ok(elevation)
    }
}
