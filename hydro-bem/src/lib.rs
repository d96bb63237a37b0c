//! # Hydro BEM: boundary element solver for wave-body interactions
//!
//! Linear potential flow around floating bodies, with influence matrices
//! assembled from a free-surface Green function.
//!
//! ## Features
//!
//! - Reflection, translation and axial symmetries of the mesh give
//!   block-Toeplitz and block-circulant influence matrices, nested to any depth
//! - Finite depth through a cached exponential decomposition of the kernel
//! - Bounded caches of influence blocks, reused across frequencies
//! - Parallel batch resolution with Rayon
//!

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod core;

pub use core::{
    BemError, BemSolver, BodyMesh, FloatingBody, LinearPotentialFlowProblem,
    LinearPotentialFlowResult, Result, SolverConfig,
};
pub use math_hydro_green::{Delhommeau, GreenFunction, TabulationConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");
