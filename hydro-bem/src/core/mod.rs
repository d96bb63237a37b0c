//! Symmetry-aware BEM solver for linear wave-body hydrodynamics
//!
//! ## Architecture
//!
//! - `mesh`: panel meshes, symmetric composites and simple generators
//! - `decomposition`: exponential fit of the finite depth kernel
//! - `cache`: LRU caches of decompositions and influence blocks
//! - `assembly`: recursive assembly of the influence matrices
//! - `observer`: events reported by the assembler and the solver
//! - `problem`: floating bodies and linear potential flow problems
//! - `result`: forces, added masses and radiation dampings
//! - `config`: solver configuration (JSON, TOML)
//! - `solver`: high-level API
//! - `parallel`: portable parallel iteration (rayon or sequential)
//! - `error`: error types

pub mod assembly;
pub mod cache;
pub mod config;
pub mod decomposition;
pub mod error;
pub mod mesh;
pub mod observer;
pub mod parallel;
pub mod problem;
pub mod result;
pub mod solver;

// Re-exports for convenience
pub use assembly::{Assembler, GreenParameters, InfluenceMatrices};
pub use cache::{BlockCache, BlockKey, CacheStats, GreenTerm, LruCache};
pub use config::{CacheConfig, ConfigError, ConfigFormat, SolverConfig};
pub use decomposition::{DecompositionConfig, DecompositionKey, ExponentialDecomposition};
pub use error::{BemError, FitError, MeshError, Result};
pub use mesh::{
    AxialSymmetry, Axis, BodyMesh, Mesh, MeshId, Plane, ReflectionSymmetry, TranslationalSymmetry,
};
pub use observer::{AssemblyEvent, AssemblyObserver, LogObserver, RecordingObserver, SymmetryKind};
pub use problem::{Dof, FloatingBody, LinearPotentialFlowProblem, ProblemKind};
pub use result::LinearPotentialFlowResult;
pub use solver::BemSolver;
