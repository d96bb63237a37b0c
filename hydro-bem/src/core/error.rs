//! Error types of the BEM solver.
//!
//! Library errors use `thiserror`, with helper methods to sort them by
//! category.

use math_hydro_solvers::{BlockMatrixError, LeastSquaresError, LuError, PolynomialError};
use thiserror::Error;

/// Errors raised while building meshes and symmetric composites.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// The vertex array is not `(n, 3)`.
    #[error("vertices must be an (n, 3) array, got {rows}x{cols}")]
    VertexShape {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// A face refers to a vertex that does not exist.
    #[error("face {face} refers to vertex {vertex} but the mesh has {nb_vertices} vertices")]
    VertexOutOfRange {
        /// Face index
        face: usize,
        /// Offending vertex index
        vertex: usize,
        /// Number of vertices in the mesh
        nb_vertices: usize,
    },

    /// A face has fewer than three distinct vertices or no area.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// Face index
        face: usize,
    },

    /// A direction vector (plane normal, axis) has zero length.
    #[error("direction vector has zero length")]
    ZeroDirection,

    /// Reflection planes must contain the vertical direction.
    #[error("symmetry plane must be vertical, its normal is {normal:?}")]
    NonVerticalPlane {
        /// Unit normal of the rejected plane
        normal: [f64; 3],
    },

    /// Translation vectors must be horizontal and non-zero.
    #[error("translation vector must be horizontal and non-zero, got {vector:?}")]
    InvalidTranslation {
        /// Rejected vector
        vector: [f64; 3],
    },

    /// Repeated composites need at least one copy.
    #[error("number of repetitions must be at least 1, got {0}")]
    InvalidRepetitions(usize),

    /// A revolution profile needs at least two points.
    #[error("profile needs at least two points, got {0}")]
    ProfileTooShort(usize),

    /// Merging needs at least one mesh.
    #[error("cannot merge an empty list of meshes")]
    EmptyMerge,

    /// Composites can only be joined when they share their symmetry.
    #[error("cannot join {first} and {other}: different {parameter}")]
    SymmetryMismatch {
        /// Name of the first composite
        first: String,
        /// Name of the offending composite
        other: String,
        /// Parameter that differs
        parameter: &'static str,
    },
}

/// Errors of the exponential fit.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// The sample grid is too short for the requested number of terms.
    #[error("{needed} samples are needed for {terms} terms, got {got}")]
    NotEnoughSamples {
        /// Requested number of terms
        terms: usize,
        /// Minimum number of samples
        needed: usize,
        /// Number of samples given
        got: usize,
    },

    /// Samples and abscissas have different lengths.
    #[error("{x} abscissas for {f} samples")]
    LengthMismatch {
        /// Number of abscissas
        x: usize,
        /// Number of sampled values
        f: usize,
    },

    /// Prony's method needs equally spaced abscissas.
    #[error("abscissas are not equally spaced")]
    NonUniformGrid,

    /// No root of the prediction polynomial gives an admissible exponent.
    #[error("no admissible exponent found")]
    NoExponent,

    /// Linear least squares failed.
    #[error("least squares failed: {0}")]
    LeastSquares(#[from] LeastSquaresError),

    /// The root finder did not converge.
    #[error("root finding failed: {0}")]
    Roots(#[from] PolynomialError),
}

/// Errors of the BEM solver.
#[derive(Debug, Error)]
pub enum BemError {
    /// Invalid mesh or symmetry parameters.
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// The exponential decomposition could not be computed at all.
    #[error("exponential fit failed: {0}")]
    Fit(#[from] FitError),

    /// Inconsistent block structure.
    #[error("block matrix error: {0}")]
    BlockMatrix(#[from] BlockMatrixError),

    /// The boundary integral system could not be solved.
    #[error("linear solve failed: {0}")]
    LinearSolve(#[from] LuError),

    /// Derived quantities need the source distribution of the result.
    #[error("sources not available: solve the problem again with keep_details = true")]
    SourcesNotAvailable,

    /// The problem refers to a degree of freedom the body does not have.
    #[error("unknown degree of freedom: {0}")]
    UnknownDof(String),

    /// Invalid physical parameters.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// A boundary condition or dof does not match the mesh.
    #[error("size mismatch: expected {expected} values, got {got}")]
    SizeMismatch {
        /// Number of faces
        expected: usize,
        /// Number of values given
        got: usize,
    },

    /// The worker pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

/// A specialized `Result` type for the solver.
pub type Result<T> = std::result::Result<T, BemError>;

impl BemError {
    /// Returns `true` for errors in the definition of the problem
    /// (mesh, dofs, physical parameters).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BemError::Mesh(_)
                | BemError::UnknownDof(_)
                | BemError::InvalidProblem(_)
                | BemError::SizeMismatch { .. }
        )
    }

    /// Returns `true` for numerical failures.
    pub fn is_numerical_error(&self) -> bool {
        matches!(
            self,
            BemError::Fit(_) | BemError::BlockMatrix(_) | BemError::LinearSolve(_)
        )
    }
}
