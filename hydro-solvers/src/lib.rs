//! Linear algebra for symmetric boundary element systems
//!
//! This crate provides the matrix side of the hydrodynamic BEM:
//!
//! # Features
//!
//! - **Block structures**: block-Toeplitz and block-circulant matrices whose
//!   generating blocks may themselves be structured ([`BlockMatrix`])
//! - **Direct solvers**: LU decomposition with partial pivoting, Householder
//!   QR least squares
//! - **Polynomial roots**: Aberth iteration, used by exponential fitting
//! - **Generic scalar types**: works with `Complex64` and `f64`
//!
//! # Example
//!
//! ```ignore
//! use math_hydro_solvers::{BlockMatrix, BlockToeplitz, block};
//!
//! let matrix: BlockMatrix<f64> = BlockToeplitz::symmetric(vec![a.into(), b.into()])?.into();
//! let x = block::solve(&matrix, &rhs)?;
//! ```

pub mod block;
pub mod direct;
pub mod polynomial;
pub mod traits;

pub use traits::{ComplexField, LinearOperator};

pub use block::{BlockCirculant, BlockMatrix, BlockMatrixError, BlockToeplitz, CirculantLayout};

pub use direct::{
    LeastSquaresError, LuError, LuFactorization, least_squares, lu_factorize, lu_solve,
};

pub use polynomial::{PolynomialError, polynomial_roots};
