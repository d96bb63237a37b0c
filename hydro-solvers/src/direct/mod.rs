//! Direct solvers for dense systems
//!
//! - [`lu_solve`]: LU decomposition with partial pivoting
//! - [`least_squares`]: Householder QR for tall real systems

mod least_squares;
mod lu;

pub use least_squares::{LeastSquaresError, RANK_TOLERANCE, least_squares};
pub use lu::{LuError, LuFactorization, lu_factorize, lu_solve};
