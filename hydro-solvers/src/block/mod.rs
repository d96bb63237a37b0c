//! Block-structured matrices arising from symmetric meshes
//!
//! A mesh made of copies of one sub-mesh (mirror images, translated or
//! rotated slices) produces influence matrices whose blocks repeat:
//!
//! - reflection: 2×2 symmetric block-Toeplitz
//! - translation: block-Toeplitz
//! - rotation: block-circulant
//!
//! [`BlockMatrix`] is the tagged union of these structures and the dense
//! matrix. Generators are themselves [`BlockMatrix`] values, so structures
//! nest when sub-meshes are themselves symmetric.

mod circulant;
mod toeplitz;

pub use circulant::{BlockCirculant, CirculantLayout};
pub use toeplitz::BlockToeplitz;

use crate::direct::{LuError, lu_solve};
use crate::traits::{ComplexField, LinearOperator};
use ndarray::{Array1, Array2, ArrayView1};
use thiserror::Error;

/// Errors raised when building or combining block matrices
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockMatrixError {
    #[error("A block matrix needs at least one generating block")]
    NoGenerators,
    #[error("Wrong number of generating blocks: expected {expected}, got {got}")]
    GeneratorCount { expected: usize, got: usize },
    #[error("Generating blocks have different shapes: {first:?} and {other:?}")]
    InconsistentBlocks {
        first: (usize, usize),
        other: (usize, usize),
    },
    #[error("Matrix shapes differ: {left:?} and {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

pub(crate) fn common_block_shape<'a, T: ComplexField>(
    mut blocks: impl Iterator<Item = &'a BlockMatrix<T>>,
) -> Result<(usize, usize), BlockMatrixError> {
    let first = blocks.next().ok_or(BlockMatrixError::NoGenerators)?.shape();
    for block in blocks {
        let other = block.shape();
        if other != first {
            return Err(BlockMatrixError::InconsistentBlocks { first, other });
        }
    }
    Ok(first)
}

/// Dense or block-structured matrix
#[derive(Debug, Clone)]
pub enum BlockMatrix<T: ComplexField> {
    /// Fully stored matrix
    Dense(Array2<T>),
    /// Block-Toeplitz matrix
    Toeplitz(BlockToeplitz<T>),
    /// Block-circulant matrix
    Circulant(BlockCirculant<T>),
}

impl<T: ComplexField> From<Array2<T>> for BlockMatrix<T> {
    fn from(matrix: Array2<T>) -> Self {
        BlockMatrix::Dense(matrix)
    }
}

impl<T: ComplexField> From<BlockToeplitz<T>> for BlockMatrix<T> {
    fn from(matrix: BlockToeplitz<T>) -> Self {
        BlockMatrix::Toeplitz(matrix)
    }
}

impl<T: ComplexField> From<BlockCirculant<T>> for BlockMatrix<T> {
    fn from(matrix: BlockCirculant<T>) -> Self {
        BlockMatrix::Circulant(matrix)
    }
}

impl<T: ComplexField> BlockMatrix<T> {
    /// (rows, columns) of the represented matrix
    pub fn shape(&self) -> (usize, usize) {
        match self {
            BlockMatrix::Dense(m) => m.dim(),
            BlockMatrix::Toeplitz(m) => m.shape(),
            BlockMatrix::Circulant(m) => m.shape(),
        }
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.shape().1
    }

    /// Whether the matrix is stored densely
    pub fn is_dense(&self) -> bool {
        matches!(self, BlockMatrix::Dense(_))
    }

    /// Number of scalars actually stored, counting shared blocks once
    pub fn nb_stored_values(&self) -> usize {
        match self {
            BlockMatrix::Dense(m) => m.len(),
            BlockMatrix::Toeplitz(m) => m
                .first_row()
                .iter()
                .chain(m.first_column().into_iter().flatten())
                .map(BlockMatrix::nb_stored_values)
                .sum(),
            BlockMatrix::Circulant(m) => m
                .generators()
                .iter()
                .map(BlockMatrix::nb_stored_values)
                .sum(),
        }
    }

    /// Materialise the full matrix
    pub fn to_dense(&self) -> Array2<T> {
        match self {
            BlockMatrix::Dense(m) => m.clone(),
            BlockMatrix::Toeplitz(m) => m.to_dense(),
            BlockMatrix::Circulant(m) => m.to_dense(),
        }
    }

    /// Materialise the full matrix, consuming the structure
    pub fn into_dense(self) -> Array2<T> {
        match self {
            BlockMatrix::Dense(m) => m,
            other => other.to_dense(),
        }
    }

    /// y = A x
    pub fn matvec(&self, x: &ArrayView1<T>) -> Array1<T> {
        match self {
            BlockMatrix::Dense(m) => {
                let mut y = Array1::zeros(m.nrows());
                for (yi, row) in y.iter_mut().zip(m.rows()) {
                    let mut acc = T::zero();
                    for (a, b) in row.iter().zip(x.iter()) {
                        acc += *a * *b;
                    }
                    *yi = acc;
                }
                y
            }
            BlockMatrix::Toeplitz(m) => m.matvec(x),
            BlockMatrix::Circulant(m) => m.matvec(x),
        }
    }

    /// Sum of two matrices of the same shape.
    ///
    /// Identical structures are added block for block and keep their
    /// structure; anything else is densified.
    pub fn add(&self, other: &Self) -> Result<Self, BlockMatrixError> {
        if self.shape() != other.shape() {
            return Err(BlockMatrixError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(match (self, other) {
            (BlockMatrix::Dense(a), BlockMatrix::Dense(b)) => BlockMatrix::Dense(a + b),
            (BlockMatrix::Toeplitz(a), BlockMatrix::Toeplitz(b)) if a.same_structure(b) => {
                BlockMatrix::Toeplitz(a.add_blockwise(b)?)
            }
            (BlockMatrix::Circulant(a), BlockMatrix::Circulant(b)) if a.same_structure(b) => {
                BlockMatrix::Circulant(a.add_blockwise(b)?)
            }
            _ => BlockMatrix::Dense(self.to_dense() + other.to_dense()),
        })
    }

    /// Every entry multiplied by `factor`
    pub fn scaled(&self, factor: T) -> Self {
        match self {
            BlockMatrix::Dense(m) => BlockMatrix::Dense(m.mapv(|v| v * factor)),
            BlockMatrix::Toeplitz(m) => {
                BlockMatrix::Toeplitz(m.map_generators(|b| b.scaled(factor)))
            }
            BlockMatrix::Circulant(m) => {
                BlockMatrix::Circulant(m.map_generators(|b| b.scaled(factor)))
            }
        }
    }

    /// A + value·I. Structured matrices with square diagonal blocks only
    /// update their zero-offset generator.
    pub fn add_to_diagonal(&mut self, value: T) {
        match self {
            BlockMatrix::Dense(m) => {
                for i in 0..m.nrows().min(m.ncols()) {
                    m[[i, i]] += value;
                }
            }
            BlockMatrix::Toeplitz(m) if m.block_shape().0 == m.block_shape().1 => {
                m.add_to_diagonal(value)
            }
            BlockMatrix::Circulant(m) if m.block_shape().0 == m.block_shape().1 => {
                m.add_to_diagonal(value)
            }
            _ => {
                let mut dense = self.to_dense();
                for i in 0..dense.nrows().min(dense.ncols()) {
                    dense[[i, i]] += value;
                }
                *self = BlockMatrix::Dense(dense);
            }
        }
    }

    /// Transposed matrix, keeping the structure
    pub fn transpose(&self) -> Self {
        match self {
            BlockMatrix::Dense(m) => BlockMatrix::Dense(m.t().to_owned()),
            BlockMatrix::Toeplitz(m) => BlockMatrix::Toeplitz(m.transpose()),
            BlockMatrix::Circulant(m) => BlockMatrix::Circulant(m.transpose()),
        }
    }
}

impl<T: ComplexField> LinearOperator<T> for BlockMatrix<T> {
    fn num_rows(&self) -> usize {
        self.nrows()
    }

    fn num_cols(&self) -> usize {
        self.ncols()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(&x.view())
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.transpose().matvec(&x.view())
    }
}

/// Solve A x = b; the matrix is densified and LU-factorized.
pub fn solve<T: ComplexField>(matrix: &BlockMatrix<T>, rhs: &Array1<T>) -> Result<Array1<T>, LuError> {
    match matrix {
        BlockMatrix::Dense(m) => lu_solve(m, rhs),
        structured => lu_solve(&structured.to_dense(), rhs),
    }
}
