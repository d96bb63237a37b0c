//! Block-Toeplitz matrices.
//!
//! Block `(i, j)` only depends on `j - i`. The first block row holds the
//! offsets `0, 1, …, n-1`; the first block column holds the offsets
//! `-1, …, -(n-1)` unless the matrix is symmetric in its block index, in
//! which case block `(i, j)` is `row[|i - j|]`.

use super::{BlockMatrix, BlockMatrixError, common_block_shape};
use crate::traits::ComplexField;
use ndarray::{Array1, Array2, ArrayView1, s};

/// Block-Toeplitz matrix whose generating blocks may themselves be structured
#[derive(Debug, Clone)]
pub struct BlockToeplitz<T: ComplexField> {
    row: Vec<BlockMatrix<T>>,
    column: Option<Vec<BlockMatrix<T>>>,
    block_shape: (usize, usize),
}

impl<T: ComplexField> BlockToeplitz<T> {
    /// Build from the first block row and the first block column below the
    /// diagonal (`first_column[k - 1]` is block `(k, 0)`).
    pub fn new(
        first_row: Vec<BlockMatrix<T>>,
        first_column: Vec<BlockMatrix<T>>,
    ) -> Result<Self, BlockMatrixError> {
        let expected = first_row.len().saturating_sub(1);
        if first_column.len() != expected {
            return Err(BlockMatrixError::GeneratorCount {
                expected,
                got: first_column.len(),
            });
        }
        let block_shape = common_block_shape(first_row.iter().chain(first_column.iter()))?;
        Ok(Self {
            row: first_row,
            column: Some(first_column),
            block_shape,
        })
    }

    /// Build a matrix with `block(i, j) = first_row[|i - j|]`
    pub fn symmetric(first_row: Vec<BlockMatrix<T>>) -> Result<Self, BlockMatrixError> {
        let block_shape = common_block_shape(first_row.iter())?;
        Ok(Self {
            row: first_row,
            column: None,
            block_shape,
        })
    }

    /// Number of blocks along each side
    pub fn nb_blocks(&self) -> usize {
        self.row.len()
    }

    /// Shape of one block
    pub fn block_shape(&self) -> (usize, usize) {
        self.block_shape
    }

    /// Full shape of the matrix
    pub fn shape(&self) -> (usize, usize) {
        let n = self.nb_blocks();
        (n * self.block_shape.0, n * self.block_shape.1)
    }

    /// Whether the lower blocks mirror the upper ones
    pub fn is_symmetric(&self) -> bool {
        self.column.is_none()
    }

    /// Generating blocks of the first row
    pub fn first_row(&self) -> &[BlockMatrix<T>] {
        &self.row
    }

    /// Generating blocks of the first column below the diagonal, if stored
    pub fn first_column(&self) -> Option<&[BlockMatrix<T>]> {
        self.column.as_deref()
    }

    /// Block at block-row `i`, block-column `j`
    pub fn block(&self, i: usize, j: usize) -> &BlockMatrix<T> {
        if j >= i {
            &self.row[j - i]
        } else {
            match &self.column {
                Some(column) => &column[i - j - 1],
                None => &self.row[i - j],
            }
        }
    }

    fn generator_index(&self, i: usize, j: usize) -> usize {
        let n = self.nb_blocks();
        match (&self.column, j >= i) {
            (_, true) => j - i,
            (None, false) => i - j,
            (Some(_), false) => n + (i - j - 1),
        }
    }

    fn generators(&self) -> impl Iterator<Item = &BlockMatrix<T>> {
        self.row.iter().chain(self.column.iter().flatten())
    }

    /// Materialise the full matrix, each generating block densified once
    pub fn to_dense(&self) -> Array2<T> {
        let dense_blocks: Vec<Array2<T>> = self.generators().map(BlockMatrix::to_dense).collect();
        let (br, bc) = self.block_shape;
        let n = self.nb_blocks();
        let mut full = Array2::zeros((n * br, n * bc));
        for i in 0..n {
            for j in 0..n {
                let block = &dense_blocks[self.generator_index(i, j)];
                full.slice_mut(s![i * br..(i + 1) * br, j * bc..(j + 1) * bc])
                    .assign(block);
            }
        }
        full
    }

    /// Matrix-vector product evaluated block by block
    pub fn matvec(&self, x: &ArrayView1<T>) -> Array1<T> {
        let (br, bc) = self.block_shape;
        let n = self.nb_blocks();
        let mut y = Array1::zeros(n * br);
        for j in 0..n {
            let xj = x.slice(s![j * bc..(j + 1) * bc]);
            for i in 0..n {
                let contribution = self.block(i, j).matvec(&xj);
                let mut yi = y.slice_mut(s![i * br..(i + 1) * br]);
                yi += &contribution;
            }
        }
        y
    }

    pub(crate) fn same_structure(&self, other: &Self) -> bool {
        self.nb_blocks() == other.nb_blocks()
            && self.is_symmetric() == other.is_symmetric()
            && self.block_shape == other.block_shape
    }

    pub(crate) fn add_blockwise(&self, other: &Self) -> Result<Self, BlockMatrixError> {
        let row = pairwise_sum(&self.row, &other.row)?;
        let column = match (&self.column, &other.column) {
            (Some(a), Some(b)) => Some(pairwise_sum(a, b)?),
            _ => None,
        };
        Ok(Self {
            row,
            column,
            block_shape: self.block_shape,
        })
    }

    pub(crate) fn map_generators(&self, f: impl Fn(&BlockMatrix<T>) -> BlockMatrix<T>) -> Self {
        Self {
            row: self.row.iter().map(&f).collect(),
            column: self.column.as_ref().map(|c| c.iter().map(&f).collect()),
            block_shape: self.block_shape,
        }
    }

    /// Add `value` on the diagonal; only the zero-offset block is touched
    pub(crate) fn add_to_diagonal(&mut self, value: T) {
        self.row[0].add_to_diagonal(value);
    }

    pub(crate) fn transpose(&self) -> Self {
        let t = |b: &BlockMatrix<T>| b.transpose();
        let block_shape = (self.block_shape.1, self.block_shape.0);
        match &self.column {
            None => Self {
                row: self.row.iter().map(t).collect(),
                column: None,
                block_shape,
            },
            Some(column) => {
                let mut row = vec![self.row[0].transpose()];
                row.extend(column.iter().map(t));
                Self {
                    row,
                    column: Some(self.row[1..].iter().map(t).collect()),
                    block_shape,
                }
            }
        }
    }
}

fn pairwise_sum<T: ComplexField>(
    a: &[BlockMatrix<T>],
    b: &[BlockMatrix<T>],
) -> Result<Vec<BlockMatrix<T>>, BlockMatrixError> {
    a.iter().zip(b).map(|(x, y)| x.add(y)).collect()
}
