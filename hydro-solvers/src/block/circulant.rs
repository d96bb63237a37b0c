//! Block-circulant matrices.
//!
//! Block `(i, j)` only depends on `(j - i) mod N`. Two storage layouts:
//!
//! - [`CirculantLayout::Full`]: the whole first block row (`N` generators)
//! - [`CirculantLayout::Mirrored`]: `N/2 + 1` generators and
//!   `c[k] = c[N - k]`, valid when the interaction between slices only
//!   depends on their angular distance. For even `N` the last generator is
//!   the antipodal block.

use super::{BlockMatrix, BlockMatrixError, common_block_shape};
use crate::traits::ComplexField;
use ndarray::{Array1, Array2, ArrayView1, s};

/// Storage layout of the generating blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CirculantLayout {
    /// Every block of the first row is stored
    Full,
    /// Only offsets `0..=N/2` are stored, the others are mirrored
    Mirrored,
}

use CirculantLayout as Layout;

/// Block-circulant matrix of `size × size` blocks
#[derive(Debug, Clone)]
pub struct BlockCirculant<T: ComplexField> {
    generators: Vec<BlockMatrix<T>>,
    size: usize,
    layout: Layout,
    block_shape: (usize, usize),
}

impl<T: ComplexField> BlockCirculant<T> {
    /// Build from the full first block row
    pub fn new(first_row: Vec<BlockMatrix<T>>) -> Result<Self, BlockMatrixError> {
        let block_shape = common_block_shape(first_row.iter())?;
        Ok(Self {
            size: first_row.len(),
            generators: first_row,
            layout: Layout::Full,
            block_shape,
        })
    }

    /// Build an `size × size` block matrix from the blocks at offsets
    /// `0..=size/2`, the remaining offsets being mirrored.
    pub fn from_mirrored(
        generators: Vec<BlockMatrix<T>>,
        size: usize,
    ) -> Result<Self, BlockMatrixError> {
        let expected = size / 2 + 1;
        if size == 0 || generators.len() != expected {
            return Err(BlockMatrixError::GeneratorCount {
                expected,
                got: generators.len(),
            });
        }
        let block_shape = common_block_shape(generators.iter())?;
        Ok(Self {
            generators,
            size,
            layout: Layout::Mirrored,
            block_shape,
        })
    }

    /// Number of blocks along each side
    pub fn nb_blocks(&self) -> usize {
        self.size
    }

    /// Shape of one block
    pub fn block_shape(&self) -> (usize, usize) {
        self.block_shape
    }

    /// Full shape of the matrix
    pub fn shape(&self) -> (usize, usize) {
        (self.size * self.block_shape.0, self.size * self.block_shape.1)
    }

    /// Storage layout
    pub fn layout(&self) -> CirculantLayout {
        self.layout
    }

    /// Stored generating blocks
    pub fn generators(&self) -> &[BlockMatrix<T>] {
        &self.generators
    }

    fn generator_index(&self, i: usize, j: usize) -> usize {
        let offset = (j + self.size - i % self.size) % self.size;
        match self.layout {
            Layout::Full => offset,
            Layout::Mirrored => offset.min(self.size - offset),
        }
    }

    /// Block at block-row `i`, block-column `j`
    pub fn block(&self, i: usize, j: usize) -> &BlockMatrix<T> {
        &self.generators[self.generator_index(i, j)]
    }

    /// Materialise the full matrix, each generating block densified once
    pub fn to_dense(&self) -> Array2<T> {
        let dense_blocks: Vec<Array2<T>> =
            self.generators.iter().map(BlockMatrix::to_dense).collect();
        let (br, bc) = self.block_shape;
        let n = self.size;
        let mut full = Array2::zeros((n * br, n * bc));
        for i in 0..n {
            for j in 0..n {
                full.slice_mut(s![i * br..(i + 1) * br, j * bc..(j + 1) * bc])
                    .assign(&dense_blocks[self.generator_index(i, j)]);
            }
        }
        full
    }

    /// Matrix-vector product; each generator is applied once per column
    /// block and the result scattered to the rows sharing it.
    pub fn matvec(&self, x: &ArrayView1<T>) -> Array1<T> {
        let (br, bc) = self.block_shape;
        let n = self.size;
        let mut y = Array1::zeros(n * br);
        for j in 0..n {
            let xj = x.slice(s![j * bc..(j + 1) * bc]);
            let products: Vec<Array1<T>> =
                self.generators.iter().map(|g| g.matvec(&xj)).collect();
            for i in 0..n {
                let mut yi = y.slice_mut(s![i * br..(i + 1) * br]);
                yi += &products[self.generator_index(i, j)];
            }
        }
        y
    }

    pub(crate) fn same_structure(&self, other: &Self) -> bool {
        self.size == other.size
            && self.layout == other.layout
            && self.block_shape == other.block_shape
    }

    pub(crate) fn add_blockwise(&self, other: &Self) -> Result<Self, BlockMatrixError> {
        let generators = self
            .generators
            .iter()
            .zip(&other.generators)
            .map(|(a, b)| a.add(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            generators,
            size: self.size,
            layout: self.layout,
            block_shape: self.block_shape,
        })
    }

    pub(crate) fn map_generators(&self, f: impl Fn(&BlockMatrix<T>) -> BlockMatrix<T>) -> Self {
        Self {
            generators: self.generators.iter().map(f).collect(),
            size: self.size,
            layout: self.layout,
            block_shape: self.block_shape,
        }
    }

    pub(crate) fn add_to_diagonal(&mut self, value: T) {
        self.generators[0].add_to_diagonal(value);
    }

    pub(crate) fn transpose(&self) -> Self {
        let generators = match self.layout {
            Layout::Mirrored => self.generators.iter().map(BlockMatrix::transpose).collect(),
            Layout::Full => (0..self.size)
                .map(|k| self.generators[(self.size - k) % self.size].transpose())
                .collect(),
        };
        Self {
            generators,
            size: self.size,
            layout: self.layout,
            block_shape: (self.block_shape.1, self.block_shape.0),
        }
    }
}
