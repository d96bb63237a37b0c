//! Memoization of the dense influence blocks
//!
//! Each of the three terms of the Green function (Rankine, image, wave) is
//! stored separately for a pair of meshes, so that the frequency-independent
//! terms are reused across frequencies.

use super::lru::{CacheStats, LruCache};
use crate::core::mesh::MeshId;
use ndarray::Array2;
use num_complex::Complex64;
use std::sync::Arc;

/// Influence matrices (S, V) of one block
pub type MatrixPair = (Array2<Complex64>, Array2<Complex64>);

/// Term of the Green function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GreenTerm {
    /// 1/r
    Rankine,
    /// Reflection across the free surface or the sea bottom
    Image,
    /// Wave part
    Wave,
}

/// Key of a block: the term, the meshes and the bit patterns of the
/// parameters the term depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockKey {
    term: GreenTerm,
    receivers: MeshId,
    sources: MeshId,
    parameters: Vec<u64>,
}

impl BlockKey {
    /// Key from floating point parameters, compared bit for bit
    pub fn new(term: GreenTerm, receivers: MeshId, sources: MeshId, parameters: &[f64]) -> Self {
        Self {
            term,
            receivers,
            sources,
            parameters: parameters.iter().map(|p| p.to_bits()).collect(),
        }
    }

    /// Term of the key
    pub fn term(&self) -> GreenTerm {
        self.term
    }
}

/// Bounded cache of influence blocks
#[derive(Debug, Clone)]
pub struct BlockCache {
    blocks: LruCache<BlockKey, Arc<MatrixPair>>,
    enabled: bool,
}

impl BlockCache {
    /// Cache of at most `capacity` blocks
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: LruCache::new(capacity),
            enabled: capacity > 0,
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Whether blocks are stored
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached block, or `compute()` stored under `key`
    pub fn get_or_compute<F>(&mut self, key: BlockKey, compute: F) -> Arc<MatrixPair>
    where
        F: FnOnce() -> MatrixPair,
    {
        if !self.enabled {
            return Arc::new(compute());
        }
        self.blocks.get_or_insert_with(key, || Arc::new(compute()))
    }

    /// Whether the block is stored; does not change the order
    pub fn contains(&self, key: &BlockKey) -> bool {
        self.blocks.contains_key(key)
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block is stored
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Capacity
    pub fn capacity(&self) -> usize {
        self.blocks.max_size()
    }

    /// Access counters
    pub fn stats(&self) -> CacheStats {
        self.blocks.stats()
    }

    /// Drop every block
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
