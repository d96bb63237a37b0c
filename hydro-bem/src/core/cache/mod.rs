//! Caches owned by a solver
//!
//! - `lru`: generic least-recently-used cache
//! - `blocks`: influence blocks per Green function term

pub mod blocks;
pub mod lru;

pub use blocks::{BlockCache, BlockKey, GreenTerm, MatrixPair};
pub use lru::{CacheStats, LruCache};
