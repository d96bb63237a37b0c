//! Solver configuration in JSON or TOML
//!
//! Every field has a default, so partial files are accepted:
//!
//! ```json
//! {
//!     "tabulation": { "nb_theta": 81 },
//!     "decomposition": { "tolerance": 1e-5 },
//!     "cache": { "block_capacity": 128 }
//! }
//! ```

use std::fs;
use std::path::Path;

use math_hydro_green::TabulationConfig;
use math_hydro_green::rankine::DEFAULT_NEAR_FIELD_RATIO;
use serde::{Deserialize, Serialize};

use crate::core::decomposition::DecompositionConfig;

fn default_decomposition_capacity() -> usize {
    50
}
fn default_block_capacity() -> usize {
    64
}
fn default_true() -> bool {
    true
}
fn default_near_field_ratio() -> f64 {
    DEFAULT_NEAR_FIELD_RATIO
}

/// Sizes of the caches owned by a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Number of exponential decompositions kept
    #[serde(default = "default_decomposition_capacity")]
    pub decomposition_capacity: usize,

    /// Number of influence blocks kept
    #[serde(default = "default_block_capacity")]
    pub block_capacity: usize,

    /// Store influence blocks at all
    #[serde(default = "default_true")]
    pub store_blocks: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            decomposition_capacity: default_decomposition_capacity(),
            block_capacity: default_block_capacity(),
            store_blocks: true,
        }
    }
}

/// Configuration of a [`BemSolver`](crate::core::solver::BemSolver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Grid of the tabulated wave integrals
    #[serde(default)]
    pub tabulation: TabulationConfig,

    /// Fit of the finite depth kernel
    #[serde(default)]
    pub decomposition: DecompositionConfig,

    /// Cache sizes
    #[serde(default)]
    pub cache: CacheConfig,

    /// Distance, in panel radii, below which Rankine integrals are exact
    #[serde(default = "default_near_field_ratio")]
    pub near_field_ratio: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tabulation: TabulationConfig::default(),
            decomposition: DecompositionConfig::default(),
            cache: CacheConfig::default(),
            near_field_ratio: default_near_field_ratio(),
        }
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialize error
    #[error("Serialize error: {0}")]
    SerializeError(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl SolverConfig {
    /// Parse a configuration string
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
            }
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
            }
        }
    }

    /// Parse a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, ConfigFormat::Json)
    }

    /// Load a configuration file; the format follows the extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        let content = fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Load a JSON file, whatever its extension
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Serialize to a string
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::SerializeError(e.to_string())),
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
            }
        }
    }

    /// Set the tabulation grid
    pub fn with_tabulation(mut self, tabulation: TabulationConfig) -> Self {
        self.tabulation = tabulation;
        self
    }

    /// Set the decomposition driver
    pub fn with_decomposition(mut self, decomposition: DecompositionConfig) -> Self {
        self.decomposition = decomposition;
        self
    }

    /// Set the number of influence blocks kept; 0 disables the block cache
    pub fn with_block_capacity(mut self, capacity: usize) -> Self {
        self.cache.block_capacity = capacity;
        self
    }

    /// Enable or disable the block cache
    pub fn with_block_cache(mut self, enabled: bool) -> Self {
        self.cache.store_blocks = enabled;
        self
    }

    /// Set the number of exponential decompositions kept
    pub fn with_decomposition_capacity(mut self, capacity: usize) -> Self {
        self.cache.decomposition_capacity = capacity;
        self
    }
}
