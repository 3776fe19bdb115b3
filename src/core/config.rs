//! Run configuration passed explicitly into every phase.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default k-mer size
pub const DEFAULT_KMER_SIZE: usize = 31;

/// Default number of reads between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100_000;

/// Default number of reads classified per parallel batch
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Parameters for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Length of the k-mers indexed and scanned
    pub kmer_size: usize,

    /// Use rayon for index extraction and read classification
    pub parallel: bool,

    /// Worker threads for parallel phases (rayon default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Reads between progress notifications
    pub progress_interval: usize,

    /// Reads held in memory per parallel classification batch
    pub batch_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kmer_size: DEFAULT_KMER_SIZE,
            parallel: false,
            threads: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_kmer_size(mut self, kmer_size: usize) -> Self {
        self.kmer_size = kmer_size;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::ParseError` for malformed JSON, or `ConfigError::Invalid`
    /// if validation fails.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a size parameter is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kmer_size == 0 {
            return Err(ConfigError::Invalid("kmer_size must be positive".to_string()));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".to_string()));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be positive".to_string()));
        }
        Ok(())
    }
}
