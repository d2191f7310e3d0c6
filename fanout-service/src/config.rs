// Fan-Out Configuration
// Orchestrator-wide settings consumed by the admission check

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default maximum number of combinations a single matrix may produce
pub const DEFAULT_MAX_MATRIX_COMBINATIONS: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for matrix fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Maximum combinations accepted by the admission check
    #[serde(
        rename = "default-max-matrix-combinations-count",
        default = "default_max_combinations"
    )]
    pub max_combinations: usize,
}

fn default_max_combinations() -> usize {
    DEFAULT_MAX_MATRIX_COMBINATIONS
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_MATRIX_COMBINATIONS,
        }
    }
}

impl FanoutConfig {
    pub fn with_max_combinations(max_combinations: usize) -> Result<Self, ConfigError> {
        let config = Self { max_combinations };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: FanoutConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_combinations == 0 {
            return Err(ConfigError::Invalid(
                "default-max-matrix-combinations-count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
