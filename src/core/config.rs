/// Engine tuning, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every field is optional in the file; missing fields take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A generated sentence scoring below this against its predecessor is
    /// drawn once more.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Deepest allowed rule nesting before expansion gives up.
    #[serde(default = "default_max_expansion_depth")]
    pub max_expansion_depth: usize,
    /// Story length used when the caller does not give one.
    #[serde(default = "default_story_length")]
    pub story_length: usize,
    /// Grammar symbol every sentence is expanded from.
    #[serde(default = "default_start_symbol")]
    pub start_symbol: String,
}

fn default_similarity_threshold() -> f64 {
    0.2
}

fn default_max_expansion_depth() -> usize {
    32
}

fn default_story_length() -> usize {
    3
}

fn default_start_symbol() -> String {
    "SENTENCE".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_expansion_depth: default_max_expansion_depth(),
            story_length: default_story_length(),
            start_symbol: default_start_symbol(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a RON string and validate it.
    pub fn from_ron(input: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_expansion_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_expansion_depth must be at least 1".to_string(),
            ));
        }
        if self.start_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("start_symbol is empty".to_string()));
        }
        Ok(())
    }
}
