//! Errors for terminology loading, configuration and the evaluation facade

use clitr_gold_store::StoreError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for facade operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for terminology operations
pub type TerminologyResult<T> = Result<T, TerminologyError>;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating the value-set asset
#[derive(Debug, Error)]
pub enum TerminologyError {
    /// The asset could not be read
    #[error("Cannot read terminology asset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The asset is not valid JSON of the expected shape
    #[error("Invalid terminology asset: {source}")]
    Parse { source: serde_json::Error },

    /// A registered measure needs a category the asset does not define
    #[error("Value set '{category}' not defined for measure {measure}")]
    MissingCategory { measure: String, category: String },
}

impl TerminologyError {
    /// Create an I/O error
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a missing category error
    pub fn missing_category(measure: impl Into<String>, category: impl Into<String>) -> Self {
        Self::MissingCategory {
            measure: measure.into(),
            category: category.into(),
        }
    }
}

impl From<serde_json::Error> for TerminologyError {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse { source }
    }
}

/// Errors raised while loading an `EngineConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {source}")]
    Parse { source: serde_json::Error },

    #[error("Invalid index date: {value}")]
    InvalidIndexDate { value: String },
}

impl ConfigError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_index_date(value: impl Into<String>) -> Self {
        Self::InvalidIndexDate {
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse { source }
    }
}

/// Errors surfaced by the evaluation facade
///
/// Unknown patients and unknown measures are not errors; they come back as
/// `None` or as an all-false verdict.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Terminology(#[from] TerminologyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
