//! Loading errors for the cohort store
//!
//! Only whole-file problems are errors. Bad rows are skipped and counted in
//! `ScanStats`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that abort a load
#[derive(Debug, Error)]
pub enum StoreError {
    /// A configured source file does not exist
    #[error("Source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// The file exists but could not be read
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV reader failed on the header or on the underlying stream
    #[error("CSV error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// The header row lacks a column the loader needs
    #[error("Missing column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl StoreError {
    /// Create a source-not-found error
    pub fn source_not_found(path: impl AsRef<Path>) -> Self {
        Self::SourceNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an I/O error
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a CSV error
    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a missing column error
    pub fn missing_column(path: impl AsRef<Path>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.as_ref().to_path_buf(),
            column: column.into(),
        }
    }
}
