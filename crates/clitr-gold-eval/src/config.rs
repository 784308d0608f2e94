//! Engine configuration
//!
//! Every field has a default matching the benchmark's data layout, so an
//! empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "index_date": "2025-12-31",
//!   "data_dir": "data_generation/output/canonical",
//!   "terminology_path": "terminology/minimal_value_sets.json"
//! }
//! ```

use crate::error::{ConfigError, ConfigResult};
use chrono::NaiveDate;
use clitr_gold_store::SourceFiles;
use clitr_gold_types::parse_date;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data_generation/output/canonical";
pub const DEFAULT_TERMINOLOGY_PATH: &str = "terminology/minimal_value_sets.json";

/// December 31, 2025
pub fn default_index_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or(NaiveDate::MIN)
}

/// Parse an index date given as `YYYY-MM-DD`
pub fn parse_index_date(value: &str) -> ConfigResult<NaiveDate> {
    parse_date(value).ok_or_else(|| ConfigError::invalid_index_date(value))
}

/// Settings for building a `GoldTruthEngine`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reference date for ages and lookback windows
    pub index_date: NaiveDate,
    /// Directory holding `patients.csv`, `encounters.csv` and `events.csv`
    pub data_dir: PathBuf,
    /// Explicit source paths; overrides `data_dir` when set
    pub sources: Option<SourceFiles>,
    pub terminology_path: PathBuf,
    /// Evaluate cohorts on the rayon pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_date: default_index_date(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sources: None,
            terminology_path: PathBuf::from(DEFAULT_TERMINOLOGY_PATH),
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Resolved source locations
    pub fn source_files(&self) -> SourceFiles {
        self.sources
            .clone()
            .unwrap_or_else(|| SourceFiles::in_dir(&self.data_dir))
    }
}

/// Builder for `EngineConfig`
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_date(mut self, index_date: NaiveDate) -> Self {
        self.config.index_date = index_date;
        self
    }

    /// Set the index date from a `YYYY-MM-DD` string
    pub fn index_date_str(self, value: &str) -> ConfigResult<Self> {
        Ok(self.index_date(parse_index_date(value)?))
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    pub fn sources(mut self, sources: SourceFiles) -> Self {
        self.config.sources = Some(sources);
        self
    }

    pub fn terminology_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.terminology_path = path.into();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
