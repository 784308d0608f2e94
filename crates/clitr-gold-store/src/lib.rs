//! Cohort data store
//!
//! This crate provides:
//! - `SourceFiles`: locations of the patients, encounters and events CSV sources
//! - `CohortStore`: a patient-keyed cache populated either by a cohort preload
//!   (one sequential pass per source file) or lazily for a single patient
//! - `ScanStats`: counters for scans, rows read, rows matched and rows skipped
//!
//! # Example
//!
//! ```ignore
//! use clitr_gold_store::{CohortStore, SourceFiles};
//!
//! let store = CohortStore::new(SourceFiles::in_dir("data/canonical"));
//! store.preload(["p-1", "p-2"])?;
//! let data = store.get("p-1")?;
//! ```

pub mod error;
pub mod source;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use source::SourceFiles;
pub use store::{CohortStore, PatientData, ScanStats};
