//! Gold-truth clinical quality measure evaluation
//!
//! This crate bundles the CLiTR-Bench gold-truth engine:
//! - Domain records and date arithmetic (`types`)
//! - The cohort-scoped patient store fed from CSV sources (`store`)
//! - Terminology, measure evaluators and the evaluation facade (`eval`)
//!
//! # Example
//!
//! ```ignore
//! use clitr_gold::{EngineConfig, GoldTruthEngine, MeasureId};
//!
//! let config = EngineConfig::builder()
//!     .index_date_str("2024-12-31")?
//!     .data_dir("data_generation/output/canonical")
//!     .build();
//! let engine = GoldTruthEngine::from_config(&config)?;
//!
//! let cohort = ["p1", "p2", "p3"];
//! for record in engine.evaluate_cohort(&cohort, MeasureId::Cms125)? {
//!     println!("{}", serde_json::to_string(&record)?);
//! }
//! ```

// Re-export all public APIs from internal crates
pub use clitr_gold_eval as eval;
pub use clitr_gold_store as store;
pub use clitr_gold_types as types;

// Convenience re-exports
pub use clitr_gold_eval::{
    EngineConfig, EngineError, EngineResult, GoldTruthEngine, GoldTruthRecord, MeasureId,
    MeasureResult, MeasureVerdict, PopulationSummary, ValueSetIndex,
};
pub use clitr_gold_store::{CohortStore, SourceFiles};
pub use clitr_gold_types::{ClinicalEvent, Encounter, Patient, Sex};
