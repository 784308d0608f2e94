//! Gold-Truth Measure Evaluation
//!
//! This crate classifies patients against clinical quality measures and
//! produces the reference `(denominator, numerator, evidence)` verdicts that
//! model predictions are scored against.
//!
//! - **Terminology**: `ValueSetIndex` answers exact code membership per
//!   measure and category
//! - **Measures**: CMS125, CMS130, CMS165 and CMS122 as `Measure`
//!   implementations held in a `MeasureRegistry`
//! - **Facade**: `GoldTruthEngine` fetches patients from a `CohortStore`,
//!   evaluates them and summarizes cohorts
//!
//! # Example
//!
//! ```ignore
//! use clitr_gold_eval::{EngineConfig, GoldTruthEngine};
//!
//! let engine = GoldTruthEngine::from_config(&EngineConfig::default())?;
//! engine.preload(["p1", "p2"])?;
//! let verdict = engine.evaluate_patient("p1", "CMS125")?;
//! ```
//!
//! # Population logic
//!
//! Every evaluator moves a patient through the same stages:
//!
//! - initial population (age, sex, encounter in the index year, diagnosis)
//! - exclusion, with a fixed precedence among reasons
//! - denominator = initial population and not excluded
//! - numerator, with the qualifying event returned as evidence
//!
//! Evaluators are pure over the patient's materialized data, so cohorts are
//! evaluated in parallel once the store is loaded.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod measures;
pub mod registry;
pub mod result;
pub mod terminology;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use context::EvaluationContext;
pub use engine::GoldTruthEngine;
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult, TerminologyError, TerminologyResult};
pub use measures::{Measure, MeasureId, UnknownMeasure};
pub use registry::MeasureRegistry;
pub use result::{GoldTruthRecord, MeasureResult, MeasureResults, MeasureVerdict, PopulationState, PopulationSummary};
pub use terminology::{CodeSet, ValueSetIndex};
