//! Common test utilities for gold-truth evaluation
//!
//! This module provides shared testing infrastructure including:
//! - Builders for patients, encounters and coded events
//! - The terminology fixture
//! - A temp-directory CSV source writer

#![allow(dead_code)]

pub mod records;
pub mod sources;

pub use records::*;
pub use sources::*;

use clitr_gold::ValueSetIndex;

/// Value-set asset used by every integration test
pub const VALUE_SETS_JSON: &str = include_str!("../fixtures/value_sets.json");

pub fn value_sets() -> ValueSetIndex {
    ValueSetIndex::from_json(VALUE_SETS_JSON).expect("fixture value sets parse")
}
