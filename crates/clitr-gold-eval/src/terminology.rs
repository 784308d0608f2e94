//! Terminology index
//!
//! Loads the value-set asset once and answers exact code membership
//! questions: is `code` in category `category` of measure `measure`.
//!
//! The asset is a JSON document keyed by measure id:
//!
//! ```json
//! {
//!   "CMS125": {
//!     "value_sets": {
//!       "Mammography": [{ "code": "77067", "system": "CPT", "display": "..." }]
//!     }
//!   }
//! }
//! ```
//!
//! Only `code` is used; systems and displays are informational.

use crate::error::{TerminologyError, TerminologyResult};
use log::debug;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

static EMPTY: LazyLock<CodeSet> = LazyLock::new(CodeSet::default);

/// A set of codes for one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSet {
    codes: HashSet<String>,
}

impl CodeSet {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(Into::into)
                .filter(|c: &String| !c.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Deserialize)]
struct MeasureDocument {
    #[serde(default)]
    value_sets: HashMap<String, Vec<CodeEntry>>,
}

#[derive(Deserialize)]
struct CodeEntry {
    #[serde(default)]
    code: String,
}

/// measure id → category name → codes
#[derive(Debug, Clone, Default)]
pub struct ValueSetIndex {
    measures: HashMap<String, HashMap<String, CodeSet>>,
}

impl ValueSetIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the value-set asset from a JSON string
    pub fn from_json(json: &str) -> TerminologyResult<Self> {
        let documents: HashMap<String, MeasureDocument> = serde_json::from_str(json)?;

        let measures = documents
            .into_iter()
            .map(|(measure, doc)| {
                let categories = doc
                    .value_sets
                    .into_iter()
                    .map(|(category, entries)| {
                        (category, CodeSet::new(entries.into_iter().map(|e| e.code)))
                    })
                    .collect();
                (measure, categories)
            })
            .collect();

        Ok(Self { measures })
    }

    /// Load the value-set asset from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> TerminologyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TerminologyError::io(path, e))?;
        let index = Self::from_json(&json)?;
        debug!(
            "Loaded terminology for {} measures from {}",
            index.measures.len(),
            path.display()
        );
        Ok(index)
    }

    /// Add or replace a category
    pub fn insert<I, S>(&mut self, measure: &str, category: &str, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.measures
            .entry(measure.to_string())
            .or_default()
            .insert(category.to_string(), CodeSet::new(codes));
    }

    /// Builder-style `insert`
    pub fn with_category<I, S>(mut self, measure: &str, category: &str, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(measure, category, codes);
        self
    }

    pub fn category(&self, measure: &str, category: &str) -> Option<&CodeSet> {
        self.measures.get(measure)?.get(category)
    }

    /// Codes of a category, or an empty set when it is not defined
    pub fn codes(&self, measure: &str, category: &str) -> &CodeSet {
        self.category(measure, category).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, measure: &str, category: &str, code: &str) -> bool {
        self.codes(measure, category).contains(code)
    }

    /// Fail on the first of `categories` not defined for `measure`
    pub fn require(&self, measure: &str, categories: &[&str]) -> TerminologyResult<()> {
        for category in categories {
            if self.category(measure, category).is_none() {
                return Err(TerminologyError::missing_category(measure, *category));
            }
        }
        Ok(())
    }
}
