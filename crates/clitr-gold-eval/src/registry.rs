//! Measure registry
//!
//! Maps measure ids to their evaluators in registration order.

use crate::error::TerminologyResult;
use crate::measures::{
    BloodPressureControl, BreastCancerScreening, ColorectalCancerScreening, Hba1cPoorControl,
    Measure, MeasureId,
};
use crate::terminology::ValueSetIndex;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Registered measure evaluators
#[derive(Clone, Default)]
pub struct MeasureRegistry {
    measures: IndexMap<MeasureId, Arc<dyn Measure>>,
}

impl MeasureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with CMS125, CMS130, CMS165 and CMS122
    pub fn with_standard_measures() -> Self {
        let mut registry = Self::new();
        registry.register(BreastCancerScreening);
        registry.register(ColorectalCancerScreening);
        registry.register(BloodPressureControl);
        registry.register(Hba1cPoorControl);
        registry
    }

    /// Register an evaluator, replacing any previous one with the same id
    pub fn register(&mut self, measure: impl Measure + 'static) -> &mut Self {
        self.measures.insert(measure.id(), Arc::new(measure));
        self
    }

    pub fn get(&self, id: MeasureId) -> Option<&Arc<dyn Measure>> {
        self.measures.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Measure>> {
        self.measures.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = MeasureId> + '_ {
        self.measures.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Check that `value_sets` defines every category each measure looks up
    pub fn validate(&self, value_sets: &ValueSetIndex) -> TerminologyResult<()> {
        for measure in self.iter() {
            value_sets.require(measure.id().as_str(), measure.required_categories())?;
        }
        Ok(())
    }
}

impl fmt::Debug for MeasureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
