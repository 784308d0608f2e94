//! Evaluation context for measure evaluation

use crate::measures::MeasureId;
use crate::terminology::{CodeSet, ValueSetIndex};
use chrono::NaiveDate;
use clitr_gold_types::{Encounter, MeasurementPeriod, Patient};

/// Read-only inputs shared by every evaluator call
///
/// Cheap to copy; holds the measurement period and a borrowed terminology
/// index.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub period: MeasurementPeriod,
    pub value_sets: &'a ValueSetIndex,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(index_date: NaiveDate, value_sets: &'a ValueSetIndex) -> Self {
        Self {
            period: MeasurementPeriod::ending(index_date),
            value_sets,
        }
    }

    pub fn index_date(&self) -> NaiveDate {
        self.period.index_date()
    }

    /// Codes of one category of `measure`
    pub fn codes(&self, measure: MeasureId, category: &str) -> &'a CodeSet {
        self.value_sets.codes(measure.as_str(), category)
    }

    pub fn age_of(&self, patient: &Patient) -> i32 {
        patient.age_at(self.index_date())
    }

    /// At least one encounter dated in the index year
    pub fn has_encounter_in_index_year(&self, encounters: &[Encounter]) -> bool {
        encounters
            .iter()
            .any(|e| self.period.in_index_year(e.encounter_date))
    }
}
