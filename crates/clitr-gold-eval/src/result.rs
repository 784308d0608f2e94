//! Evaluation results
//!
//! Evaluators build `MeasureResult` through its constructors, one per
//! terminal `PopulationState`.

use crate::measures::MeasureId;
use clitr_gold_types::ClinicalEvent;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Results of every registered measure for one patient, in registration order
pub type MeasureResults = IndexMap<MeasureId, MeasureResult>;

/// Terminal state of one (patient, measure) evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationState {
    NotInPopulation,
    Excluded,
    DenominatorOnly,
    Numerator,
}

/// Classification of one patient against one measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureResult {
    pub initial_population: bool,
    pub denominator: bool,
    pub numerator: bool,
    pub exclusion: bool,
    pub exclusion_reason: Option<String>,
    pub evidence: Option<ClinicalEvent>,
    pub debug_reason: Option<String>,
}

impl MeasureResult {
    /// Failed the initial population screen
    pub fn not_in_population(debug_reason: impl Into<String>) -> Self {
        Self {
            debug_reason: Some(debug_reason.into()),
            ..Self::default()
        }
    }

    /// In the initial population but removed by an exclusion
    pub fn excluded(reason: impl Into<String>) -> Self {
        Self {
            initial_population: true,
            exclusion: true,
            exclusion_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// In the denominator
    pub fn in_denominator(numerator: bool, evidence: Option<ClinicalEvent>) -> Self {
        Self {
            initial_population: true,
            denominator: true,
            numerator,
            evidence,
            ..Self::default()
        }
    }

    pub fn state(&self) -> PopulationState {
        match (self.initial_population, self.exclusion, self.numerator) {
            (false, _, _) => PopulationState::NotInPopulation,
            (true, true, _) => PopulationState::Excluded,
            (true, false, false) => PopulationState::DenominatorOnly,
            (true, false, true) => PopulationState::Numerator,
        }
    }

    pub fn verdict(&self) -> MeasureVerdict {
        MeasureVerdict {
            denominator: self.denominator,
            numerator: self.numerator,
            evidence: self.evidence.clone(),
        }
    }
}

/// `(denominator, numerator, evidence)` triple consumed by batch callers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureVerdict {
    pub denominator: bool,
    pub numerator: bool,
    pub evidence: Option<ClinicalEvent>,
}

impl MeasureVerdict {
    /// Verdict for an unknown patient or measure
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Gold-truth line written next to each model prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldTruthRecord {
    pub patient_id: String,
    pub measure: MeasureId,
    pub denominator: bool,
    pub numerator: bool,
    pub evidence: Option<ClinicalEvent>,
}

impl GoldTruthRecord {
    pub fn new(patient_id: impl Into<String>, measure: MeasureId, verdict: MeasureVerdict) -> Self {
        Self {
            patient_id: patient_id.into(),
            measure,
            denominator: verdict.denominator,
            numerator: verdict.numerator,
            evidence: verdict.evidence,
        }
    }
}

/// Population tallies for one measure over a cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub measure: MeasureId,
    pub total_checked: usize,
    pub not_found: usize,
    pub failed_initial: usize,
    pub failed_exclusion: usize,
    pub denominator: usize,
    pub numerator: usize,
    /// Debug reasons of initial-population failures and exclusion reasons
    pub reasons: IndexMap<String, usize>,
}

impl PopulationSummary {
    pub fn new(measure: MeasureId) -> Self {
        Self {
            measure,
            total_checked: 0,
            not_found: 0,
            failed_initial: 0,
            failed_exclusion: 0,
            denominator: 0,
            numerator: 0,
            reasons: IndexMap::new(),
        }
    }

    pub fn record(&mut self, result: &MeasureResult) {
        self.total_checked += 1;
        match result.state() {
            PopulationState::NotInPopulation => {
                self.failed_initial += 1;
                self.count_reason(result.debug_reason.as_deref());
            }
            PopulationState::Excluded => {
                self.failed_exclusion += 1;
                self.count_reason(result.exclusion_reason.as_deref());
            }
            PopulationState::DenominatorOnly => self.denominator += 1,
            PopulationState::Numerator => {
                self.denominator += 1;
                self.numerator += 1;
            }
        }
    }

    pub fn record_not_found(&mut self) {
        self.not_found += 1;
    }

    /// Numerator / denominator, `None` for an empty denominator
    pub fn compliance_rate(&self) -> Option<f64> {
        (self.denominator > 0).then(|| self.numerator as f64 / self.denominator as f64)
    }

    fn count_reason(&mut self, reason: Option<&str>) {
        if let Some(reason) = reason {
            *self.reasons.entry(reason.to_string()).or_insert(0) += 1;
        }
    }
}
