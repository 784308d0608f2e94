//! Quality-measure evaluators
//!
//! Each measure is a stateless `Measure` implementation. Evaluation follows
//! the same shape everywhere:
//!
//! 1. Initial population: age band at the index date, optional sex, an
//!    encounter in the index year, plus any measure-specific diagnosis gate
//! 2. Exclusions: one pass over events setting flags, then a fixed precedence
//!    picks the recorded reason
//! 3. Denominator: in the population and not excluded
//! 4. Numerator: measure-specific, with the most recent qualifying event as
//!    evidence
//!
//! Measures:
//! - CMS125 Breast Cancer Screening (`BreastCancerScreening`)
//! - CMS130 Colorectal Cancer Screening (`ColorectalCancerScreening`)
//! - CMS165 Controlling High Blood Pressure (`BloodPressureControl`)
//! - CMS122 Diabetes HbA1c Poor Control (`Hba1cPoorControl`)

pub mod blood_pressure;
pub mod breast_cancer;
pub mod colorectal_cancer;
pub mod hba1c;

pub use blood_pressure::BloodPressureControl;
pub use breast_cancer::BreastCancerScreening;
pub use colorectal_cancer::ColorectalCancerScreening;
pub use hba1c::Hba1cPoorControl;

use crate::context::EvaluationContext;
use crate::result::MeasureResult;
use clitr_gold_types::{ClinicalEvent, Encounter, LookbackWindow, MeasurementPeriod, Patient, Sex, days_between};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a supported measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasureId {
    #[serde(rename = "CMS125")]
    Cms125,
    #[serde(rename = "CMS130")]
    Cms130,
    #[serde(rename = "CMS165")]
    Cms165,
    #[serde(rename = "CMS122")]
    Cms122,
}

impl MeasureId {
    pub const ALL: [MeasureId; 4] = [Self::Cms125, Self::Cms130, Self::Cms165, Self::Cms122];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cms125 => "CMS125",
            Self::Cms130 => "CMS130",
            Self::Cms165 => "CMS165",
            Self::Cms122 => "CMS122",
        }
    }
}

impl fmt::Display for MeasureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for measure ids the engine does not implement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown measure: {0}")]
pub struct UnknownMeasure(pub String);

impl FromStr for MeasureId {
    type Err = UnknownMeasure;

    /// Exact match on the canonical id; `cms122` is unknown
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownMeasure(s.to_string()))
    }
}

/// A quality measure evaluator
///
/// Implementations are pure: the result depends only on the arguments.
pub trait Measure: Send + Sync {
    fn id(&self) -> MeasureId;

    /// Human-readable measure name
    fn title(&self) -> &'static str;

    /// Terminology categories the evaluator looks up
    fn required_categories(&self) -> &'static [&'static str];

    /// Trailing window that any evidence this measure reports falls in
    ///
    /// Defaults to the measurement period.
    fn evidence_window(&self, period: &MeasurementPeriod) -> LookbackWindow {
        LookbackWindow::days(days_between(period.start, period.end))
    }

    /// Classify one patient; `events` need not be sorted
    fn evaluate(
        &self,
        ctx: &EvaluationContext<'_>,
        patient: &Patient,
        encounters: &[Encounter],
        events: &[ClinicalEvent],
    ) -> MeasureResult;
}

/// Demographic and utilization screen shared by all measures
#[derive(Debug, Clone)]
pub(crate) struct PopulationCriteria {
    pub ages: RangeInclusive<i32>,
    pub sex: Option<Sex>,
}

impl PopulationCriteria {
    /// Age at the index date on success, a debug reason on failure
    pub(crate) fn screen(
        &self,
        ctx: &EvaluationContext<'_>,
        patient: &Patient,
        encounters: &[Encounter],
    ) -> Result<i32, String> {
        let age = ctx.age_of(patient);
        let age_pass = self.ages.contains(&age);
        let has_encounter = ctx.has_encounter_in_index_year(encounters);

        match self.sex {
            Some(sex) => {
                let sex_pass = patient.sex == sex;
                if sex_pass && age_pass && has_encounter {
                    Ok(age)
                } else {
                    Err(format!(
                        "Failed IP: sex_pass={sex_pass}, age_pass={age_pass}, has_encounter={has_encounter}"
                    ))
                }
            }
            None if age_pass && has_encounter => Ok(age),
            None => Err(format!(
                "Failed IP: age_pass={age_pass}, has_encounter={has_encounter}"
            )),
        }
    }
}

/// Latest-dated event matching `pred`; on equal dates the earliest in slice
/// order wins
pub(crate) fn most_recent<'e>(
    events: &'e [ClinicalEvent],
    mut pred: impl FnMut(&ClinicalEvent) -> bool,
) -> Option<&'e ClinicalEvent> {
    events
        .iter()
        .filter(|e| pred(e))
        .fold(None, |best, event| match best {
            Some(current) if current.event_date >= event.event_date => Some(current),
            _ => Some(event),
        })
}
