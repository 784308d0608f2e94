//! CMS122 Diabetes: Hemoglobin A1c Poor Control
//!
//! An inverse measure: the numerator is the bad outcome. A diabetic patient
//! with no HbA1c result in the measurement period counts as poorly
//! controlled.

use super::{Measure, MeasureId, PopulationCriteria, most_recent};
use crate::context::EvaluationContext;
use crate::result::MeasureResult;
use clitr_gold_types::{ClinicalEvent, Encounter, Patient};

pub const DIABETES: &str = "Diabetes";
pub const HBA1C_TEST: &str = "HbA1c Test";

/// Poor control means a latest result strictly above this percentage
pub const POOR_CONTROL_THRESHOLD: f64 = 9.0;

/// Diabetic adults 18-75 whose latest HbA1c is above 9% or missing
#[derive(Debug, Clone, Copy, Default)]
pub struct Hba1cPoorControl;

impl Measure for Hba1cPoorControl {
    fn id(&self) -> MeasureId {
        MeasureId::Cms122
    }

    fn title(&self) -> &'static str {
        "Diabetes: Hemoglobin A1c Poor Control"
    }

    fn required_categories(&self) -> &'static [&'static str] {
        &[DIABETES, HBA1C_TEST]
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext<'_>,
        patient: &Patient,
        encounters: &[Encounter],
        events: &[ClinicalEvent],
    ) -> MeasureResult {
        let criteria = PopulationCriteria {
            ages: 18..=75,
            sex: None,
        };
        if let Err(reason) = criteria.screen(ctx, patient, encounters) {
            return MeasureResult::not_in_population(reason);
        }

        let id = self.id();
        let diabetes = ctx.codes(id, DIABETES);
        let has_diabetes = events
            .iter()
            .any(|e| ctx.period.not_after_index_year(e.event_date) && diabetes.contains(&e.code));
        if !has_diabetes {
            return MeasureResult::not_in_population("Failed IP: No diabetes diagnosis found");
        }

        let hba1c = ctx.codes(id, HBA1C_TEST);
        match most_recent(events, |e| ctx.period.contains(e.event_date) && hba1c.contains(&e.code)) {
            None => MeasureResult::in_denominator(true, None),
            Some(latest) => {
                let poor = latest
                    .numeric_value
                    .is_some_and(|value| value > POOR_CONTROL_THRESHOLD);
                MeasureResult::in_denominator(poor, Some(latest.clone()))
            }
        }
    }
}
