//! CMS125 Breast Cancer Screening

use super::{Measure, MeasureId, PopulationCriteria, most_recent};
use crate::context::EvaluationContext;
use crate::result::MeasureResult;
use clitr_gold_types::{ClinicalEvent, Encounter, LookbackWindow, MeasurementPeriod, Patient, Sex};

pub const MAMMOGRAPHY: &str = "Mammography";
pub const BILATERAL_MASTECTOMY: &str = "Bilateral Mastectomy";
pub const ABSENCE_OF_LEFT_BREAST: &str = "Absence of Left Breast";
pub const ABSENCE_OF_RIGHT_BREAST: &str = "Absence of Right Breast";
pub const UNILATERAL_MASTECTOMY_LEFT: &str = "Unilateral Mastectomy Left";
pub const UNILATERAL_MASTECTOMY_RIGHT: &str = "Unilateral Mastectomy Right";

/// October 1 two years before the measurement year through the index date
pub const MAMMOGRAPHY_LOOKBACK: LookbackWindow = LookbackWindow::days(821);

const EXCLUSION_REASON: &str = "Bilateral mastectomy or equivalent";

/// Women 52-74 with a mammogram in the 27 months before the index date
#[derive(Debug, Clone, Copy, Default)]
pub struct BreastCancerScreening;

impl BreastCancerScreening {
    fn criteria() -> PopulationCriteria {
        PopulationCriteria {
            ages: 52..=74,
            sex: Some(Sex::Female),
        }
    }
}

impl Measure for BreastCancerScreening {
    fn id(&self) -> MeasureId {
        MeasureId::Cms125
    }

    fn title(&self) -> &'static str {
        "Breast Cancer Screening"
    }

    fn required_categories(&self) -> &'static [&'static str] {
        &[
            MAMMOGRAPHY,
            BILATERAL_MASTECTOMY,
            ABSENCE_OF_LEFT_BREAST,
            ABSENCE_OF_RIGHT_BREAST,
            UNILATERAL_MASTECTOMY_LEFT,
            UNILATERAL_MASTECTOMY_RIGHT,
        ]
    }

    fn evidence_window(&self, _period: &MeasurementPeriod) -> LookbackWindow {
        MAMMOGRAPHY_LOOKBACK
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext<'_>,
        patient: &Patient,
        encounters: &[Encounter],
        events: &[ClinicalEvent],
    ) -> MeasureResult {
        if let Err(reason) = Self::criteria().screen(ctx, patient, encounters) {
            return MeasureResult::not_in_population(reason);
        }

        let id = self.id();
        let bilateral = ctx.codes(id, BILATERAL_MASTECTOMY);
        let left = [
            ctx.codes(id, ABSENCE_OF_LEFT_BREAST),
            ctx.codes(id, UNILATERAL_MASTECTOMY_LEFT),
        ];
        let right = [
            ctx.codes(id, ABSENCE_OF_RIGHT_BREAST),
            ctx.codes(id, UNILATERAL_MASTECTOMY_RIGHT),
        ];

        let (mut has_bilateral, mut has_left, mut has_right) = (false, false, false);
        for event in events
            .iter()
            .filter(|e| ctx.period.not_after_index_year(e.event_date))
        {
            let code = event.code.as_str();
            has_bilateral |= bilateral.contains(code);
            has_left |= left.iter().any(|set| set.contains(code));
            has_right |= right.iter().any(|set| set.contains(code));
        }

        if has_bilateral || (has_left && has_right) {
            return MeasureResult::excluded(EXCLUSION_REASON);
        }

        let mammography = ctx.codes(id, MAMMOGRAPHY);
        let index_date = ctx.index_date();
        let evidence = most_recent(events, |e| {
            mammography.contains(&e.code) && MAMMOGRAPHY_LOOKBACK.contains(e.event_date, index_date)
        });

        MeasureResult::in_denominator(evidence.is_some(), evidence.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminology::ValueSetIndex;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn value_sets() -> ValueSetIndex {
        ValueSetIndex::new()
            .with_category("CMS125", MAMMOGRAPHY, ["77067"])
            .with_category("CMS125", BILATERAL_MASTECTOMY, ["Z90.13"])
            .with_category("CMS125", ABSENCE_OF_LEFT_BREAST, ["Z90.12"])
            .with_category("CMS125", ABSENCE_OF_RIGHT_BREAST, ["Z90.11"])
            .with_category("CMS125", UNILATERAL_MASTECTOMY_LEFT, ["0HTU0ZZ"])
            .with_category("CMS125", UNILATERAL_MASTECTOMY_RIGHT, ["0HTT0ZZ"])
    }

    fn eligible() -> (Patient, Vec<Encounter>) {
        (
            Patient::new("p1", date("1965-05-05"), Sex::Female),
            vec![Encounter::new("p1", date("2025-06-01"))],
        )
    }

    fn event(day: &str, code: &str) -> ClinicalEvent {
        ClinicalEvent::new("p1", date(day), code)
    }

    #[test]
    fn test_male_fails_initial_population() {
        let sets = value_sets();
        let ctx = EvaluationContext::new(date("2025-12-31"), &sets);
        let patient = Patient::new("p1", date("1965-05-05"), Sex::Male);
        let encounters = vec![Encounter::new("p1", date("2025-06-01"))];

        let result = BreastCancerScreening.evaluate(&ctx, &patient, &encounters, &[]);
        assert!(!result.initial_population);
        assert_eq!(
            result.debug_reason.as_deref(),
            Some("Failed IP: sex_pass=false, age_pass=true, has_encounter=true")
        );
    }

    #[test]
    fn test_numerator_with_recent_mammogram() {
        let sets = value_sets();
        let ctx = EvaluationContext::new(date("2025-12-31"), &sets);
        let (patient, encounters) = eligible();
        let events = vec![event("2024-11-15", "77067"), event("2025-03-01", "77067")];

        let result = BreastCancerScreening.evaluate(&ctx, &patient, &encounters, &events);
        assert!(result.denominator);
        assert!(result.numerator);
        assert_eq!(result.evidence.unwrap().event_date, date("2025-03-01"));
    }

    #[test]
    fn test_left_and_right_components_exclude() {
        let sets = value_sets();
        let ctx = EvaluationContext::new(date("2025-12-31"), &sets);
        let (patient, encounters) = eligible();
        let events = vec![event("2018-01-01", "Z90.11"), event("2020-01-01", "0HTU0ZZ")];

        let result = BreastCancerScreening.evaluate(&ctx, &patient, &encounters, &events);
        assert!(result.exclusion);
        assert!(!result.denominator);
        assert_eq!(result.exclusion_reason.as_deref(), Some(EXCLUSION_REASON));
    }

    #[test]
    fn test_single_side_does_not_exclude() {
        let sets = value_sets();
        let ctx = EvaluationContext::new(date("2025-12-31"), &sets);
        let (patient, encounters) = eligible();
        let events = vec![event("2018-01-01", "Z90.11"), event("2025-12-31", "77067")];

        let result = BreastCancerScreening.evaluate(&ctx, &patient, &encounters, &events);
        assert!(!result.exclusion);
        assert!(result.numerator);
    }

    #[test]
    fn test_future_mastectomy_is_ignored() {
        let sets = value_sets();
        let ctx = EvaluationContext::new(date("2025-12-31"), &sets);
        let (patient, encounters) = eligible();
        let events = vec![event("2026-02-01", "Z90.13")];

        let result = BreastCancerScreening.evaluate(&ctx, &patient, &encounters, &events);
        assert!(result.denominator);
        assert!(!result.numerator);
        assert!(result.evidence.is_none());
    }
}
