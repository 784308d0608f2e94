//! CMS130 Colorectal Cancer Screening

use super::{Measure, MeasureId, PopulationCriteria, most_recent};
use crate::context::EvaluationContext;
use crate::result::MeasureResult;
use clitr_gold_types::{ClinicalEvent, Encounter, LookbackWindow, MeasurementPeriod, Patient};

pub const COLONOSCOPY: &str = "Colonoscopy";
pub const FIT: &str = "FIT";
pub const COLORECTAL_CANCER_EXCLUSION: &str = "Colorectal Cancer Exclusion";
pub const TOTAL_COLECTOMY_EXCLUSION: &str = "Total Colectomy Exclusion";

pub const COLONOSCOPY_LOOKBACK: LookbackWindow = LookbackWindow::days(3650);
pub const FIT_LOOKBACK: LookbackWindow = LookbackWindow::days(365);

/// Adults 45-75 with a colonoscopy in ten years or a FIT in one
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorectalCancerScreening;

impl Measure for ColorectalCancerScreening {
    fn id(&self) -> MeasureId {
        MeasureId::Cms130
    }

    fn title(&self) -> &'static str {
        "Colorectal Cancer Screening"
    }

    fn required_categories(&self) -> &'static [&'static str] {
        &[
            COLONOSCOPY,
            FIT,
            COLORECTAL_CANCER_EXCLUSION,
            TOTAL_COLECTOMY_EXCLUSION,
        ]
    }

    fn evidence_window(&self, _period: &MeasurementPeriod) -> LookbackWindow {
        COLONOSCOPY_LOOKBACK
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext<'_>,
        patient: &Patient,
        encounters: &[Encounter],
        events: &[ClinicalEvent],
    ) -> MeasureResult {
        let criteria = PopulationCriteria {
            ages: 45..=75,
            sex: None,
        };
        if let Err(reason) = criteria.screen(ctx, patient, encounters) {
            return MeasureResult::not_in_population(reason);
        }

        let id = self.id();
        let cancer = ctx.codes(id, COLORECTAL_CANCER_EXCLUSION);
        let colectomy = ctx.codes(id, TOTAL_COLECTOMY_EXCLUSION);

        let (mut has_cancer, mut has_colectomy) = (false, false);
        for event in events
            .iter()
            .filter(|e| ctx.period.not_after_index_year(e.event_date))
        {
            has_cancer |= cancer.contains(&event.code);
            has_colectomy |= colectomy.contains(&event.code);
        }

        if has_cancer {
            return MeasureResult::excluded("Colorectal Cancer");
        }
        if has_colectomy {
            return MeasureResult::excluded("Total Colectomy");
        }

        let colonoscopy = ctx.codes(id, COLONOSCOPY);
        let fit = ctx.codes(id, FIT);
        let index_date = ctx.index_date();
        let evidence = most_recent(events, |e| {
            (colonoscopy.contains(&e.code) && COLONOSCOPY_LOOKBACK.contains(e.event_date, index_date))
                || (fit.contains(&e.code) && FIT_LOOKBACK.contains(e.event_date, index_date))
        });

        MeasureResult::in_denominator(evidence.is_some(), evidence.cloned())
    }
}
