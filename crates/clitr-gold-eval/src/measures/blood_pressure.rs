//! CMS165 Controlling High Blood Pressure
//!
//! The population is hypertensive adults 18-85 diagnosed by June 30 of the
//! index year. Control is judged on the most recent day in the measurement
//! period that has both a systolic and a diastolic reading; when several
//! readings share that day the lowest of each component is used.

use super::{Measure, MeasureId, PopulationCriteria};
use crate::context::EvaluationContext;
use crate::result::MeasureResult;
use chrono::{Datelike, NaiveDate};
use clitr_gold_types::{ClinicalEvent, Encounter, Patient};
use smallvec::SmallVec;
use std::collections::BTreeMap;

pub const ESSENTIAL_HYPERTENSION: &str = "Essential Hypertension";
pub const SYSTOLIC_BLOOD_PRESSURE: &str = "Systolic Blood Pressure";
pub const DIASTOLIC_BLOOD_PRESSURE: &str = "Diastolic Blood Pressure";
pub const HOSPICE_EXCLUSION: &str = "Hospice Exclusion";
pub const PALLIATIVE_CARE_EXCLUSION: &str = "Palliative Care Exclusion";
pub const ESRD_EXCLUSION: &str = "ESRD Exclusion";
pub const PREGNANCY_EXCLUSION: &str = "Pregnancy Exclusion";
pub const FRAILTY_EXCLUSION: &str = "Frailty Exclusion";
pub const ADVANCED_ILLNESS_EXCLUSION: &str = "Advanced Illness Exclusion";
pub const DEMENTIA_MEDICATIONS_EXCLUSION: &str = "Dementia Medications Exclusion";
pub const LTC_EXCLUSION: &str = "LTC Exclusion";

/// Controlled means systolic below this value
pub const SYSTOLIC_LIMIT: f64 = 140.0;
/// Controlled means diastolic below this value
pub const DIASTOLIC_LIMIT: f64 = 90.0;

/// Exclusion signals found in one pass over the events
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ExclusionFlags {
    hospice_or_palliative: bool,
    esrd: bool,
    pregnancy: bool,
    frailty: bool,
    advanced_illness: bool,
    long_term_care: bool,
}

impl ExclusionFlags {
    /// First matching reason in evaluation order
    fn reason(&self, age: i32) -> Option<&'static str> {
        if self.hospice_or_palliative {
            Some("Hospice or Palliative Care")
        } else if self.esrd {
            Some("ESRD Diagnosis")
        } else if self.pregnancy {
            Some("Pregnancy")
        } else if age >= 66 && self.long_term_care {
            Some("Age >= 66 in LTC")
        } else if (66..=80).contains(&age) && self.frailty && self.advanced_illness {
            Some("Age 66-80 with Frailty and Advanced Illness")
        } else if age >= 81 && self.frailty {
            Some("Age >= 81 with Frailty")
        } else {
            None
        }
    }
}

/// Readings of one calendar day
#[derive(Debug, Default)]
struct DayReadings<'e> {
    systolic: SmallVec<[(f64, &'e ClinicalEvent); 2]>,
    diastolic: SmallVec<[f64; 2]>,
}

impl<'e> DayReadings<'e> {
    fn is_complete(&self) -> bool {
        !self.systolic.is_empty() && !self.diastolic.is_empty()
    }

    /// Lowest systolic value with the first event carrying it
    fn min_systolic(&self) -> Option<(f64, &'e ClinicalEvent)> {
        self.systolic.iter().copied().fold(None, |best, (value, event)| match best {
            Some((low, _)) if low <= value => best,
            _ => Some((value, event)),
        })
    }

    fn min_diastolic(&self) -> Option<f64> {
        self.diastolic.iter().copied().reduce(f64::min)
    }
}

/// Hypertensive adults whose latest blood pressure is below 140/90
#[derive(Debug, Clone, Copy, Default)]
pub struct BloodPressureControl;

impl Measure for BloodPressureControl {
    fn id(&self) -> MeasureId {
        MeasureId::Cms165
    }

    fn title(&self) -> &'static str {
        "Controlling High Blood Pressure"
    }

    fn required_categories(&self) -> &'static [&'static str] {
        &[
            ESSENTIAL_HYPERTENSION,
            SYSTOLIC_BLOOD_PRESSURE,
            DIASTOLIC_BLOOD_PRESSURE,
            HOSPICE_EXCLUSION,
            PALLIATIVE_CARE_EXCLUSION,
            ESRD_EXCLUSION,
            PREGNANCY_EXCLUSION,
            FRAILTY_EXCLUSION,
            ADVANCED_ILLNESS_EXCLUSION,
            DEMENTIA_MEDICATIONS_EXCLUSION,
            LTC_EXCLUSION,
        ]
    }

    fn evaluate(
        &self,
        ctx: &EvaluationContext<'_>,
        patient: &Patient,
        encounters: &[Encounter],
        events: &[ClinicalEvent],
    ) -> MeasureResult {
        let criteria = PopulationCriteria {
            ages: 18..=85,
            sex: None,
        };
        let age = match criteria.screen(ctx, patient, encounters) {
            Ok(age) => age,
            Err(reason) => return MeasureResult::not_in_population(reason),
        };

        let id = self.id();
        let hypertension = ctx.codes(id, ESSENTIAL_HYPERTENSION);
        let cutoff = ctx.period.mid_year_cutoff();
        let has_hypertension = events
            .iter()
            .any(|e| e.event_date <= cutoff && hypertension.contains(&e.code));
        if !has_hypertension {
            return MeasureResult::not_in_population(
                "Failed IP: No valid hypertension diagnosis found",
            );
        }

        if let Some(reason) = self.exclusion_flags(ctx, events).reason(age) {
            return MeasureResult::excluded(reason);
        }

        match self.latest_reading(ctx, events) {
            Some((systolic, diastolic, evidence)) => MeasureResult::in_denominator(
                systolic < SYSTOLIC_LIMIT && diastolic < DIASTOLIC_LIMIT,
                Some(evidence.clone()),
            ),
            None => MeasureResult::in_denominator(false, None),
        }
    }
}

impl BloodPressureControl {
    fn exclusion_flags(&self, ctx: &EvaluationContext<'_>, events: &[ClinicalEvent]) -> ExclusionFlags {
        let id = self.id();
        let hospice = ctx.codes(id, HOSPICE_EXCLUSION);
        let palliative = ctx.codes(id, PALLIATIVE_CARE_EXCLUSION);
        let esrd = ctx.codes(id, ESRD_EXCLUSION);
        let pregnancy = ctx.codes(id, PREGNANCY_EXCLUSION);
        let frailty = ctx.codes(id, FRAILTY_EXCLUSION);
        let advanced_illness = ctx.codes(id, ADVANCED_ILLNESS_EXCLUSION);
        let dementia_meds = ctx.codes(id, DEMENTIA_MEDICATIONS_EXCLUSION);
        let ltc = ctx.codes(id, LTC_EXCLUSION);

        let year = ctx.period.year();
        let mut flags = ExclusionFlags::default();
        for event in events
            .iter()
            .filter(|e| ctx.period.not_after_index_year(e.event_date))
        {
            let code = event.code.as_str();
            let in_year = ctx.period.in_index_year(event.event_date);
            let event_year = event.event_date.year();

            flags.esrd |= esrd.contains(code);
            flags.long_term_care |= ltc.contains(code);
            if in_year {
                flags.hospice_or_palliative |= hospice.contains(code) || palliative.contains(code);
                flags.pregnancy |= pregnancy.contains(code);
                flags.frailty |= frailty.contains(code);
            }
            if event_year >= year - 1 {
                flags.advanced_illness |=
                    advanced_illness.contains(code) || dementia_meds.contains(code);
            }
        }
        flags
    }

    /// `(min systolic, min diastolic, systolic evidence)` of the latest
    /// complete day in the measurement period
    fn latest_reading<'e>(
        &self,
        ctx: &EvaluationContext<'_>,
        events: &'e [ClinicalEvent],
    ) -> Option<(f64, f64, &'e ClinicalEvent)> {
        let id = self.id();
        let systolic = ctx.codes(id, SYSTOLIC_BLOOD_PRESSURE);
        let diastolic = ctx.codes(id, DIASTOLIC_BLOOD_PRESSURE);

        let mut days: BTreeMap<NaiveDate, DayReadings<'e>> = BTreeMap::new();
        for event in events.iter().filter(|e| ctx.period.contains(e.event_date)) {
            let Some(value) = event.numeric_value else {
                continue;
            };
            if systolic.contains(&event.code) {
                days.entry(event.event_date)
                    .or_default()
                    .systolic
                    .push((value, event));
            } else if diastolic.contains(&event.code) {
                days.entry(event.event_date).or_default().diastolic.push(value);
            }
        }

        let readings = days.values().rev().find(|day| day.is_complete())?;
        let (min_systolic, evidence) = readings.min_systolic()?;
        let min_diastolic = readings.min_diastolic()?;
        Some((min_systolic, min_diastolic, evidence))
    }
}
