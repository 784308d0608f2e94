//! Measure boundary tests
//!
//! Runs each evaluator directly against the terminology fixture:
//! - Age and sex boundaries of the initial population
//! - Lookback window edges
//! - Exclusion combinations
//! - Population invariants across all measures

mod common;

use clitr_gold::eval::EvaluationContext;
use clitr_gold::eval::measures::{
    BloodPressureControl, BreastCancerScreening, ColorectalCancerScreening, Hba1cPoorControl,
    Measure,
};
use clitr_gold::eval::MeasureRegistry;
use clitr_gold::{MeasureResult, Sex};
use common::{PatientBuilder, date, value_sets};
use rstest::rstest;

const INDEX: &str = "2024-12-31";

fn evaluate(measure: &dyn Measure, builder: &PatientBuilder) -> MeasureResult {
    let sets = value_sets();
    let ctx = EvaluationContext::new(date(INDEX), &sets);
    measure.evaluate(&ctx, &builder.patient(), builder.encounters(), builder.events())
}

#[rstest]
#[case::exactly_52("1972-12-31", Sex::Female, true)]
#[case::one_day_short_of_52("1973-01-01", Sex::Female, false)]
#[case::still_74("1950-01-01", Sex::Female, true)]
#[case::turned_75("1949-12-31", Sex::Female, false)]
#[case::male("1970-01-01", Sex::Male, false)]
fn test_breast_cancer_population(#[case] dob: &str, #[case] sex: Sex, #[case] in_population: bool) {
    let builder = PatientBuilder::new("p1").born(dob).sex(sex).encounter("2024-05-10");
    let result = evaluate(&BreastCancerScreening, &builder);
    assert_eq!(result.initial_population, in_population);
    assert_eq!(result.denominator, in_population);
}

#[rstest]
#[case::one_year_back("2023-12-01", true)]
#[case::window_start("2022-10-02", true)]
#[case::day_before_window("2022-10-01", false)]
#[case::three_years_back("2021-01-01", false)]
#[case::index_date("2024-12-31", true)]
#[case::after_index("2025-01-01", false)]
fn test_mammography_lookback(#[case] day: &str, #[case] counts: bool) {
    let builder = PatientBuilder::new("p1").encounter("2024-05-10").event(day, "77067");
    let result = evaluate(&BreastCancerScreening, &builder);
    assert!(result.denominator);
    assert_eq!(result.numerator, counts);
    assert_eq!(result.evidence.is_some(), counts);
}

#[rstest]
#[case::bilateral(&[("2020-01-01", "Z90.13")], true)]
#[case::left_and_right_on_different_dates(&[("2018-05-10", "Z90.11"), ("2021-08-15", "0HTU0ZZ")], true)]
#[case::absence_codes_both_sides(&[("2018-05-10", "Z90.11"), ("2019-01-01", "Z90.12")], true)]
#[case::right_only(&[("2018-05-10", "Z90.11")], false)]
#[case::left_only(&[("2018-05-10", "0HTU0ZZ")], false)]
#[case::bilateral_after_index_year(&[("2025-03-01", "Z90.13")], false)]
fn test_mastectomy_exclusion(#[case] events: &[(&str, &str)], #[case] excluded: bool) {
    let builder = events
        .iter()
        .fold(PatientBuilder::new("p1").encounter("2024-05-10"), |b, (day, code)| {
            b.event(day, code)
        });
    let result = evaluate(&BreastCancerScreening, &builder);
    assert_eq!(result.exclusion, excluded);
    assert_eq!(result.denominator, !excluded);
    if excluded {
        assert_eq!(
            result.exclusion_reason.as_deref(),
            Some("Bilateral mastectomy or equivalent")
        );
    }
}

#[rstest]
#[case::colonoscopy_nine_years("2015-06-01", "45378", true)]
#[case::colonoscopy_eleven_years("2013-06-01", "45378", false)]
#[case::colonoscopy_window_start("2015-01-03", "45378", true)]
#[case::colonoscopy_day_before_window("2015-01-02", "45378", false)]
#[case::fit_this_year("2024-03-01", "82274", true)]
#[case::fit_last_year("2023-06-01", "82274", false)]
#[case::fit_window_start("2024-01-01", "82274", true)]
#[case::fit_day_before_window("2023-12-31", "82274", false)]
fn test_colorectal_screening_windows(#[case] day: &str, #[case] code: &str, #[case] counts: bool) {
    let builder = PatientBuilder::new("p1")
        .born("1960-01-01")
        .sex(Sex::Male)
        .encounter("2024-05-10")
        .event(day, code);
    let result = evaluate(&ColorectalCancerScreening, &builder);
    assert!(result.denominator);
    assert_eq!(result.numerator, counts);
}

#[rstest]
#[case::long_standing("2020-01-01", true)]
#[case::on_cutoff("2024-06-30", true)]
#[case::day_after_cutoff("2024-07-01", false)]
fn test_hypertension_diagnosis_cutoff(#[case] diagnosed: &str, #[case] in_population: bool) {
    let builder = PatientBuilder::new("p1")
        .born("1960-01-01")
        .sex(Sex::Male)
        .encounter("2024-05-10")
        .event(diagnosed, "I10");
    let result = evaluate(&BloodPressureControl, &builder);
    assert_eq!(result.initial_population, in_population);
    assert_eq!(result.denominator, in_population);
}

#[rstest]
#[case::high(145.0, 95.0, false)]
#[case::controlled(135.0, 85.0, true)]
#[case::systolic_at_limit(140.0, 80.0, false)]
#[case::diastolic_at_limit(120.0, 90.0, false)]
fn test_blood_pressure_thresholds(#[case] systolic: f64, #[case] diastolic: f64, #[case] controlled: bool) {
    let builder = PatientBuilder::new("p1")
        .born("1960-01-01")
        .sex(Sex::Male)
        .encounter("2024-05-10")
        .event("2020-01-01", "I10")
        .reading("2024-11-01", "8480-6", systolic)
        .reading("2024-11-01", "8462-4", diastolic);
    let result = evaluate(&BloodPressureControl, &builder);
    assert!(result.initial_population);
    assert!(result.denominator);
    assert_eq!(result.numerator, controlled);
    assert_eq!(result.evidence.and_then(|e| e.numeric_value), Some(systolic));
}

#[rstest]
#[case::hospice(&[("2024-03-01", "Z51.5"), ("2010-01-01", "N18.6")], "1960-01-01", "Hospice or Palliative Care")]
#[case::esrd_any_time(&[("2001-01-01", "N18.6"), ("2024-02-02", "Z33.1")], "1960-01-01", "ESRD Diagnosis")]
#[case::pregnancy(&[("2024-02-02", "Z33.1")], "1990-01-01", "Pregnancy")]
#[case::ltc_at_66(&[("2010-01-01", "Y92.12")], "1958-01-01", "Age >= 66 in LTC")]
#[case::frailty_and_dementia_meds(&[("2024-03-03", "R54"), ("2023-01-01", "997221")], "1950-01-01", "Age 66-80 with Frailty and Advanced Illness")]
#[case::frailty_over_80(&[("2024-03-03", "R54")], "1940-01-01", "Age >= 81 with Frailty")]
fn test_blood_pressure_exclusions(
    #[case] events: &[(&str, &str)],
    #[case] dob: &str,
    #[case] reason: &str,
) {
    let builder = events.iter().fold(
        PatientBuilder::new("p1")
            .born(dob)
            .encounter("2024-05-10")
            .event("2020-01-01", "I10"),
        |b, (day, code)| b.event(day, code),
    );
    let result = evaluate(&BloodPressureControl, &builder);
    assert!(result.exclusion);
    assert!(!result.denominator);
    assert_eq!(result.exclusion_reason.as_deref(), Some(reason));
}

#[rstest]
#[case::ltc_under_66(&[("2010-01-01", "Y92.12")], "1960-01-01")]
#[case::frailty_without_illness_at_70(&[("2024-03-03", "R54")], "1954-01-01")]
#[case::prior_year_pregnancy(&[("2023-02-02", "Z33.1")], "1990-01-01")]
fn test_blood_pressure_non_exclusions(#[case] events: &[(&str, &str)], #[case] dob: &str) {
    let builder = events.iter().fold(
        PatientBuilder::new("p1")
            .born(dob)
            .encounter("2024-05-10")
            .event("2020-01-01", "I10"),
        |b, (day, code)| b.event(day, code),
    );
    let result = evaluate(&BloodPressureControl, &builder);
    assert!(!result.exclusion);
    assert!(result.denominator);
}

#[rstest]
#[case::no_test(&[], true)]
#[case::high(&[9.5], true)]
#[case::at_threshold(&[9.0], false)]
#[case::controlled(&[6.8], false)]
#[case::latest_wins(&[10.0, 7.0], false)]
fn test_hba1c_poor_control(#[case] values: &[f64], #[case] poor: bool) {
    let builder = values.iter().enumerate().fold(
        PatientBuilder::new("p1")
            .born("1960-01-01")
            .sex(Sex::Male)
            .encounter("2024-05-10")
            .event("2020-01-01", "E11.9"),
        |b, (month, value)| b.reading(&format!("2024-{:02}-15", month + 1), "4548-4", *value),
    );
    let result = evaluate(&Hba1cPoorControl, &builder);
    assert!(result.denominator);
    assert_eq!(result.numerator, poor);
    assert_eq!(result.evidence.is_some(), !values.is_empty());
}

#[test]
fn test_no_encounter_in_index_year_fails_every_measure() {
    let builder = PatientBuilder::new("p1")
        .encounter("2023-05-10")
        .event("2020-01-01", "I10")
        .event("2020-01-01", "E11.9");
    for measure in MeasureRegistry::with_standard_measures().iter() {
        let result = evaluate(measure.as_ref(), &builder);
        assert!(!result.initial_population, "{} admitted", measure.id());
        assert!(!result.denominator);
    }
}

#[rstest]
#[case::screened_woman(
    PatientBuilder::new("a").encounter("2024-05-10").event("2023-12-01", "77067").event("2024-06-01", "45378")
)]
#[case::excluded_hypertensive(
    PatientBuilder::new("b").born("1950-01-01").encounter("2024-01-01").event("2019-01-01", "I10").event("2024-02-02", "Z51.5").event("2015-01-01", "C18.9")
)]
#[case::diabetic_with_readings(
    PatientBuilder::new("c").born("1980-01-01").sex(Sex::Male).encounter("2024-01-01")
        .event("2019-01-01", "E11.9").event("2019-01-01", "I10")
        .reading("2024-04-04", "4548-4", 9.4)
        .reading("2024-04-04", "8480-6", 128.0).reading("2024-04-04", "8462-4", 82.0)
)]
fn test_population_invariants(#[case] builder: PatientBuilder) {
    let index = date(INDEX);
    for measure in MeasureRegistry::with_standard_measures().iter() {
        let result = evaluate(measure.as_ref(), &builder);
        if result.exclusion {
            assert!(!result.denominator, "{} excluded but in denominator", measure.id());
        }
        if !result.denominator {
            assert!(!result.numerator, "{} numerator without denominator", measure.id());
        }
        if let (true, Some(evidence)) = (result.denominator, &result.evidence) {
            let sets = value_sets();
            let ctx = EvaluationContext::new(index, &sets);
            let window = measure.evidence_window(&ctx.period);
            assert!(
                window.contains(evidence.event_date, index),
                "{} evidence {} outside window",
                measure.id(),
                evidence.event_date
            );
        }
    }
}
