//! Patient record builders

use chrono::NaiveDate;
use clitr_gold::store::PatientData;
use clitr_gold::{ClinicalEvent, Encounter, Patient, Sex};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Builder for one patient's demographics, encounters and events
pub struct PatientBuilder {
    id: String,
    dob: NaiveDate,
    sex: Sex,
    encounters: Vec<Encounter>,
    events: Vec<ClinicalEvent>,
}

impl PatientBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dob: date("1970-01-01"),
            sex: Sex::Female,
            encounters: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn born(mut self, dob: &str) -> Self {
        self.dob = date(dob);
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn encounter(mut self, day: &str) -> Self {
        self.encounters.push(Encounter::new(self.id.clone(), date(day)));
        self
    }

    pub fn event(mut self, day: &str, code: &str) -> Self {
        self.events.push(ClinicalEvent::new(self.id.clone(), date(day), code));
        self
    }

    pub fn reading(mut self, day: &str, code: &str, value: f64) -> Self {
        self.events
            .push(ClinicalEvent::new(self.id.clone(), date(day), code).with_value(value, None));
        self
    }

    pub fn patient(&self) -> Patient {
        Patient::new(self.id.clone(), self.dob, self.sex)
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    pub fn events(&self) -> &[ClinicalEvent] {
        &self.events
    }

    pub fn build(self) -> PatientData {
        PatientData::new(Some(self.patient()), self.encounters, self.events)
    }
}
