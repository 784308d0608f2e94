//! Clinical events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of clinical event
///
/// Tokens not known to the engine are preserved in `Other` so that rendering
/// the evidence downstream shows exactly what the source recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Condition,
    Procedure,
    Observation,
    Medication,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Condition => "CONDITION",
            Self::Procedure => "PROCEDURE",
            Self::Observation => "OBSERVATION",
            Self::Medication => "MEDICATION",
            Self::Other(token) => token,
        }
    }
}

impl From<&str> for EventType {
    fn from(token: &str) -> Self {
        match token.trim() {
            "CONDITION" => Self::Condition,
            "PROCEDURE" => Self::Procedure,
            "OBSERVATION" => Self::Observation,
            "MEDICATION" => Self::Medication,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        event_type.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated, coded entry in a patient's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalEvent {
    pub patient_id: String,
    pub event_date: NaiveDate,
    pub code: String,
    pub code_system: String,
    pub event_type: EventType,
    #[serde(rename = "value_num")]
    pub numeric_value: Option<f64>,
    pub unit: Option<String>,
}

impl ClinicalEvent {
    /// Create an event with no system, type or value
    pub fn new(patient_id: impl Into<String>, event_date: NaiveDate, code: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            event_date,
            code: code.into(),
            code_system: String::new(),
            event_type: EventType::Other(String::new()),
            numeric_value: None,
            unit: None,
        }
    }

    pub fn with_code_system(mut self, code_system: impl Into<String>) -> Self {
        self.code_system = code_system.into();
        self
    }

    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn with_value(mut self, value: f64, unit: Option<&str>) -> Self {
        self.numeric_value = Some(value);
        self.unit = unit.map(str::to_string);
        self
    }
}
