//! Patient demographics and encounters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Administrative sex as recorded in the demographics source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Sex {
    /// Source token for this value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sex token is neither `F` nor `M`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid sex token: {0:?}")]
pub struct ParseSexError(pub String);

impl FromStr for Sex {
    type Err = ParseSexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" => Ok(Self::Female),
            "M" => Ok(Self::Male),
            other => Err(ParseSexError(other.to_string())),
        }
    }
}

/// A row of the demographics source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    #[serde(rename = "dob")]
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
}

impl Patient {
    pub fn new(patient_id: impl Into<String>, date_of_birth: NaiveDate, sex: Sex) -> Self {
        Self {
            patient_id: patient_id.into(),
            date_of_birth,
            sex,
        }
    }

    /// Age in whole years at `index_date`
    pub fn age_at(&self, index_date: NaiveDate) -> i32 {
        crate::calculate_age(self.date_of_birth, index_date)
    }
}

/// A visit; only its date matters to the measures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub patient_id: String,
    pub encounter_date: NaiveDate,
}

impl Encounter {
    pub fn new(patient_id: impl Into<String>, encounter_date: NaiveDate) -> Self {
        Self {
            patient_id: patient_id.into(),
            encounter_date,
        }
    }
}
