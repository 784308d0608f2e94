//! CSV sources and row parsing
//!
//! Each source is scanned front to back exactly once per load. The patient id
//! column is checked before anything else is parsed, so rows for patients
//! outside the requested set cost one hash lookup.

use crate::error::{StoreError, StoreResult};
use clitr_gold_types::{ClinicalEvent, Encounter, EventType, Patient, parse_date};
use csv::StringRecord;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Locations of the three patient-keyed sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFiles {
    pub patients: PathBuf,
    pub encounters: PathBuf,
    pub events: PathBuf,
}

impl SourceFiles {
    pub const PATIENTS_FILE: &'static str = "patients.csv";
    pub const ENCOUNTERS_FILE: &'static str = "encounters.csv";
    pub const EVENTS_FILE: &'static str = "events.csv";

    /// Standard file names under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            patients: dir.join(Self::PATIENTS_FILE),
            encounters: dir.join(Self::ENCOUNTERS_FILE),
            events: dir.join(Self::EVENTS_FILE),
        }
    }

    /// Fail with `SourceNotFound` for the first missing file
    pub fn ensure_exist(&self) -> StoreResult<()> {
        for path in [&self.patients, &self.encounters, &self.events] {
            if !path.is_file() {
                return Err(StoreError::source_not_found(path));
            }
        }
        Ok(())
    }
}

/// Row counters for a single file scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowCounts {
    pub read: u64,
    pub matched: u64,
    pub skipped: u64,
}

/// Column positions resolved from a header row, plus the typed row parse
pub(crate) trait RowParser: Sized {
    type Row;

    fn resolve(headers: &StringRecord, path: &Path) -> StoreResult<Self>;

    fn patient_id<'r>(&self, record: &'r StringRecord) -> Option<&'r str>;

    /// `None` means the row is malformed and must be skipped
    fn parse(&self, record: &StringRecord) -> Option<Self::Row>;
}

fn required(headers: &StringRecord, path: &Path, column: &str) -> StoreResult<usize> {
    optional(headers, column).ok_or_else(|| StoreError::missing_column(path, column))
}

fn optional(headers: &StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == column)
}

fn field<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).map(str::trim).unwrap_or("")
}

pub(crate) struct PatientColumns {
    patient_id: usize,
    dob: usize,
    sex: usize,
}

impl RowParser for PatientColumns {
    type Row = Patient;

    fn resolve(headers: &StringRecord, path: &Path) -> StoreResult<Self> {
        Ok(Self {
            patient_id: required(headers, path, "patient_id")?,
            dob: required(headers, path, "dob")?,
            sex: required(headers, path, "sex")?,
        })
    }

    fn patient_id<'r>(&self, record: &'r StringRecord) -> Option<&'r str> {
        record.get(self.patient_id)
    }

    fn parse(&self, record: &StringRecord) -> Option<Patient> {
        Some(Patient {
            patient_id: record.get(self.patient_id)?.trim().to_string(),
            date_of_birth: parse_date(record.get(self.dob)?)?,
            sex: record.get(self.sex)?.parse().ok()?,
        })
    }
}

pub(crate) struct EncounterColumns {
    patient_id: usize,
    encounter_date: usize,
}

impl RowParser for EncounterColumns {
    type Row = Encounter;

    fn resolve(headers: &StringRecord, path: &Path) -> StoreResult<Self> {
        Ok(Self {
            patient_id: required(headers, path, "patient_id")?,
            encounter_date: required(headers, path, "encounter_date")?,
        })
    }

    fn patient_id<'r>(&self, record: &'r StringRecord) -> Option<&'r str> {
        record.get(self.patient_id)
    }

    fn parse(&self, record: &StringRecord) -> Option<Encounter> {
        Some(Encounter {
            patient_id: record.get(self.patient_id)?.trim().to_string(),
            encounter_date: parse_date(record.get(self.encounter_date)?)?,
        })
    }
}

pub(crate) struct EventColumns {
    patient_id: usize,
    event_date: usize,
    code: usize,
    code_system: Option<usize>,
    event_type: Option<usize>,
    value_num: Option<usize>,
    unit: Option<usize>,
}

impl RowParser for EventColumns {
    type Row = ClinicalEvent;

    fn resolve(headers: &StringRecord, path: &Path) -> StoreResult<Self> {
        Ok(Self {
            patient_id: required(headers, path, "patient_id")?,
            event_date: required(headers, path, "event_date")?,
            code: required(headers, path, "code")?,
            code_system: optional(headers, "code_system"),
            event_type: optional(headers, "event_type"),
            value_num: optional(headers, "value_num"),
            unit: optional(headers, "unit"),
        })
    }

    fn patient_id<'r>(&self, record: &'r StringRecord) -> Option<&'r str> {
        record.get(self.patient_id)
    }

    fn parse(&self, record: &StringRecord) -> Option<ClinicalEvent> {
        let numeric_value = match field(record, self.value_num) {
            "" => None,
            raw => Some(raw.parse::<f64>().ok().filter(|v| v.is_finite())?),
        };
        let unit = Some(field(record, self.unit))
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        Some(ClinicalEvent {
            patient_id: record.get(self.patient_id)?.trim().to_string(),
            event_date: parse_date(record.get(self.event_date)?)?,
            code: record.get(self.code)?.trim().to_string(),
            code_system: field(record, self.code_system).to_string(),
            event_type: EventType::from(field(record, self.event_type)),
            numeric_value,
            unit,
        })
    }
}

/// Stream `path` once, handing every parsed row whose patient id is in `ids`
/// to `sink`. The sink may stop the scan early with `ControlFlow::Break`.
pub(crate) fn scan<P: RowParser>(
    path: &Path,
    ids: &HashSet<String>,
    mut sink: impl FnMut(P::Row) -> ControlFlow<()>,
) -> StoreResult<RowCounts> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| StoreError::csv(path, e))?
        .clone();
    let parser = P::resolve(&headers, path)?;

    let mut counts = RowCounts::default();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(StoreError::csv(path, e)),
            Err(e) => {
                counts.read += 1;
                counts.skipped += 1;
                trace!("Skipping unreadable row in {}: {}", path.display(), e);
                continue;
            }
        }
        counts.read += 1;

        let Some(id) = parser.patient_id(&record) else {
            counts.skipped += 1;
            continue;
        };
        if !ids.contains(id.trim()) {
            continue;
        }
        counts.matched += 1;

        match parser.parse(&record) {
            Some(row) => {
                if sink(row).is_break() {
                    break;
                }
            }
            None => {
                counts.skipped += 1;
                trace!(
                    "Skipping malformed row {} in {}",
                    counts.read,
                    path.display()
                );
            }
        }
    }

    Ok(counts)
}
