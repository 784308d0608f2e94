//! CSV source fixtures in a temp directory

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Rows for the three source files, written out on `write`
#[derive(Default)]
pub struct SourceWriter {
    patients: Vec<String>,
    encounters: Vec<String>,
    events: Vec<String>,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patient(mut self, id: &str, dob: &str, sex: &str) -> Self {
        self.patients.push(format!("{id},{dob},{sex}"));
        self
    }

    pub fn encounter(mut self, id: &str, day: &str) -> Self {
        self.encounters.push(format!("{id},{day},ambulatory"));
        self
    }

    pub fn event(mut self, id: &str, day: &str, code: &str) -> Self {
        self.events.push(format!("{id},{day},{code},,CONDITION,,"));
        self
    }

    pub fn observation(mut self, id: &str, day: &str, code: &str, value: &str) -> Self {
        self.events
            .push(format!("{id},{day},{code},LOINC,OBSERVATION,{value},"));
        self
    }

    /// Raw events line, for malformed rows
    pub fn raw_event(mut self, line: &str) -> Self {
        self.events.push(line.to_string());
        self
    }

    /// Write the sources and the terminology fixture into a fresh temp dir
    pub fn write(self) -> anyhow::Result<SourceDir> {
        let dir = tempfile::tempdir()?;
        write_csv(
            &dir.path().join("patients.csv"),
            "patient_id,dob,sex",
            &self.patients,
        )?;
        write_csv(
            &dir.path().join("encounters.csv"),
            "patient_id,encounter_date,encounter_class",
            &self.encounters,
        )?;
        write_csv(
            &dir.path().join("events.csv"),
            "patient_id,event_date,code,code_system,event_type,value_num,unit",
            &self.events,
        )?;
        let terminology = dir.path().join("value_sets.json");
        fs::write(&terminology, super::VALUE_SETS_JSON)?;
        Ok(SourceDir { dir, terminology })
    }
}

fn write_csv(path: &Path, header: &str, rows: &[String]) -> anyhow::Result<()> {
    let mut body = String::from(header);
    body.push('\n');
    for row in rows {
        writeln!(body, "{row}")?;
    }
    fs::write(path, body)?;
    Ok(())
}

/// A populated temp directory; removed on drop
pub struct SourceDir {
    dir: TempDir,
    pub terminology: PathBuf,
}

impl SourceDir {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
