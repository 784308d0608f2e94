//! Patient-keyed cache over the CSV sources
//!
//! The store grows monotonically. An id is "cached" once a scan has looked
//! for it, whether or not the demographics source contained it, so neither a
//! repeated preload nor a repeated lookup of an unknown id touches the files
//! again.

use crate::error::StoreResult;
use crate::source::{EncounterColumns, EventColumns, PatientColumns, RowCounts, SourceFiles, scan};
use clitr_gold_types::{ClinicalEvent, Encounter, Patient};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

/// Everything the evaluators need for one patient
#[derive(Debug, Clone)]
pub struct PatientData {
    /// `None` when the id is absent from the demographics source
    pub patient: Option<Patient>,
    pub encounters: Arc<[Encounter]>,
    /// Ascending by `event_date`
    pub events: Arc<[ClinicalEvent]>,
}

impl PatientData {
    /// Build a record from owned rows, sorting events chronologically
    pub fn new(
        patient: Option<Patient>,
        encounters: Vec<Encounter>,
        mut events: Vec<ClinicalEvent>,
    ) -> Self {
        events.sort_by_key(|e| e.event_date);
        Self {
            patient,
            encounters: encounters.into(),
            events: events.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(None, Vec::new(), Vec::new())
    }

    pub fn is_found(&self) -> bool {
        self.patient.is_some()
    }
}

/// Scan instrumentation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Number of source files opened and streamed
    pub file_scans: u64,
    pub rows_read: u64,
    /// Rows whose patient id was in the requested set
    pub rows_matched: u64,
    /// Requested rows dropped as malformed, plus unreadable rows
    pub rows_skipped: u64,
}

impl ScanStats {
    fn record(&mut self, counts: RowCounts) {
        self.file_scans += 1;
        self.rows_read += counts.read;
        self.rows_matched += counts.matched;
        self.rows_skipped += counts.skipped;
    }
}

#[derive(Default)]
struct CohortCache {
    patients: HashMap<String, Patient>,
    encounters: HashMap<String, Arc<[Encounter]>>,
    events: HashMap<String, Arc<[ClinicalEvent]>>,
    loaded: HashSet<String>,
    stats: ScanStats,
}

impl CohortCache {
    fn snapshot(&self, patient_id: &str) -> PatientData {
        PatientData {
            patient: self.patients.get(patient_id).cloned(),
            encounters: self
                .encounters
                .get(patient_id)
                .cloned()
                .unwrap_or_else(|| Arc::from(Vec::new())),
            events: self
                .events
                .get(patient_id)
                .cloned()
                .unwrap_or_else(|| Arc::from(Vec::new())),
        }
    }

    fn commit(&mut self, patient_id: String, data: PatientData) {
        if let Some(patient) = data.patient {
            self.patients.insert(patient_id.clone(), patient);
        }
        self.encounters.insert(patient_id.clone(), data.encounters);
        self.events.insert(patient_id.clone(), data.events);
        self.loaded.insert(patient_id);
    }
}

/// Rows collected by one load, committed only after all three scans succeed
#[derive(Default)]
struct PendingLoad {
    patients: HashMap<String, Patient>,
    encounters: HashMap<String, Vec<Encounter>>,
    events: HashMap<String, Vec<ClinicalEvent>>,
}

/// Cohort-scoped cache of patients, encounters and events
pub struct CohortStore {
    sources: SourceFiles,
    cache: RwLock<CohortCache>,
}

impl CohortStore {
    pub fn new(sources: SourceFiles) -> Self {
        Self {
            sources,
            cache: RwLock::new(CohortCache::default()),
        }
    }

    /// Store over the standard file names in `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(SourceFiles::in_dir(dir))
    }

    pub fn sources(&self) -> &SourceFiles {
        &self.sources
    }

    /// Load every id in `cohort` that is not cached yet
    ///
    /// Performs one pass over each source file, or none at all when the whole
    /// cohort is already cached. Returns the number of ids newly loaded.
    pub fn preload<I, S>(&self, cohort: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cache = self.cache.write();
        let missing: HashSet<String> = cohort
            .into_iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !cache.loaded.contains(id))
            .collect();

        if missing.is_empty() {
            debug!("Preload skipped, cohort already cached");
            return Ok(0);
        }

        self.load(&mut cache, missing)
    }

    /// Fetch one patient, scanning the sources for just this id when needed
    ///
    /// The fallback scan reads every source file in full. Batch callers
    /// should `preload` their cohort first.
    pub fn get(&self, patient_id: &str) -> StoreResult<PatientData> {
        let patient_id = patient_id.trim();
        {
            let cache = self.cache.read();
            if cache.loaded.contains(patient_id) {
                return Ok(cache.snapshot(patient_id));
            }
        }

        let mut cache = self.cache.write();
        if !cache.loaded.contains(patient_id) {
            warn!("Patient {} not preloaded, scanning sources", patient_id);
            self.load(&mut cache, HashSet::from([patient_id.to_string()]))?;
        }
        Ok(cache.snapshot(patient_id))
    }

    /// Seed the cache with an already materialized record
    ///
    /// Returns `false` and leaves the cache untouched if the id is cached or
    /// does not match the demographics row in `data`.
    pub fn insert(&self, patient_id: impl Into<String>, data: PatientData) -> bool {
        let patient_id = patient_id.into();
        if let Some(patient) = data.patient.as_ref().filter(|p| p.patient_id != patient_id) {
            warn!(
                "Refusing to cache patient {} under id {}",
                patient.patient_id, patient_id
            );
            return false;
        }
        let mut cache = self.cache.write();
        if cache.loaded.contains(&patient_id) {
            return false;
        }
        cache.commit(patient_id, data);
        true
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.cache.read().loaded.contains(patient_id)
    }

    /// Number of cached ids, including ids absent from the sources
    pub fn len(&self) -> usize {
        self.cache.read().loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> ScanStats {
        self.cache.read().stats
    }

    fn load(&self, cache: &mut CohortCache, missing: HashSet<String>) -> StoreResult<usize> {
        self.sources.ensure_exist()?;

        let mut pending = PendingLoad::default();
        let wanted = missing.len();

        info!(
            "Loading {} for {} patients",
            self.sources.patients.display(),
            wanted
        );
        let counts = scan::<PatientColumns>(&self.sources.patients, &missing, |patient| {
            pending
                .patients
                .entry(patient.patient_id.clone())
                .or_insert(patient);
            if pending.patients.len() == wanted {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        cache.stats.record(counts);

        info!("Loading {}", self.sources.encounters.display());
        let counts = scan::<EncounterColumns>(&self.sources.encounters, &missing, |encounter| {
            pending
                .encounters
                .entry(encounter.patient_id.clone())
                .or_default()
                .push(encounter);
            ControlFlow::Continue(())
        })?;
        cache.stats.record(counts);

        info!("Loading {}", self.sources.events.display());
        let counts = scan::<EventColumns>(&self.sources.events, &missing, |event| {
            pending
                .events
                .entry(event.patient_id.clone())
                .or_default()
                .push(event);
            ControlFlow::Continue(())
        })?;
        cache.stats.record(counts);

        let found = pending.patients.len();
        for patient_id in missing {
            let data = PatientData::new(
                pending.patients.remove(&patient_id),
                pending.encounters.remove(&patient_id).unwrap_or_default(),
                pending.events.remove(&patient_id).unwrap_or_default(),
            );
            cache.commit(patient_id, data);
        }

        info!(
            "Loaded {} of {} requested patients ({} rows skipped so far)",
            found, wanted, cache.stats.rows_skipped
        );
        Ok(wanted)
    }
}

impl std::fmt::Debug for CohortStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohortStore")
            .field("sources", &self.sources)
            .field("cached", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_patient_data_sorts_events() {
        let data = PatientData::new(
            None,
            vec![],
            vec![
                ClinicalEvent::new("p", date(2024, 3, 1), "b"),
                ClinicalEvent::new("p", date(2021, 3, 1), "a"),
                ClinicalEvent::new("p", date(2024, 3, 1), "c"),
            ],
        );
        let codes: Vec<&str> = data.events.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_refuses_cached_id() {
        let store = CohortStore::in_dir("/nonexistent");
        assert!(store.insert("p-1", PatientData::not_found()));
        assert!(!store.insert("p-1", PatientData::not_found()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats(), ScanStats::default());
    }

    #[test]
    fn test_insert_refuses_mismatched_demographics() {
        let store = CohortStore::in_dir("/nonexistent");
        let patient = Patient::new("p-2", date(1970, 1, 1), clitr_gold_types::Sex::Female);
        let data = PatientData::new(Some(patient), vec![], vec![]);

        assert!(!store.insert("p-1", data.clone()));
        assert!(!store.contains("p-1"));
        assert!(store.is_empty());

        assert!(store.insert("p-2", data));
        assert!(store.get("p-2").unwrap().is_found());
    }

    #[test]
    fn test_get_of_inserted_patient_does_not_scan() {
        let store = CohortStore::in_dir("/nonexistent");
        store.insert("p-1", PatientData::not_found());
        let data = store.get("p-1").unwrap();
        assert!(!data.is_found());
        assert_eq!(store.stats().file_scans, 0);
    }
}
