//! Gold-truth evaluation facade
//!
//! `GoldTruthEngine` ties a `CohortStore`, a `ValueSetIndex` and a
//! `MeasureRegistry` to one index date. Batch callers preload their cohort
//! once, then ask for per-patient verdicts or whole-cohort records.
//!
//! Unknown patients and unknown measure ids are answers, not errors: they
//! come back as `None` or as an all-false `MeasureVerdict`. Only loading
//! failures surface as `EngineError`.

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::error::EngineResult;
use crate::measures::{Measure, MeasureId};
use crate::registry::MeasureRegistry;
use crate::result::{GoldTruthRecord, MeasureResult, MeasureResults, MeasureVerdict, PopulationSummary};
use crate::terminology::ValueSetIndex;
use chrono::NaiveDate;
use clitr_gold_store::{CohortStore, PatientData};
use log::{debug, info};
use rayon::prelude::*;
use std::sync::Arc;

/// Evaluates registered measures for patients of one cohort store
#[derive(Debug, Clone)]
pub struct GoldTruthEngine {
    index_date: NaiveDate,
    store: Arc<CohortStore>,
    value_sets: Arc<ValueSetIndex>,
    registry: MeasureRegistry,
    parallel: bool,
}

impl GoldTruthEngine {
    /// Load terminology and open the sources named by `config`
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let value_sets = ValueSetIndex::from_json_file(&config.terminology_path)?;
        let store = CohortStore::new(config.source_files());
        let mut engine = Self::new(config.index_date, Arc::new(store), Arc::new(value_sets))?;
        engine.parallel = config.parallel;
        Ok(engine)
    }

    /// Engine with the standard measures
    pub fn new(
        index_date: NaiveDate,
        store: Arc<CohortStore>,
        value_sets: Arc<ValueSetIndex>,
    ) -> EngineResult<Self> {
        Self::with_registry(
            index_date,
            store,
            value_sets,
            MeasureRegistry::with_standard_measures(),
        )
    }

    /// Engine with a custom registry; fails if the terminology lacks a
    /// category some registered measure needs
    pub fn with_registry(
        index_date: NaiveDate,
        store: Arc<CohortStore>,
        value_sets: Arc<ValueSetIndex>,
        registry: MeasureRegistry,
    ) -> EngineResult<Self> {
        registry.validate(&value_sets)?;
        Ok(Self {
            index_date,
            store,
            value_sets,
            registry,
            parallel: true,
        })
    }

    pub fn index_date(&self) -> NaiveDate {
        self.index_date
    }

    pub fn store(&self) -> &Arc<CohortStore> {
        &self.store
    }

    pub fn value_sets(&self) -> &Arc<ValueSetIndex> {
        &self.value_sets
    }

    pub fn registry(&self) -> &MeasureRegistry {
        &self.registry
    }

    pub fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext::new(self.index_date, &self.value_sets)
    }

    /// Load every id in `cohort` with one pass over each source
    pub fn preload<I, S>(&self, cohort: I) -> EngineResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.store.preload(cohort)?)
    }

    /// Run every registered measure over already fetched data
    ///
    /// `None` when the record has no demographics row.
    pub fn evaluate_data(&self, data: &PatientData) -> Option<MeasureResults> {
        let patient = data.patient.as_ref()?;
        let ctx = self.context();
        Some(
            self.registry
                .iter()
                .map(|measure| {
                    let result = measure.evaluate(&ctx, patient, &data.encounters, &data.events);
                    (measure.id(), result)
                })
                .collect(),
        )
    }

    /// Run every registered measure for one patient; `None` if unknown
    pub fn evaluate_all(&self, patient_id: &str) -> EngineResult<Option<MeasureResults>> {
        let data = self.store.get(patient_id)?;
        Ok(self.evaluate_data(&data))
    }

    /// Run one measure for one patient
    ///
    /// `None` if the patient is unknown or the measure is not registered.
    pub fn evaluate_measure(
        &self,
        patient_id: &str,
        measure_id: MeasureId,
    ) -> EngineResult<Option<MeasureResult>> {
        let Some(measure) = self.registry.get(measure_id) else {
            return Ok(None);
        };
        let data = self.store.get(patient_id)?;
        Ok(self.evaluate_one(measure_id, measure.as_ref(), &data))
    }

    /// `(denominator, numerator, evidence)` for one patient and measure id
    ///
    /// An unknown patient or an unrecognized measure id yields
    /// `MeasureVerdict::absent()`.
    pub fn evaluate_patient(&self, patient_id: &str, measure_id: &str) -> EngineResult<MeasureVerdict> {
        let measure_id = match measure_id.parse::<MeasureId>() {
            Ok(id) => id,
            Err(e) => {
                debug!("{e}, returning absent verdict");
                return Ok(MeasureVerdict::absent());
            }
        };
        Ok(self
            .evaluate_measure(patient_id, measure_id)?
            .map(|result| result.verdict())
            .unwrap_or_default())
    }

    /// Gold-truth records for `cohort`, in input order
    ///
    /// Preloads the cohort first, so each source is scanned at most once.
    pub fn evaluate_cohort<S>(&self, cohort: &[S], measure_id: MeasureId) -> EngineResult<Vec<GoldTruthRecord>>
    where
        S: AsRef<str> + Sync,
    {
        let results = self.cohort_results(cohort, measure_id)?;
        Ok(cohort
            .iter()
            .zip(results)
            .map(|(patient_id, result)| {
                let verdict = result.map(|r| r.verdict()).unwrap_or_default();
                GoldTruthRecord::new(patient_id.as_ref().trim(), measure_id, verdict)
            })
            .collect())
    }

    /// Population tallies for `cohort`
    pub fn summarize<S>(&self, cohort: &[S], measure_id: MeasureId) -> EngineResult<PopulationSummary>
    where
        S: AsRef<str> + Sync,
    {
        let mut summary = PopulationSummary::new(measure_id);
        for result in self.cohort_results(cohort, measure_id)? {
            match result {
                Some(result) => summary.record(&result),
                None => summary.record_not_found(),
            }
        }
        info!(
            "{}: {} checked, {} in denominator, {} in numerator",
            measure_id, summary.total_checked, summary.denominator, summary.numerator
        );
        Ok(summary)
    }

    fn cohort_results<S>(&self, cohort: &[S], measure_id: MeasureId) -> EngineResult<Vec<Option<MeasureResult>>>
    where
        S: AsRef<str> + Sync,
    {
        let Some(measure) = self.registry.get(measure_id) else {
            debug!("{measure_id} is not registered");
            return Ok(vec![None; cohort.len()]);
        };

        self.store.preload(cohort)?;
        let evaluate = |patient_id: &S| -> EngineResult<Option<MeasureResult>> {
            let data = self.store.get(patient_id.as_ref())?;
            Ok(self.evaluate_one(measure_id, measure.as_ref(), &data))
        };

        if self.parallel {
            cohort.par_iter().map(evaluate).collect()
        } else {
            cohort.iter().map(evaluate).collect()
        }
    }

    fn evaluate_one(
        &self,
        measure_id: MeasureId,
        measure: &dyn Measure,
        data: &PatientData,
    ) -> Option<MeasureResult> {
        let patient = data.patient.as_ref()?;
        let result = measure.evaluate(&self.context(), patient, &data.encounters, &data.events);
        if let Some(reason) = &result.debug_reason {
            debug!("{measure_id} {}: {reason}", patient.patient_id);
        }
        Some(result)
    }
}
