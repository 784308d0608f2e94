//! Gold-truth domain types
//!
//! This crate defines the immutable records the gold-truth engine works on:
//! - `Patient` demographics with `Sex`
//! - `Encounter` visits
//! - `ClinicalEvent` coded conditions, procedures, observations and medications
//! - Temporal helpers: lenient date parsing, age at an index date, day
//!   differences and the `MeasurementPeriod`
//!
//! All records derive serde traits so evaluation results (which embed the
//! evidence event) can be written out as JSON lines.

pub mod event;
pub mod patient;
pub mod temporal;

pub use event::{ClinicalEvent, EventType};
pub use patient::{Encounter, ParseSexError, Patient, Sex};
pub use temporal::{LookbackWindow, MeasurementPeriod, calculate_age, days_between, parse_date};
