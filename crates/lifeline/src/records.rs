//! Record types for lifeline.
//!
//! This module defines the documents the relay persists: the emergency
//! record produced at dispatch time and the medical record produced after
//! a call is triaged. Both are keyed by `call_id`; nothing updates or
//! deletes them after insert.

use serde::{Deserialize, Serialize};

/// A dispatched driver and their last known position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Driver display name.
    pub name: String,
    /// Dispatch status, e.g. `"en_route"`.
    pub status: String,
    /// Last known latitude.
    pub latitude: f64,
    /// Last known longitude.
    pub longitude: f64,
}

/// Where the patient is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientLocation {
    /// Human-readable location label.
    pub location: String,
    /// Latitude of the patient.
    pub latitude: f64,
    /// Longitude of the patient.
    pub longitude: f64,
}

/// An emergency event as reported by the intake flow.
///
/// Stored verbatim in the `emergency` collection. `call_id` joins this
/// record with the medical record of the same call; uniqueness is not
/// enforced by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRecord {
    /// Correlation key shared with the medical record.
    pub call_id: String,
    /// Overall emergency status, e.g. `"active"`.
    pub status: String,
    /// The driver dispatched to the scene.
    pub driver: Driver,
    /// The patient's location.
    pub patient: PatientLocation,
}

/// Caller identity and call metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    /// Patient name.
    pub name: String,
    /// Call date, as reported by the caller system.
    pub date: String,
    /// Call duration, as reported by the caller system.
    pub duration: String,
}

/// The triage outcome of a call.
///
/// Stored verbatim in the `medical_record` collection, same lifecycle as
/// [`EmergencyRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    /// Correlation key shared with the emergency record.
    pub call_id: String,
    /// Caller identity and call metadata.
    pub patient_information: PatientInfo,
    /// Primary complaint in the caller's words.
    pub chief_complaint: String,
    /// Symptoms in the order they were reported.
    pub reported_symptoms: Vec<String>,
    /// Triage summary produced by the analysis pipeline.
    pub ai_analysis: String,
    /// Specialty the case should be routed to.
    pub recommended_specialty: String,
}
