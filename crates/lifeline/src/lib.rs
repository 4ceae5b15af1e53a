//! `lifeline` - backend relay for emergency response deployments
//!
//! This library provides the HTTP surface, the network capability adapter,
//! and the document store gateway behind the `lifelined` binary: device
//! location and status lookups proxied to a telecom network-capability
//! provider, QoD session provisioning across three quality tiers, and
//! emergency/medical record persistence.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod records;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use network::{NetworkAdapter, QosTier, SessionBatch, SessionOutcome, StatusOutcome};
pub use records::{EmergencyRecord, MedicalRecord};
pub use store::{DocumentStore, MemoryStore, MongoStore};
