//! Incident → Jira component synchronization
//!
//! # Overview
//!
//! Each inbound event is handled on its own; nothing is shared between
//! events except read-only configuration and the HTTP clients.
//!
//! 1. **Select**: pick the incident snapshot for the event type
//! 2. **Resolve**: turn each catalog-backed value into a Jira Assets reference
//! 3. **Write**: replace the mapped Jira field, falling back to a single value

pub mod field_updater;
pub mod metrics;
mod orchestrator;
#[cfg(test)]
pub(crate) mod testing;

pub use field_updater::{update_with_fallback, UpdateOutcome};
pub use orchestrator::{ComponentSync, FieldReport, SyncOutcome, SyncReport, ValueResolution};
