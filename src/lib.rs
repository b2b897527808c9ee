//! incident-jira-relay - incident.io component fields into Jira Assets
//!
//! Receives incident.io webhooks and mirrors the incident's component custom
//! fields onto the Jira issue linked to that incident. Each catalog-backed
//! value is resolved to its Jira Assets object id through the catalog entry's
//! "object key" attribute.
//!
//! # Architecture
//!
//! - **event**: Webhook payload parsing and event selection
//! - **mapping**: Object key parsing and Jira Assets value formatting
//! - **integrations**: incident.io catalog and Jira REST clients
//! - **sync**: Resolution, field write-back and per-event orchestration
//! - **server**: HTTP listener (axum)
//! - **config**: Environment / YAML configuration and validation

pub mod config;
pub mod error;
pub mod event;
pub mod integrations;
pub mod logging;
pub mod mapping;
pub mod server;
pub mod sync;

// Re-exports
pub use error::{Result, SyncError};
