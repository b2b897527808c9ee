//! External Integrations
//!
//! Adapters for the two upstream REST APIs the relay talks to.
//!
//! # Overview
//!
//! - **incident.io**: catalog lookups that turn a catalog entry id into its
//!   "object key" attribute
//! - **JIRA**: custom field writes onto the issue linked to an incident
//!
//! The sync pipeline only sees the [`CatalogLookup`] and [`IssueFieldWriter`]
//! traits, so tests can swap in recording fakes.

pub mod incident_io;
pub mod jira;

use crate::mapping::ComponentValue;
use crate::Result;
use async_trait::async_trait;

pub use incident_io::{CatalogEntryResponse, IncidentIoClient};
pub use jira::JiraAdapter;

/// Source of catalog object keys
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Resolve the "object key" attribute of a catalog entry
    async fn object_key(&self, catalog_entry_id: &str) -> Result<String>;
}

/// Sink for issue custom field values
#[async_trait]
pub trait IssueFieldWriter: Send + Sync {
    /// Replace the whole value of `field_id` on `issue_key` with `values`
    async fn write_field(
        &self,
        issue_key: &str,
        field_id: &str,
        values: &[ComponentValue],
    ) -> Result<()>;
}

/// Build the shared HTTP client for an upstream API
pub(crate) fn build_client(accept_invalid_certs: bool) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?;
    Ok(client)
}
