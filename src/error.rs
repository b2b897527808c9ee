//! Error types for the relay
//!
//! Defines one error enum covering configuration, catalog resolution and
//! Jira write-back failures. Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type for relay operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration errors (missing credentials, bad URLs)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The incident has no linked Jira issue to write to
    #[error("No Jira issue linked to incident {incident_id:?}")]
    NoLinkedIssue { incident_id: String },

    /// incident.io catalog lookup returned a non-success status
    #[error("Catalog lookup for {catalog_entry_id} failed: HTTP {status}: {body}")]
    CatalogLookup {
        catalog_entry_id: String,
        status: u16,
        body: String,
    },

    /// Catalog entry has no "object key" attribute, or no value for it
    #[error("No object key found for catalog entry {catalog_entry_id}")]
    ObjectKeyNotFound { catalog_entry_id: String },

    /// Object key does not carry a numeric identifier
    #[error("Could not extract numeric ID from object key: {0:?}")]
    InvalidObjectKey(String),

    /// Jira rejected a field update
    #[error("Jira update of {field_id} on {issue_key} failed: HTTP {status}: {body}")]
    IssueUpdate {
        issue_key: String,
        field_id: String,
        status: u16,
        body: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Whether this error only invalidates a single catalog value.
    ///
    /// Resolution failures are logged and the value is dropped; every other
    /// error aborts the event.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            SyncError::CatalogLookup { .. }
                | SyncError::ObjectKeyNotFound { .. }
                | SyncError::InvalidObjectKey(_)
        )
    }
}
