//! Incident → Jira component sync
//!
//! Drives one webhook event through the pipeline:
//! catalog lookup → object id extraction → reference formatting → field write.
//!
//! Mappings are processed in configuration order. A value that cannot be
//! resolved is dropped from its field; a field write that fails even after the
//! fallback stops the remaining mappings for that event.

use super::field_updater::{update_with_fallback, UpdateOutcome};
use super::metrics;
use crate::config::{FieldMapping, FieldMappings, RelayConfig};
use crate::event::{CustomFieldEntry, FieldValue, Incident, IncidentEvent};
use crate::integrations::{CatalogLookup, IncidentIoClient, IssueFieldWriter, JiraAdapter};
use crate::mapping::{extract_object_id, ComponentValue};
use crate::{Result, SyncError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of resolving one custom field value
#[derive(Debug)]
pub enum ValueResolution {
    /// Catalog entry resolved to a Jira reference
    Resolved {
        catalog_entry_id: String,
        value: ComponentValue,
    },
    /// Value is not backed by a catalog entry
    NotCatalogBacked,
    /// Lookup or extraction failed; the value is dropped
    Failed {
        catalog_entry_id: String,
        error: SyncError,
    },
}

impl ValueResolution {
    pub fn value(&self) -> Option<&ComponentValue> {
        match self {
            ValueResolution::Resolved { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// What happened to one mapped field
#[derive(Debug, Clone)]
pub struct FieldReport {
    pub concept: &'static str,
    pub jira_field_id: String,
    pub resolved: usize,
    pub failed: usize,
    /// `None` when no value resolved and the write was skipped
    pub update: Option<UpdateOutcome>,
}

/// Summary of a synced incident
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub issue_key: String,
    pub fields: Vec<FieldReport>,
}

impl SyncReport {
    /// Number of Jira fields written
    pub fn fields_updated(&self) -> usize {
        self.fields.iter().filter(|f| f.update.is_some()).count()
    }
}

/// Outcome of handling a webhook event
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Event type is not one the relay acts on
    Ignored { event_type: String },
    Synced(SyncReport),
}

/// Component field syncer
///
/// Holds read-only configuration and the two upstream clients; safe to
/// share across concurrent requests.
pub struct ComponentSync {
    catalog: Arc<dyn CatalogLookup>,
    writer: Arc<dyn IssueFieldWriter>,
    workspace_id: String,
    mappings: FieldMappings,
}

impl ComponentSync {
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        writer: Arc<dyn IssueFieldWriter>,
        workspace_id: impl Into<String>,
        mappings: FieldMappings,
    ) -> Self {
        Self {
            catalog,
            writer,
            workspace_id: workspace_id.into(),
            mappings,
        }
    }

    /// Build a syncer backed by the real incident.io and Jira clients
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let catalog = IncidentIoClient::new(&config.incident_io, &config.tls)?;
        let writer = JiraAdapter::new(&config.jira, &config.tls)?;

        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(writer),
            config.jira.workspace_id.clone(),
            config.field_mappings.clone(),
        ))
    }

    /// Handle a parsed webhook event
    pub async fn handle_event(&self, event: &IncidentEvent) -> Result<SyncOutcome> {
        let incident = match event {
            IncidentEvent::Ignored(event_type) => {
                info!(event_type = %event_type, "Ignoring event type");
                return Ok(SyncOutcome::Ignored {
                    event_type: event_type.clone(),
                });
            }
            IncidentEvent::CustomFieldUpdated(incident)
            | IncidentEvent::IncidentUpdatedV2(incident) => incident,
        };

        let started = Instant::now();
        let result = self.sync_incident(incident).await;
        metrics::record_sync_duration(event.kind(), started.elapsed().as_secs_f64());

        result.map(SyncOutcome::Synced)
    }

    /// Sync every mapped component field of an incident onto its linked issue
    pub async fn sync_incident(&self, incident: &Incident) -> Result<SyncReport> {
        let issue_key = incident
            .linked_issue_key()
            .ok_or_else(|| SyncError::NoLinkedIssue {
                incident_id: incident.id.clone(),
            })?;

        info!(
            incident = %incident.id,
            issue = %issue_key,
            "Processing incident update for JIRA issue"
        );

        let mut report = SyncReport {
            issue_key: issue_key.to_string(),
            fields: Vec::new(),
        };

        for (concept, mapping) in self.mappings.iter() {
            let entries = incident
                .custom_field_entries
                .iter()
                .filter(|entry| entry.custom_field.name == mapping.incident_field_name);

            for entry in entries {
                info!(
                    concept = concept,
                    field = %entry.custom_field.name,
                    "Processing component field"
                );

                match self.sync_field(issue_key, concept, mapping, entry).await {
                    Ok(field) => report.fields.push(field),
                    Err(e) => {
                        error!(
                            issue = %issue_key,
                            concept = concept,
                            jira_field = %mapping.jira_field_id,
                            error = %e,
                            "Failed to process component field"
                        );
                        return Err(e);
                    }
                }
            }
        }

        info!(
            issue = %issue_key,
            fields_updated = report.fields_updated(),
            "Incident sync complete"
        );

        Ok(report)
    }

    async fn sync_field(
        &self,
        issue_key: &str,
        concept: &'static str,
        mapping: &FieldMapping,
        entry: &CustomFieldEntry,
    ) -> Result<FieldReport> {
        let resolutions = self.resolve_values(entry).await;

        let values: Vec<ComponentValue> = resolutions
            .iter()
            .filter_map(ValueResolution::value)
            .cloned()
            .collect();
        let failed = resolutions
            .iter()
            .filter(|r| matches!(r, ValueResolution::Failed { .. }))
            .count();

        let mut field = FieldReport {
            concept,
            jira_field_id: mapping.jira_field_id.clone(),
            resolved: values.len(),
            failed,
            update: None,
        };

        if values.is_empty() {
            debug!(
                concept = concept,
                failed = failed,
                "No resolvable values, skipping field"
            );
            return Ok(field);
        }

        let outcome = update_with_fallback(
            self.writer.as_ref(),
            issue_key,
            &mapping.jira_field_id,
            &values,
        )
        .await?;
        field.update = Some(outcome);

        Ok(field)
    }

    /// Resolve every value of a custom field entry, in order
    pub async fn resolve_values(&self, entry: &CustomFieldEntry) -> Vec<ValueResolution> {
        let mut resolutions = Vec::with_capacity(entry.values.len());
        for value in &entry.values {
            resolutions.push(self.resolve_value(value).await);
        }
        resolutions
    }

    async fn resolve_value(&self, value: &FieldValue) -> ValueResolution {
        let Some(catalog_entry) = value
            .value_catalog_entry
            .as_ref()
            .filter(|entry| !entry.id.is_empty())
        else {
            return ValueResolution::NotCatalogBacked;
        };
        let catalog_entry_id = catalog_entry.id.clone();

        let object_key = match self.catalog.object_key(&catalog_entry_id).await {
            Ok(object_key) => {
                metrics::record_catalog_lookup("found");
                object_key
            }
            Err(error) => {
                let result = match error {
                    SyncError::ObjectKeyNotFound { .. } => "not_found",
                    ref e if e.is_resolution_failure() => "rejected",
                    _ => "transport_error",
                };
                metrics::record_catalog_lookup(result);
                metrics::record_value_skipped("lookup_failed");
                warn!(
                    catalog_entry_id = %catalog_entry_id,
                    error = %error,
                    "Failed to get object key for catalog entry"
                );
                return ValueResolution::Failed {
                    catalog_entry_id,
                    error,
                };
            }
        };

        match extract_object_id(&object_key) {
            Ok(object_id) => {
                let value = ComponentValue::format(&self.workspace_id, &object_id);
                info!(
                    catalog_entry = %catalog_entry.name,
                    id = %value.id,
                    object_id = %value.object_id,
                    "Mapped catalog entry"
                );
                ValueResolution::Resolved {
                    catalog_entry_id,
                    value,
                }
            }
            Err(error) => {
                metrics::record_value_skipped("invalid_object_key");
                warn!(
                    catalog_entry_id = %catalog_entry_id,
                    object_key = %object_key,
                    "Failed to extract object ID from key"
                );
                ValueResolution::Failed {
                    catalog_entry_id,
                    error,
                }
            }
        }
    }
}
