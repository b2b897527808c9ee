//! incident.io webhook payloads
//!
//! The wire payload carries the incident under a key that depends on the
//! event type. [`IncidentEvent`] resolves that into a tagged union so the
//! sync code never looks at raw discriminators.

use serde::{Deserialize, Deserializer, Serialize};

/// Event type for custom field changes
pub const CUSTOM_FIELD_UPDATED: &str = "incident.custom_field_updated";

/// Event type for the v2 public incident update, also the payload key
pub const INCIDENT_UPDATED_V2: &str = "public_incident.incident_updated_v2";

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw webhook body as delivered by incident.io
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_type: String,

    #[serde(default)]
    pub incident: Option<Incident>,

    #[serde(default, rename = "public_incident.incident_updated_v2")]
    pub incident_updated_v2: Option<Incident>,
}

/// Incident snapshot carried by an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Incident {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_issue_reference: ExternalIssueReference,

    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_field_entries: Vec<CustomFieldEntry>,
}

impl Incident {
    /// Linked Jira issue key, if any
    pub fn linked_issue_key(&self) -> Option<&str> {
        let key = self.external_issue_reference.issue_name.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// Link from an incident to an issue in an external tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIssueReference {
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider: String,

    /// Human-readable issue key, e.g. `PIN-7`
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_permalink: String,
}

/// A custom field and its current values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomFieldEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_field: CustomField,

    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<FieldValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub field_type: String,
}

/// One value of a custom field; only catalog-backed values carry an entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_catalog_entry: Option<CatalogEntryRef>,
}

/// Reference to an incident.io catalog entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEntryRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_id: String,
}

/// Parsed webhook event
#[derive(Debug, Clone)]
pub enum IncidentEvent {
    /// `incident.custom_field_updated`
    CustomFieldUpdated(Incident),
    /// `public_incident.incident_updated_v2`
    IncidentUpdatedV2(Incident),
    /// Any other event type; carries the type for logging
    Ignored(String),
}

impl IncidentEvent {
    /// Parse a raw webhook body
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let payload: WebhookPayload = serde_json::from_slice(body)?;
        Ok(payload.into())
    }

    /// Label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            IncidentEvent::CustomFieldUpdated(_) => "custom_field_updated",
            IncidentEvent::IncidentUpdatedV2(_) => "incident_updated_v2",
            IncidentEvent::Ignored(_) => "ignored",
        }
    }

    /// Incident snapshot for events that are synced
    pub fn incident(&self) -> Option<&Incident> {
        match self {
            IncidentEvent::CustomFieldUpdated(incident)
            | IncidentEvent::IncidentUpdatedV2(incident) => Some(incident),
            IncidentEvent::Ignored(_) => None,
        }
    }
}

impl From<WebhookPayload> for IncidentEvent {
    fn from(payload: WebhookPayload) -> Self {
        match payload.event_type.as_str() {
            CUSTOM_FIELD_UPDATED => {
                IncidentEvent::CustomFieldUpdated(payload.incident.unwrap_or_default())
            }
            INCIDENT_UPDATED_V2 => {
                IncidentEvent::IncidentUpdatedV2(payload.incident_updated_v2.unwrap_or_default())
            }
            _ => IncidentEvent::Ignored(payload.event_type),
        }
    }
}
