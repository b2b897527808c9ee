//! incident.io Catalog Adapter
//!
//! Resolves catalog entries to their "object key" attribute using the v2 REST API.

use super::{build_client, CatalogLookup};
use crate::config::{IncidentIoConfig, TlsConfig};
use crate::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for catalog entry fetches
const GET_TIMEOUT: Duration = Duration::from_secs(10);

/// Schema attribute holding the Jira object key (compared case-insensitively)
const OBJECT_KEY_ATTRIBUTE: &str = "object key";

/// incident.io API client
pub struct IncidentIoClient {
    client: Client,
    base_url: String,
    api_token: String,
}

/// `GET /v2/catalog_entries/{id}` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEntryResponse {
    #[serde(default)]
    pub catalog_entry: CatalogEntry,
    #[serde(default)]
    pub catalog_type: CatalogType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub external_id: Option<String>,
    /// Attribute values keyed by schema attribute id
    #[serde(default)]
    pub attribute_values: HashMap<String, CatalogAttributeValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogAttributeValue {
    #[serde(default)]
    pub value: Option<CatalogLiteral>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogLiteral {
    #[serde(default)]
    pub literal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogType {
    #[serde(default)]
    pub schema: CatalogSchema,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSchema {
    #[serde(default)]
    pub attributes: Vec<CatalogAttribute>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogAttribute {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl CatalogEntryResponse {
    /// Schema id of the first attribute named "object key"
    pub fn object_key_attribute_id(&self) -> Option<&str> {
        self.catalog_type
            .schema
            .attributes
            .iter()
            .find(|attr| attr.name.to_lowercase() == OBJECT_KEY_ATTRIBUTE)
            .map(|attr| attr.id.as_str())
    }

    /// Literal value of the object key attribute for this entry
    pub fn object_key(&self) -> Option<&str> {
        let attribute_id = self.object_key_attribute_id()?;
        self.catalog_entry
            .attribute_values
            .get(attribute_id)?
            .value
            .as_ref()?
            .literal
            .as_deref()
    }
}

impl IncidentIoClient {
    /// Create a new incident.io client
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &IncidentIoConfig, tls: &TlsConfig) -> Result<Self> {
        let client = build_client(tls.accept_invalid_certs)?;
        let base_url = format!("{}/v2", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a catalog entry together with its type schema
    pub async fn get_catalog_entry(&self, catalog_entry_id: &str) -> Result<CatalogEntryResponse> {
        let url = format!(
            "{}/catalog_entries/{}",
            self.base_url,
            urlencoding::encode(catalog_entry_id)
        );

        debug!(catalog_entry_id = %catalog_entry_id, "Fetching catalog entry");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(GET_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::CatalogLookup {
                catalog_entry_id: catalog_entry_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogLookup for IncidentIoClient {
    async fn object_key(&self, catalog_entry_id: &str) -> Result<String> {
        let entry = self.get_catalog_entry(catalog_entry_id).await?;

        match entry.object_key() {
            Some(object_key) => {
                info!(
                    catalog_entry_id = %catalog_entry_id,
                    object_key = %object_key,
                    "Found object key for catalog entry"
                );
                Ok(object_key.to_string())
            }
            None => {
                warn!(
                    catalog_entry_id = %catalog_entry_id,
                    has_attribute = entry.object_key_attribute_id().is_some(),
                    "No object key found for catalog entry"
                );
                Err(SyncError::ObjectKeyNotFound {
                    catalog_entry_id: catalog_entry_id.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(attributes: serde_json::Value, values: serde_json::Value) -> CatalogEntryResponse {
        serde_json::from_value(json!({
            "catalog_entry": {
                "id": "01HCAT",
                "name": "Payments",
                "attribute_values": values
            },
            "catalog_type": { "schema": { "attributes": attributes } }
        }))
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = IncidentIoConfig {
            base_url: "https://api.incident.io/".to_string(),
            api_token: "token".to_string(),
        };
        let client = IncidentIoClient::new(&config, &TlsConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.incident.io/v2");
    }

    #[test]
    fn test_object_key_found_case_insensitively() {
        let entry = response(
            json!([
                { "id": "attr-owner", "name": "Owner" },
                { "id": "attr-key", "name": "Object Key" }
            ]),
            json!({
                "attr-owner": { "value": { "literal": "team-payments" } },
                "attr-key": { "value": { "literal": "PIN-3" } }
            }),
        );
        assert_eq!(entry.object_key_attribute_id(), Some("attr-key"));
        assert_eq!(entry.object_key(), Some("PIN-3"));
    }

    #[test]
    fn test_first_matching_attribute_wins() {
        let entry = response(
            json!([
                { "id": "a1", "name": "OBJECT KEY" },
                { "id": "a2", "name": "object key" }
            ]),
            json!({
                "a1": { "value": { "literal": "PIN-1" } },
                "a2": { "value": { "literal": "PIN-2" } }
            }),
        );
        assert_eq!(entry.object_key(), Some("PIN-1"));
    }

    #[test]
    fn test_partial_name_does_not_match() {
        let entry = response(
            json!([{ "id": "a1", "name": "Object key (legacy)" }]),
            json!({ "a1": { "value": { "literal": "PIN-1" } } }),
        );
        assert_eq!(entry.object_key(), None);
    }

    #[test]
    fn test_incomplete_schema_attribute_is_tolerated() {
        let entry = response(
            json!([
                { "id": "attr-unnamed" },
                { "name": "Orphan" },
                { "id": "attr-key", "name": "Object key" }
            ]),
            json!({ "attr-key": { "value": { "literal": "PIN-3" } } }),
        );
        assert_eq!(entry.catalog_type.schema.attributes.len(), 3);
        assert_eq!(entry.object_key(), Some("PIN-3"));
    }

    #[test]
    fn test_missing_value_is_not_found() {
        let entry = response(
            json!([{ "id": "a1", "name": "Object key" }]),
            json!({ "a1": { "array_value": [] } }),
        );
        assert_eq!(entry.object_key_attribute_id(), Some("a1"));
        assert_eq!(entry.object_key(), None);

        let entry = response(json!([{ "id": "a1", "name": "Object key" }]), json!({}));
        assert_eq!(entry.object_key(), None);
    }
}
