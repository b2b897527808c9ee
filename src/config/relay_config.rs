//! Relay configuration
//!
//! Read once at startup, either from the environment (the usual deployment)
//! or from a YAML file, and shared read-only for the life of the process.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_listen_port() -> u16 {
    5000
}

fn default_incident_base_url() -> String {
    "https://api.incident.io".to_string()
}

fn default_impacted_field_name() -> String {
    "Impacted component".to_string()
}

fn default_responsible_field_name() -> String {
    "Responsible components".to_string()
}

/// incident.io API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentIoConfig {
    /// API base URL, without the `/v2` suffix
    #[serde(default = "default_incident_base_url")]
    pub base_url: String,

    /// Bearer token for the catalog API
    #[serde(default)]
    pub api_token: String,
}

impl Default for IncidentIoConfig {
    fn default() -> Self {
        Self {
            base_url: default_incident_base_url(),
            api_token: String::new(),
        }
    }
}

/// Jira Cloud settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Jira instance URL (e.g. `https://example.atlassian.net`)
    #[serde(default)]
    pub base_url: String,

    /// Basic auth username (account email)
    #[serde(default)]
    pub username: String,

    /// Basic auth API token
    #[serde(default)]
    pub api_token: String,

    /// Assets workspace that scopes object references
    #[serde(default)]
    pub workspace_id: String,
}

/// Pairing of an incident.io custom field with a Jira custom field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Custom field name as shown in incident.io
    pub incident_field_name: String,

    /// Jira field id (e.g. `customfield_10100`)
    #[serde(default)]
    pub jira_field_id: String,
}

impl FieldMapping {
    pub fn new(incident_field_name: impl Into<String>, jira_field_id: impl Into<String>) -> Self {
        Self {
            incident_field_name: incident_field_name.into(),
            jira_field_id: jira_field_id.into(),
        }
    }
}

/// The tracked component concepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappings {
    #[serde(default = "default_impacted_mapping")]
    pub impacted_components: FieldMapping,

    #[serde(default = "default_responsible_mapping")]
    pub responsible_components: FieldMapping,
}

fn default_impacted_mapping() -> FieldMapping {
    FieldMapping::new(default_impacted_field_name(), "")
}

fn default_responsible_mapping() -> FieldMapping {
    FieldMapping::new(default_responsible_field_name(), "")
}

impl Default for FieldMappings {
    fn default() -> Self {
        Self {
            impacted_components: default_impacted_mapping(),
            responsible_components: default_responsible_mapping(),
        }
    }
}

impl FieldMappings {
    /// Mappings in processing order, each with its concept label
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldMapping)> {
        [
            ("impacted_components", &self.impacted_components),
            ("responsible_components", &self.responsible_components),
        ]
        .into_iter()
    }
}

/// Outbound TLS settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Skip certificate verification for both upstream APIs.
    ///
    /// Only for deployments behind an intercepting proxy with a private CA.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Port the webhook listener binds to
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default)]
    pub incident_io: IncidentIoConfig,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub field_mappings: FieldMappings,

    /// Shared secret for webhook signatures (accepted but not verified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            incident_io: IncidentIoConfig::default(),
            jira: JiraConfig::default(),
            field_mappings: FieldMappings::default(),
            webhook_secret: None,
            tls: TlsConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset so that defaults apply.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: String| get(key).unwrap_or(default);

        let listen_port = match get("PORT") {
            Some(port) => port.trim().parse().map_err(|_| {
                crate::SyncError::Config(format!("PORT is not a valid port number: {}", port))
            })?,
            None => default_listen_port(),
        };

        let accept_invalid_certs = match get("ACCEPT_INVALID_CERTS") {
            Some(flag) => parse_flag(&flag).ok_or_else(|| {
                crate::SyncError::Config(format!(
                    "ACCEPT_INVALID_CERTS must be true or false, got: {}",
                    flag
                ))
            })?,
            None => false,
        };

        Ok(Self {
            listen_port,
            incident_io: IncidentIoConfig {
                base_url: get_or("INCIDENT_API_BASE_URL", default_incident_base_url()),
                api_token: get_or("INCIDENT_API_TOKEN", String::new()),
            },
            jira: JiraConfig {
                base_url: get_or("JIRA_BASE_URL", String::new()),
                username: get_or("JIRA_USERNAME", String::new()),
                api_token: get_or("JIRA_API_TOKEN", String::new()),
                workspace_id: get_or("JIRA_WORKSPACE_ID", String::new()),
            },
            field_mappings: FieldMappings {
                impacted_components: FieldMapping::new(
                    get_or("IMPACTED_COMPONENT_FIELD_NAME", default_impacted_field_name()),
                    get_or("IMPACTED_COMPONENT_JIRA_FIELD_ID", String::new()),
                ),
                responsible_components: FieldMapping::new(
                    get_or(
                        "RESPONSIBLE_COMPONENT_FIELD_NAME",
                        default_responsible_field_name(),
                    ),
                    get_or("RESPONSIBLE_COMPONENT_JIRA_FIELD_ID", String::new()),
                ),
            },
            webhook_secret: get("WEBHOOK_SECRET"),
            tls: TlsConfig {
                accept_invalid_certs,
            },
        })
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::SyncError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading relay configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            listen_port = config.listen_port,
            jira = %config.jira.base_url,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Human-readable summary with credentials redacted
    pub fn redacted_summary(&self) -> String {
        let mut lines = vec![
            format!("listen_port: {}", self.listen_port),
            format!("incident_io.base_url: {}", self.incident_io.base_url),
            format!(
                "incident_io.api_token: {}",
                redact(&self.incident_io.api_token)
            ),
            format!("jira.base_url: {}", self.jira.base_url),
            format!("jira.username: {}", self.jira.username),
            format!("jira.api_token: {}", redact(&self.jira.api_token)),
            format!("jira.workspace_id: {}", self.jira.workspace_id),
        ];
        for (concept, mapping) in self.field_mappings.iter() {
            lines.push(format!(
                "{}: {:?} -> {}",
                concept, mapping.incident_field_name, mapping.jira_field_id
            ));
        }
        lines.push(format!(
            "webhook_secret: {}",
            self.webhook_secret.as_deref().map(redact).unwrap_or_else(|| "<unset>".to_string())
        ));
        lines.push(format!(
            "tls.accept_invalid_certs: {}",
            self.tls.accept_invalid_certs
        ));
        lines.join("\n")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        "<unset>".to_string()
    } else {
        "<redacted>".to_string()
    }
}
