//! Configuration validation
//!
//! Validates relay configuration before the listener starts:
//! - Required credentials and identifiers are present
//! - URLs are http(s)
//! - Field mappings are complete

use super::relay_config::RelayConfig;
use crate::SyncError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a relay configuration, collecting every problem
pub fn validate_config(config: &RelayConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let required = [
        ("jira.base_url", "JIRA_BASE_URL", &config.jira.base_url),
        ("jira.username", "JIRA_USERNAME", &config.jira.username),
        ("jira.api_token", "JIRA_API_TOKEN", &config.jira.api_token),
        (
            "jira.workspace_id",
            "JIRA_WORKSPACE_ID",
            &config.jira.workspace_id,
        ),
        (
            "incident_io.api_token",
            "INCIDENT_API_TOKEN",
            &config.incident_io.api_token,
        ),
        (
            "field_mappings.impacted_components.jira_field_id",
            "IMPACTED_COMPONENT_JIRA_FIELD_ID",
            &config.field_mappings.impacted_components.jira_field_id,
        ),
        (
            "field_mappings.responsible_components.jira_field_id",
            "RESPONSIBLE_COMPONENT_JIRA_FIELD_ID",
            &config.field_mappings.responsible_components.jira_field_id,
        ),
    ];

    for (field, env_var, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(
                field,
                format!("is required (set {})", env_var),
            ));
        }
    }

    for (field, url) in [
        ("jira.base_url", &config.jira.base_url),
        ("incident_io.base_url", &config.incident_io.base_url),
    ] {
        if !url.is_empty() && !is_http_url(url) {
            errors.push(ValidationError::new(
                field,
                format!("Invalid URL (expected http:// or https://): {}", url),
            ));
        }
    }

    for (concept, mapping) in config.field_mappings.iter() {
        if mapping.incident_field_name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("field_mappings.{}.incident_field_name", concept),
                "Incident field name cannot be empty",
            ));
        }
    }

    if config.listen_port == 0 {
        errors.push(ValidationError::new(
            "listen_port",
            "Port must be greater than 0",
        ));
    }

    if config.tls.accept_invalid_certs {
        tracing::warn!(
            "TLS certificate verification is DISABLED for upstream APIs (tls.accept_invalid_certs)"
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &RelayConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        SyncError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
