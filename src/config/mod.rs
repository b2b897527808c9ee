//! Configuration system
//!
//! Loads the relay configuration from environment variables or a YAML file:
//! - incident.io and Jira credentials
//! - Jira Assets workspace id
//! - incident.io field name -> Jira field id mappings
//! - listener port and outbound TLS settings

mod relay_config;
pub mod validation;

pub use relay_config::{
    FieldMapping, FieldMappings, IncidentIoConfig, JiraConfig, RelayConfig, TlsConfig,
};
pub use validation::{validate_config, validate_config_result, ValidationError};
