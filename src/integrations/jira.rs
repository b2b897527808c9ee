//! JIRA Integration Adapter
//!
//! One-way writes of Assets object references into issue custom fields using the REST API.

use super::{build_client, IssueFieldWriter};
use crate::config::{JiraConfig, TlsConfig};
use crate::mapping::ComponentValue;
use crate::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout for update operations
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// JIRA API client for custom field updates
pub struct JiraAdapter {
    client: Client,
    base_url: String,
    username: String,
    api_token: String,
}

/// `PUT /issue/{key}` body setting whole field values
#[derive(Debug, Clone, Serialize)]
pub struct JiraUpdateRequest<'a> {
    pub fields: BTreeMap<&'a str, &'a [ComponentValue]>,
}

impl<'a> JiraUpdateRequest<'a> {
    pub fn single_field(field_id: &'a str, values: &'a [ComponentValue]) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field_id, values);
        Self { fields }
    }
}

impl JiraAdapter {
    /// Create a new JIRA adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &JiraConfig, tls: &TlsConfig) -> Result<Self> {
        let client = build_client(tls.accept_invalid_certs)?;
        let base_url = format!("{}/rest/api/3", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the value of a custom field on an issue
    pub async fn update_custom_field(
        &self,
        issue_key: &str,
        field_id: &str,
        values: &[ComponentValue],
    ) -> Result<()> {
        let url = format!("{}/issue/{}", self.base_url, urlencoding::encode(issue_key));
        let body = JiraUpdateRequest::single_field(field_id, values);
        let payload = serde_json::to_string(&body)?;

        debug!(issue = %issue_key, payload = %payload, "Updating JIRA issue");

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.api_token))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .timeout(WRITE_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => {
                info!(
                    issue = %issue_key,
                    field = %field_id,
                    values = values.len(),
                    status = %response.status(),
                    "Updated JIRA custom field"
                );
                Ok(())
            }
            status => {
                let error_body = response.text().await.unwrap_or_default();
                warn!(
                    issue = %issue_key,
                    field = %field_id,
                    status = %status,
                    body = %error_body,
                    "JIRA rejected field update"
                );
                Err(SyncError::IssueUpdate {
                    issue_key: issue_key.to_string(),
                    field_id: field_id.to_string(),
                    status: status.as_u16(),
                    body: error_body,
                })
            }
        }
    }
}

#[async_trait]
impl IssueFieldWriter for JiraAdapter {
    async fn write_field(
        &self,
        issue_key: &str,
        field_id: &str,
        values: &[ComponentValue],
    ) -> Result<()> {
        self.update_custom_field(issue_key, field_id, values).await
    }
}
