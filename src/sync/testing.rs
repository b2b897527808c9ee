//! In-memory upstreams for sync and server tests

use crate::integrations::{CatalogLookup, IssueFieldWriter};
use crate::mapping::ComponentValue;
use crate::{Result, SyncError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Catalog with fixed object keys; unknown ids behave like a 404
#[derive(Default)]
pub struct FakeCatalog {
    object_keys: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_entry(mut self, catalog_entry_id: &str, object_key: &str) -> Self {
        self.object_keys
            .insert(catalog_entry_id.to_string(), object_key.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogLookup for FakeCatalog {
    async fn object_key(&self, catalog_entry_id: &str) -> Result<String> {
        self.lookups
            .lock()
            .unwrap()
            .push(catalog_entry_id.to_string());

        self.object_keys
            .get(catalog_entry_id)
            .cloned()
            .ok_or_else(|| SyncError::CatalogLookup {
                catalog_entry_id: catalog_entry_id.to_string(),
                status: 404,
                body: "not found".to_string(),
            })
    }
}

/// One recorded write attempt
#[derive(Debug, Clone)]
pub struct WriteCall {
    pub issue_key: String,
    pub field_id: String,
    pub values: Vec<ComponentValue>,
}

/// Writer that records every attempt and answers from a fixed policy
pub struct RecordingWriter {
    accept: fn(&str, &[ComponentValue]) -> bool,
    calls: Mutex<Vec<WriteCall>>,
}

impl RecordingWriter {
    pub fn with_policy(accept: fn(&str, &[ComponentValue]) -> bool) -> Self {
        Self {
            accept,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::with_policy(|_, _| true)
    }

    pub fn rejecting_all() -> Self {
        Self::with_policy(|_, _| false)
    }

    /// Rejects any write carrying more than one value
    pub fn rejecting_batches() -> Self {
        Self::with_policy(|_, values| values.len() == 1)
    }

    pub fn calls(&self) -> Vec<WriteCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueFieldWriter for RecordingWriter {
    async fn write_field(
        &self,
        issue_key: &str,
        field_id: &str,
        values: &[ComponentValue],
    ) -> Result<()> {
        self.calls.lock().unwrap().push(WriteCall {
            issue_key: issue_key.to_string(),
            field_id: field_id.to_string(),
            values: values.to_vec(),
        });

        if (self.accept)(field_id, values) {
            Ok(())
        } else {
            Err(SyncError::IssueUpdate {
                issue_key: issue_key.to_string(),
                field_id: field_id.to_string(),
                status: 400,
                body: "{\"errors\":{\"field\":\"rejected\"}}".to_string(),
            })
        }
    }
}
