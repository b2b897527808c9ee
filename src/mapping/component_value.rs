//! Jira Assets object reference values

use serde::{Deserialize, Serialize};

/// Value written into a Jira Assets custom field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentValue {
    /// Workspace-scoped reference, `<workspace-id>:<object-id>`
    pub id: String,

    /// Bare object id
    #[serde(rename = "objectId")]
    pub object_id: String,
}

impl ComponentValue {
    /// Compose the reference for `object_id` inside `workspace_id`
    pub fn format(workspace_id: &str, object_id: &str) -> Self {
        Self {
            id: format!("{}:{}", workspace_id, object_id),
            object_id: object_id.to_string(),
        }
    }
}
