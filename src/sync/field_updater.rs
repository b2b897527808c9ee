//! Jira field write-back with single-value fallback
//!
//! Some Assets fields are configured as single-object fields and reject a
//! multi-value write. When that happens the first value is written on its
//! own, once.

use super::metrics;
use crate::integrations::IssueFieldWriter;
use crate::mapping::ComponentValue;
use crate::{Result, SyncError};
use tracing::{info, warn};

/// How a field update was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The full value list was written
    Applied { values: usize },
    /// The batch was rejected; only the first value was written
    AppliedFirstOnly { dropped: usize },
}

impl UpdateOutcome {
    /// Number of values now on the Jira field
    pub fn values_written(&self) -> usize {
        match self {
            UpdateOutcome::Applied { values } => *values,
            UpdateOutcome::AppliedFirstOnly { .. } => 1,
        }
    }
}

/// Write `values` to `field_id`, falling back to the first value if a batch is rejected
///
/// A single-value write is never retried. The original batch error is only
/// logged when the fallback succeeds.
pub async fn update_with_fallback(
    writer: &dyn IssueFieldWriter,
    issue_key: &str,
    field_id: &str,
    values: &[ComponentValue],
) -> Result<UpdateOutcome> {
    let Some((first, rest)) = values.split_first() else {
        return Err(SyncError::Other(format!(
            "No values to write to {} on {}",
            field_id, issue_key
        )));
    };

    let batch_error = match writer.write_field(issue_key, field_id, values).await {
        Ok(()) => {
            metrics::record_field_update("success");
            return Ok(UpdateOutcome::Applied {
                values: values.len(),
            });
        }
        Err(e) if rest.is_empty() => {
            metrics::record_field_update("failure");
            return Err(e);
        }
        Err(e) => e,
    };

    warn!(
        issue = %issue_key,
        field = %field_id,
        values = values.len(),
        error = %batch_error,
        first = ?first,
        "Multiple values rejected, retrying with first value only"
    );

    match writer
        .write_field(issue_key, field_id, std::slice::from_ref(first))
        .await
    {
        Ok(()) => {
            info!(
                issue = %issue_key,
                field = %field_id,
                dropped = rest.len(),
                "Wrote first value only"
            );
            metrics::record_field_update("fallback_success");
            Ok(UpdateOutcome::AppliedFirstOnly {
                dropped: rest.len(),
            })
        }
        Err(e) => {
            metrics::record_field_update("failure");
            Err(e)
        }
    }
}
