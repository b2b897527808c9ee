//! Object key parsing
//!
//! Jira Assets object keys look like `PIN-3`; the numeric suffix is the
//! object id Jira expects in custom field values.

use crate::{Result, SyncError};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Trailing `-<digits>` at the end of an object key, ASCII digits only
    static ref TRAILING_ID: Regex = Regex::new(r"-([0-9]+)$").expect("valid object key pattern");
}

/// Extract the numeric object id from an object key
///
/// `PIN-3` yields `3` and `SUP-2024-10` yields `10`. A bare number is
/// returned unchanged. Anything else is rejected, including signed numbers
/// (`+42`) and digits outside ASCII.
pub fn extract_object_id(object_key: &str) -> Result<String> {
    if object_key.is_empty() {
        return Err(SyncError::InvalidObjectKey(object_key.to_string()));
    }

    if let Some(captures) = TRAILING_ID.captures(object_key) {
        return Ok(captures[1].to_string());
    }

    if object_key.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(object_key.to_string());
    }

    Err(SyncError::InvalidObjectKey(object_key.to_string()))
}
