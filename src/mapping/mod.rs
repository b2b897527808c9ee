//! Catalog reference mapping
//!
//! Pure conversions from incident.io catalog object keys to the Jira Assets
//! reference values written back onto issues.

mod component_value;
mod reference;

pub use component_value::ComponentValue;
pub use reference::extract_object_id;
