use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::HierarchyConfig;

/// JSON schema for `hier.toml`, for editor integration and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(HierarchyConfig)
}

/// The schema rendered as pretty JSON.
pub fn json_schema_string() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json_schema())
}
