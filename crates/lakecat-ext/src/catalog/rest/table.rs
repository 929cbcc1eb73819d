use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use veil::Redact;

use super::AuditFields;
use crate::spec::Schema;

/// Result of describing a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GetTableResponse {
    /// Stable identity of the table.
    #[builder(setter(into))]
    pub id: String,
    /// Object name of the table within its database.
    #[builder(setter(into))]
    pub name: String,
    /// Absolute storage path of the table.
    #[builder(setter(into))]
    pub path: String,
    #[serde(default)]
    #[builder(default)]
    pub is_external: bool,
    #[serde(default)]
    #[builder(default)]
    pub schema_id: i64,
    pub schema: Schema,
    #[serde(flatten)]
    #[builder(default)]
    pub audit: AuditFields,
}

/// Short-lived file-access credential scoped to a single table.
#[derive(Redact, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTableTokenResponse {
    #[redact]
    pub token: BTreeMap<String, String>,
    /// Milliseconds since the unix epoch after which the token is no longer valid.
    pub expires_at_millis: i64,
}
