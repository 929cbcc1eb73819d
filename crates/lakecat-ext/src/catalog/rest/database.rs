use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::AuditFields;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GetDatabaseResponse {
    #[builder(setter(into))]
    pub id: String,
    #[builder(setter(into))]
    pub name: String,
    /// Storage location of the database as reported by the service.
    #[builder(setter(into))]
    pub location: String,
    #[serde(default)]
    #[builder(default)]
    pub options: BTreeMap<String, String>,
    #[serde(flatten)]
    #[builder(default)]
    pub audit: AuditFields,
}
