use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// A single column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct DataField {
    pub id: i32,
    #[builder(setter(into))]
    pub name: String,
    /// Logical type, e.g. `INT`, `STRING NOT NULL`, `DECIMAL(10, 2)`.
    #[builder(setter(into))]
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub description: Option<String>,
}

/// Schema of a table as declared in the catalog.
///
/// Instances are never modified once fetched. [`Schema::copy`] derives a new schema
/// with a replaced options map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    #[builder(default)]
    fields: Vec<DataField>,
    #[serde(default)]
    #[builder(default)]
    partition_keys: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    primary_keys: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    comment: Option<String>,
}

impl Schema {
    #[must_use]
    pub fn fields(&self) -> &[DataField] {
        &self.fields
    }

    #[must_use]
    pub fn partition_keys(&self) -> &[String] {
        &self.partition_keys
    }

    #[must_use]
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// A new schema with `options` replacing the current options map.
    /// All other fields are cloned unchanged.
    #[must_use]
    pub fn copy(&self, options: BTreeMap<String, String>) -> Schema {
        Schema {
            fields: self.fields.clone(),
            partition_keys: self.partition_keys.clone(),
            primary_keys: self.primary_keys.clone(),
            options,
            comment: self.comment.clone(),
        }
    }
}
