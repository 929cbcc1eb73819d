use std::collections::BTreeMap;

pub use lakecat_ext::spec::{DataField, Schema};

use crate::config::{BRANCH_OPTION_KEY, DB_LOCATION_KEY, PATH_OPTION_KEY};

/// A database as seen by the client, with its location and provenance already
/// folded into `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
    pub options: BTreeMap<String, String>,
}

impl Database {
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.options.get(DB_LOCATION_KEY).map(String::as_str)
    }
}

/// Resolved metadata of a single table.
///
/// `schema.options()` always carries the storage path, and the branch if the table
/// was addressed through one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    schema: Schema,
    is_external: bool,
    uuid: String,
}

impl TableMetadata {
    #[must_use]
    pub fn new(schema: Schema, is_external: bool, uuid: impl Into<String>) -> Self {
        Self {
            schema,
            is_external,
            uuid: uuid.into(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        self.schema.options()
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.options().get(PATH_OPTION_KEY).map(String::as_str)
    }

    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.options().get(BRANCH_OPTION_KEY).map(String::as_str)
    }
}
