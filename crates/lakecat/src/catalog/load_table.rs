use std::{collections::BTreeMap, sync::Arc};

use lakecat_ext::catalog::rest::{ErrorModel, GetTableResponse};

use super::remote_error;
use crate::{
    config::{BRANCH_OPTION_KEY, PATH_OPTION_KEY},
    service::{
        CatalogError, FileAccess, FileAccessResolver, Identifier, Location, RemoteMetadataService,
        Result, TableMetadata, TableNotFound,
    },
};

/// A fully resolved table, ready to be handed to readers and writers.
pub struct Table<S> {
    identifier: Identifier,
    metadata: TableMetadata,
    location: Location,
    file_access: FileAccess<S>,
}

impl<S> std::fmt::Debug for Table<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("identifier", &self.identifier)
            .field("metadata", &self.metadata)
            .field("location", &self.location)
            .field("file_access", &self.file_access)
            .finish()
    }
}

impl<S> Clone for Table<S> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            metadata: self.metadata.clone(),
            location: self.location.clone(),
            file_access: self.file_access.clone(),
        }
    }
}

impl<S> Table<S> {
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    #[must_use]
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// Resolved options, including path, audit fields and branch.
    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        self.metadata.options()
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn uuid(&self) -> &str {
        self.metadata.uuid()
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.metadata.is_external()
    }

    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.identifier.branch()
    }

    #[must_use]
    pub fn file_access(&self) -> &FileAccess<S> {
        &self.file_access
    }
}

/// Turns remote table descriptions into [`Table`] handles.
pub struct CatalogResolver<S> {
    service: Arc<S>,
    file_access: FileAccessResolver<S>,
}

impl<S> std::fmt::Debug for CatalogResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogResolver")
            .field("file_access", &self.file_access)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteMetadataService> CatalogResolver<S> {
    pub fn new(service: Arc<S>, file_access: FileAccessResolver<S>) -> Self {
        Self {
            service,
            file_access,
        }
    }

    #[must_use]
    pub fn file_access(&self) -> &FileAccessResolver<S> {
        &self.file_access
    }

    /// Fetch and resolve a table.
    ///
    /// Options are built from the declared schema options, overlaid in order with
    /// the storage path, the audit fields of the response and the branch of
    /// `identifier`. Later sources overwrite colliding keys, including user-declared
    /// values under the reserved `path` and `branch` keys. Resolving the same table
    /// twice without a server-side change yields identical options.
    ///
    /// # Errors
    /// - [`CatalogError::TableNotFound`] if the service reports the table as absent
    /// - [`CatalogError::InvalidLocation`] if the reported path is not a valid location
    /// - [`CatalogError::RemoteService`] for every other failure of the service
    #[tracing::instrument(skip_all, fields(identifier = %identifier))]
    pub async fn load_table(&self, identifier: &Identifier) -> Result<Table<S>> {
        let GetTableResponse {
            id,
            path,
            is_external,
            schema,
            audit,
            ..
        } = self
            .service
            .get_table(identifier)
            .await
            .map_err(table_error(identifier))?;

        let location = path.parse::<Location>()?;

        let mut options = schema.options().clone();
        options.insert(PATH_OPTION_KEY.to_string(), location.to_string());
        audit.put_audit_options_to(&mut options);
        if let Some(branch) = identifier.branch() {
            options.insert(BRANCH_OPTION_KEY.to_string(), branch.to_string());
        }

        let metadata = TableMetadata::new(schema.copy(options), is_external, id);
        let file_access = self.file_access.resolve(identifier, &location);

        tracing::debug!(
            %location,
            is_external,
            token_access = !file_access.is_static(),
            "Resolved table"
        );

        Ok(Table {
            identifier: identifier.clone(),
            metadata,
            location,
            file_access,
        })
    }
}

fn table_error(identifier: &Identifier) -> impl FnOnce(ErrorModel) -> CatalogError + '_ {
    move |e| {
        if e.is_not_found() {
            TableNotFound::new(identifier.clone())
                .append_detail(e.message)
                .into()
        } else {
            remote_error(e)
        }
    }
}
