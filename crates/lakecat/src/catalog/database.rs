use std::collections::BTreeMap;

use lakecat_ext::catalog::rest::{GetDatabaseResponse, PagedList};

use super::{database_error, remote_error, Catalog};
use crate::{
    config::DB_LOCATION_KEY,
    service::{
        Database, DatabaseAlreadyExists, PropertyChange, PropertyChanges, RemoteMetadataService,
        Result,
    },
};

impl<S: RemoteMetadataService> Catalog<S> {
    #[tracing::instrument(skip(self))]
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.service.list_databases().await.map_err(remote_error)
    }

    /// One page of database names. `max_results` falls back to `page-size-default`.
    #[tracing::instrument(skip(self))]
    pub async fn list_databases_paged(
        &self,
        max_results: Option<u32>,
        page_token: Option<String>,
        database_name_pattern: Option<String>,
    ) -> Result<PagedList<String>> {
        self.service
            .list_databases_paged(
                self.page_size(max_results),
                page_token,
                database_name_pattern,
            )
            .await
            .map_err(remote_error)
    }

    /// Create a database. A conflicting database is an error unless `ignore_if_exists`.
    #[tracing::instrument(skip(self, properties))]
    pub async fn create_database(
        &self,
        name: &str,
        ignore_if_exists: bool,
        properties: BTreeMap<String, String>,
    ) -> Result<()> {
        match self.service.create_database(name, properties).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_conflict() && ignore_if_exists => {
                tracing::debug!("Database already exists, ignoring");
                Ok(())
            }
            Err(e) if e.is_conflict() => Err(DatabaseAlreadyExists::new(name)
                .append_detail(e.message)
                .into()),
            Err(e) => Err(remote_error(e)),
        }
    }

    /// Describe a database.
    ///
    /// The server-reported location is stored under `location` unless the database
    /// properties already carry one. Audit fields are applied last and overwrite
    /// colliding properties.
    #[tracing::instrument(skip(self))]
    pub async fn get_database(&self, name: &str) -> Result<Database> {
        let GetDatabaseResponse {
            name: database_name,
            location,
            mut options,
            audit,
            ..
        } = self
            .service
            .get_database(name)
            .await
            .map_err(database_error(name))?;

        options
            .entry(DB_LOCATION_KEY.to_string())
            .or_insert(location);
        audit.put_audit_options_to(&mut options);

        Ok(Database {
            name: database_name,
            options,
        })
    }

    /// Drop a database. An absent database is an error unless `ignore_if_not_exists`.
    #[tracing::instrument(skip(self))]
    pub async fn drop_database(&self, name: &str, ignore_if_not_exists: bool) -> Result<()> {
        match self.service.drop_database(name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() && ignore_if_not_exists => {
                tracing::debug!("Database does not exist, ignoring");
                Ok(())
            }
            Err(e) => Err(database_error(name)(e)),
        }
    }

    /// Reduce `changes` and forward the keys to remove and the properties to set.
    #[tracing::instrument(skip(self, changes))]
    pub async fn alter_database(&self, name: &str, changes: &[PropertyChange]) -> Result<()> {
        let (set, remove) = PropertyChanges::reduce(changes).into_parts();
        tracing::debug!(
            set = set.len(),
            remove = remove.len(),
            "Altering database properties"
        );

        self.service
            .alter_database(name, remove.into_iter().collect(), set)
            .await
            .map_err(database_error(name))
    }
}
