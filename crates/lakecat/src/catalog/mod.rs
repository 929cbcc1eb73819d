mod database;
mod load_table;
mod tables;

use std::{collections::BTreeMap, sync::Arc};

use lakecat_ext::catalog::rest::ErrorModel;
pub use load_table::{CatalogResolver, Table};

use crate::{
    config::CatalogConfig,
    service::{CatalogError, DatabaseNotFound, FileAccessResolver, RemoteMetadataService, Result},
};

/// Client-side catalog over a [`RemoteMetadataService`].
///
/// Listing and lifecycle calls are forwarded to the service. Table loads are
/// resolved by a [`CatalogResolver`] into self-contained [`Table`] handles.
/// No metadata is cached between calls.
pub struct Catalog<S> {
    service: Arc<S>,
    config: CatalogConfig,
    options: Arc<BTreeMap<String, String>>,
    resolver: CatalogResolver<S>,
}

impl<S> std::fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteMetadataService> Catalog<S> {
    /// Connect to the metadata service.
    ///
    /// Fetches the server-side configuration once and merges it with `client_options`:
    /// server defaults, then `client_options`, then server overrides.
    /// The catalog configuration is extracted from the merged options.
    ///
    /// # Errors
    /// Fails if the configuration cannot be fetched or is invalid.
    #[tracing::instrument(name = "catalog_connect", skip_all)]
    pub async fn connect(
        service: Arc<S>,
        client_options: BTreeMap<String, String>,
    ) -> Result<Self> {
        let server_config = service.get_config().await.map_err(remote_error)?;
        let options = server_config.merge(&client_options);
        let config = CatalogConfig::from_options(&options)?;

        tracing::info!(
            data_token_enabled = config.data_token_enabled,
            warehouse = ?config.warehouse,
            "Connected to metadata service"
        );

        Ok(Self::new(service, config, options))
    }

    /// Build a catalog from an already resolved configuration. Performs no network call.
    pub fn new(service: Arc<S>, config: CatalogConfig, options: BTreeMap<String, String>) -> Self {
        let options = Arc::new(options);
        let file_access = FileAccessResolver::new(
            config.data_token_enabled,
            config.token_refresh_margin(),
            options.clone(),
            service.clone(),
        );

        Self {
            resolver: CatalogResolver::new(service.clone(), file_access),
            service,
            config,
            options,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Effective catalog options, after merging server configuration.
    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    #[must_use]
    pub fn resolver(&self) -> &CatalogResolver<S> {
        &self.resolver
    }

    fn page_size(&self, max_results: Option<u32>) -> Option<u32> {
        max_results.or(self.config.page_size_default)
    }
}

pub(crate) fn remote_error(e: ErrorModel) -> CatalogError {
    tracing::debug!(code = e.code, error_type = %e.r#type, "Metadata service call failed");
    e.into()
}

/// A `404` on a database-scoped call means the database does not exist.
pub(crate) fn database_error(database: &str) -> impl FnOnce(ErrorModel) -> CatalogError + '_ {
    move |e| {
        if e.is_not_found() {
            DatabaseNotFound::new(database)
                .append_detail(e.message)
                .into()
        } else {
            remote_error(e)
        }
    }
}
