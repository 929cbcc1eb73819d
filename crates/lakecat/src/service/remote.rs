use std::collections::BTreeMap;

use lakecat_ext::catalog::rest::{
    ConfigResponse, ErrorModel, GetDatabaseResponse, GetTableResponse, GetTableTokenResponse,
    PagedList,
};

use super::Identifier;

pub type RemoteResult<T> = std::result::Result<T, ErrorModel>;

/// Network-facing metadata service the catalog delegates to.
///
/// Implementations own transport, authentication, timeouts and retries. Failures are
/// reported as [`ErrorModel`]s carrying an HTTP-style status code: `404` for absent
/// databases or tables and `409` for conflicting creates are interpreted by the
/// catalog, anything else is handed to the caller unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RemoteMetadataService: Send + Sync {
    /// Server-side catalog configuration, fetched once when a catalog connects.
    async fn get_config(&self) -> RemoteResult<ConfigResponse>;

    async fn list_databases(&self) -> RemoteResult<Vec<String>>;

    async fn list_databases_paged(
        &self,
        max_results: Option<u32>,
        page_token: Option<String>,
        database_name_pattern: Option<String>,
    ) -> RemoteResult<PagedList<String>>;

    async fn create_database(
        &self,
        name: &str,
        properties: BTreeMap<String, String>,
    ) -> RemoteResult<()>;

    async fn get_database(&self, name: &str) -> RemoteResult<GetDatabaseResponse>;

    async fn drop_database(&self, name: &str) -> RemoteResult<()>;

    async fn alter_database(
        &self,
        name: &str,
        remove_keys: Vec<String>,
        set_properties: BTreeMap<String, String>,
    ) -> RemoteResult<()>;

    async fn list_tables(&self, database: &str) -> RemoteResult<Vec<String>>;

    async fn list_tables_paged(
        &self,
        database: &str,
        max_results: Option<u32>,
        page_token: Option<String>,
        table_name_pattern: Option<String>,
    ) -> RemoteResult<PagedList<String>>;

    async fn get_table(&self, identifier: &Identifier) -> RemoteResult<GetTableResponse>;

    /// Short-lived file-access credential for the storage of `identifier`.
    async fn load_table_token(&self, identifier: &Identifier)
    -> RemoteResult<GetTableTokenResponse>;
}
