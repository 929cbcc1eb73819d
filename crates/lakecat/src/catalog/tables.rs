use lakecat_ext::catalog::rest::PagedList;

use super::{database_error, Catalog, Table};
use crate::service::{
    CatalogError, Identifier, RemoteMetadataService, Result, Schema, UnsupportedOperation,
};

impl<S: RemoteMetadataService> Catalog<S> {
    #[tracing::instrument(skip(self))]
    pub async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        self.service
            .list_tables(database)
            .await
            .map_err(database_error(database))
    }

    /// One page of table names in `database`. `max_results` falls back to `page-size-default`.
    #[tracing::instrument(skip(self))]
    pub async fn list_tables_paged(
        &self,
        database: &str,
        max_results: Option<u32>,
        page_token: Option<String>,
        table_name_pattern: Option<String>,
    ) -> Result<PagedList<String>> {
        self.service
            .list_tables_paged(
                database,
                self.page_size(max_results),
                page_token,
                table_name_pattern,
            )
            .await
            .map_err(database_error(database))
    }

    /// Load and resolve a table. Accepts an [`Identifier`] or its string form.
    ///
    /// A malformed string is rejected before the metadata service is contacted.
    pub async fn get_table<I>(&self, identifier: I) -> Result<Table<S>>
    where
        I: TryInto<Identifier>,
        CatalogError: From<I::Error>,
    {
        let identifier = identifier.try_into()?;
        self.resolver.load_table(&identifier).await
    }

    /// Table creation is not supported by this client and always fails,
    /// without contacting the metadata service.
    pub async fn create_table<I>(
        &self,
        _identifier: I,
        _schema: Schema,
        _ignore_if_exists: bool,
    ) -> Result<()>
    where
        I: TryInto<Identifier>,
    {
        tracing::debug!("Rejecting create_table");
        Err(UnsupportedOperation::new("create_table").into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lakecat_ext::catalog::rest::{AuditFields, ErrorModel, GetTableResponse};
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    use crate::{
        catalog::Catalog,
        config::CatalogConfig,
        service::{CatalogError, Identifier, MockRemoteMetadataService, Schema},
    };

    fn table_response() -> GetTableResponse {
        GetTableResponse::builder()
            .id("0191c7a0-7b1d-7c3e-9f00-000000000001")
            .name("orders")
            .path("s3://bucket/sales.db/orders")
            .schema(
                Schema::builder()
                    .options(btreemap! {
                        "bucket".to_string() => "4".to_string(),
                        "path".to_string() => "/user/declared".to_string(),
                    })
                    .build(),
            )
            .audit(AuditFields::builder().owner("alice").build())
            .build()
    }

    fn catalog(service: MockRemoteMetadataService) -> Catalog<MockRemoteMetadataService> {
        Catalog::new(Arc::new(service), CatalogConfig::default(), btreemap! {})
    }

    #[tokio::test]
    async fn test_get_table_accepts_string_and_identifier() {
        let mut service = MockRemoteMetadataService::new();
        service
            .expect_get_table()
            .times(2)
            .returning(|_| Ok(table_response()));
        let catalog = catalog(service);

        let from_str = catalog.get_table("sales.orders").await.unwrap();
        let ident = Identifier::new("sales", "orders").unwrap();
        let from_ident = catalog.get_table(&ident).await.unwrap();

        assert_eq!(from_str.options(), from_ident.options());
        assert_eq!(
            from_str.options(),
            &btreemap! {
                "bucket".to_string() => "4".to_string(),
                "owner".to_string() => "alice".to_string(),
                "path".to_string() => "s3://bucket/sales.db/orders".to_string(),
            }
        );
        assert_eq!(from_str.uuid(), "0191c7a0-7b1d-7c3e-9f00-000000000001");
        assert!(from_str.file_access().is_static());
        assert_eq!(from_str.branch(), None);
    }

    #[tokio::test]
    async fn test_malformed_identifier_makes_no_call() {
        let mut service = MockRemoteMetadataService::new();
        service.expect_get_table().never();
        let catalog = catalog(service);

        let err = catalog.get_table("sales.").await.unwrap_err();
        assert!(matches!(err, CatalogError::MalformedIdentifier(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_invalid_reported_path() {
        let mut service = MockRemoteMetadataService::new();
        service.expect_get_table().returning(|_| {
            let mut response = table_response();
            response.path = "relative/path".to_string();
            Ok(response)
        });
        let catalog = catalog(service);

        let err = catalog.get_table("sales.orders").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidLocation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_list_tables_of_missing_database() {
        let mut service = MockRemoteMetadataService::new();
        service
            .expect_list_tables()
            .returning(|_| Err(ErrorModel::not_found("nope", "NoSuchDatabase", None)));
        let catalog = catalog(service);

        let err = catalog.list_tables("missing").await.unwrap_err();
        assert!(matches!(err, CatalogError::DatabaseNotFound(_)), "{err:?}");
    }
}
