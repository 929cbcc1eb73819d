use maplit::btreemap;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

use super::{catalog, sales_service};
use crate::{
    config::{BRANCH_OPTION_KEY, PATH_OPTION_KEY},
    implementations::InMemoryMetadataService,
    service::{CatalogError, Identifier},
};

#[tokio::test]
#[traced_test]
async fn test_resolved_options_overlay() {
    let service = sales_service(InMemoryMetadataService::new()).await;
    let catalog = catalog(service, false);

    let table = catalog.get_table("sales.orders").await.unwrap();

    assert_eq!(
        table.options(),
        &btreemap! {
            "bucket".to_string() => "4".to_string(),
            "createdAt".to_string() => "1700000000000".to_string(),
            "createdBy".to_string() => "etl".to_string(),
            "owner".to_string() => "alice".to_string(),
            "path".to_string() => "memory://warehouse/sales.db/orders".to_string(),
        }
    );
    assert_eq!(table.location().as_str(), "memory://warehouse/sales.db/orders");
    assert_eq!(table.metadata().schema().primary_keys().to_vec(), vec!["id".to_string()]);
    assert_eq!(table.metadata().schema().fields().len(), 2);
    assert_eq!(table.metadata().path(), Some("memory://warehouse/sales.db/orders"));
    assert!(!table.is_external());
    assert!(logs_contain("Resolved table"));
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let service = sales_service(InMemoryMetadataService::new()).await;
    let catalog = catalog(service, false);

    let first = catalog.get_table("sales.orders.audit").await.unwrap();
    let second = catalog.get_table("sales.orders.audit").await.unwrap();

    assert_eq!(first.metadata(), second.metadata());
    assert_eq!(first.options(), second.options());
    assert_eq!(first.uuid(), second.uuid());
}

#[tokio::test]
async fn test_audit_wins_over_declared_option() {
    let service = sales_service(InMemoryMetadataService::new()).await;
    let catalog = catalog(service, false);

    let table = catalog.get_table("sales.orders").await.unwrap();
    let resolved = table.metadata().schema();

    // The declared schema is left untouched.
    assert_eq!(resolved.options().get("owner").map(String::as_str), Some("alice"));
    assert_eq!(
        super::orders_schema().options().get("owner").map(String::as_str),
        Some("declared-owner")
    );
}

#[tokio::test]
async fn test_branch_injection() {
    let service = sales_service(InMemoryMetadataService::new()).await;
    let catalog = catalog(service, false);

    let branch = catalog.get_table("sales.orders.audit").await.unwrap();
    assert_eq!(
        branch.options().get(BRANCH_OPTION_KEY).map(String::as_str),
        Some("audit")
    );
    assert_eq!(branch.branch(), Some("audit"));
    assert_eq!(branch.metadata().branch(), Some("audit"));

    let main = catalog.get_table("sales.orders").await.unwrap();
    assert!(!main.options().contains_key(BRANCH_OPTION_KEY));
    assert_eq!(
        main.options().get(PATH_OPTION_KEY),
        branch.options().get(PATH_OPTION_KEY)
    );
}

#[tokio::test]
async fn test_missing_table_and_branch() {
    let service = sales_service(InMemoryMetadataService::new()).await;
    let catalog = catalog(service, false);

    for ident in ["missing.table", "sales.missing", "sales.orders.nobranch"] {
        let err = catalog.get_table(ident).await.unwrap_err();
        assert!(err.is_not_found(), "{ident}: {err:?}");
        let CatalogError::TableNotFound(inner) = err else {
            panic!("unexpected error for {ident}");
        };
        assert_eq!(inner.identifier, ident.parse::<Identifier>().unwrap());
    }
}

#[tokio::test]
async fn test_resolver_can_be_used_directly() {
    let service = sales_service(InMemoryMetadataService::new()).await;
    let catalog = catalog(service, false);
    let ident = Identifier::with_branch("sales", "orders", "audit").unwrap();

    let table = catalog.resolver().load_table(&ident).await.unwrap();
    assert_eq!(table.identifier(), &ident);
    assert!(table.file_access().is_static());
}
