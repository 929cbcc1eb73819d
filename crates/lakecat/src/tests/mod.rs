use std::{collections::BTreeMap, sync::Arc};

use lakecat_ext::catalog::rest::AuditFields;
use maplit::btreemap;

use crate::{
    catalog::Catalog,
    config::CatalogConfig,
    implementations::InMemoryMetadataService,
    service::{DataField, RemoteMetadataService, Schema},
};

mod load_table;

pub(crate) fn orders_schema() -> Schema {
    Schema::builder()
        .fields(vec![
            DataField::builder().id(0).name("id").data_type("BIGINT NOT NULL").build(),
            DataField::builder().id(1).name("amount").data_type("DECIMAL(10, 2)").build(),
        ])
        .primary_keys(vec!["id".to_string()])
        .options(btreemap! {
            "bucket".to_string() => "4".to_string(),
            "owner".to_string() => "declared-owner".to_string(),
        })
        .comment("orders")
        .build()
}

/// A service with database `sales` holding table `orders` (plus branch `audit`).
pub(crate) async fn sales_service(service: InMemoryMetadataService) -> Arc<InMemoryMetadataService> {
    service
        .create_database("sales", BTreeMap::new())
        .await
        .unwrap();
    service
        .put_table(
            "sales",
            "orders",
            orders_schema(),
            AuditFields::builder()
                .owner("alice")
                .created_by("etl")
                .created_at(1_700_000_000_000)
                .build(),
        )
        .unwrap();
    service.put_branch("sales", "orders", "audit").unwrap();
    Arc::new(service)
}

pub(crate) fn catalog(
    service: Arc<InMemoryMetadataService>,
    data_token_enabled: bool,
) -> Catalog<InMemoryMetadataService> {
    Catalog::new(
        service,
        CatalogConfig {
            data_token_enabled,
            ..CatalogConfig::default()
        },
        btreemap! {
            "fs.memory.endpoint".to_string() => "memory://local".to_string(),
        },
    )
}
