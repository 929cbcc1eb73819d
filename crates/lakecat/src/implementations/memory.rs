use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        PoisonError, RwLock,
    },
};

use itertools::Itertools;
use lakecat_ext::catalog::rest::{
    AuditFields, ConfigResponse, ErrorModel, GetDatabaseResponse, GetTableResponse,
    GetTableTokenResponse, PagedList,
};
use uuid::Uuid;

use crate::{
    config::DB_LOCATION_KEY,
    service::{Identifier, RemoteMetadataService, RemoteResult, Schema},
};

const DEFAULT_WAREHOUSE_ROOT: &str = "memory://warehouse";

#[derive(Debug, Clone)]
struct StoredTable {
    id: Uuid,
    is_external: bool,
    schema: Schema,
    audit: AuditFields,
    branches: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct StoredDatabase {
    id: Uuid,
    location: String,
    options: BTreeMap<String, String>,
    audit: AuditFields,
    tables: BTreeMap<String, StoredTable>,
}

/// [`RemoteMetadataService`] keeping all state in process memory.
///
/// Listings are ordered by name. The page token of a paged listing is the last
/// name of the previous page. Name patterns support `%` as a wildcard.
#[derive(Debug)]
pub struct InMemoryMetadataService {
    databases: RwLock<BTreeMap<String, StoredDatabase>>,
    config: ConfigResponse,
    warehouse_root: String,
    token_lifetime: chrono::Duration,
    token_fetches: AtomicUsize,
}

impl Default for InMemoryMetadataService {
    fn default() -> Self {
        Self {
            databases: RwLock::new(BTreeMap::new()),
            config: ConfigResponse::default(),
            warehouse_root: DEFAULT_WAREHOUSE_ROOT.to_string(),
            token_lifetime: chrono::Duration::hours(2),
            token_fetches: AtomicUsize::new(0),
        }
    }
}

impl InMemoryMetadataService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration returned by [`RemoteMetadataService::get_config`].
    #[must_use]
    pub fn with_config(mut self, config: ConfigResponse) -> Self {
        self.config = config;
        self
    }

    /// Lifetime of every data token handed out from now on.
    #[must_use]
    pub fn with_token_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_warehouse_root(mut self, root: impl Into<String>) -> Self {
        self.warehouse_root = root.into().trim_end_matches('/').to_string();
        self
    }

    /// Number of data tokens issued so far.
    #[must_use]
    pub fn token_fetches(&self) -> usize {
        self.token_fetches.load(Ordering::SeqCst)
    }

    /// Replace the audit fields reported for a database.
    ///
    /// # Errors
    /// Fails with `404` if the database does not exist.
    pub fn set_database_audit(&self, database: &str, audit: AuditFields) -> RemoteResult<()> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let db = databases
            .get_mut(database)
            .ok_or_else(|| no_such_database(database))?;
        db.audit = audit;
        Ok(())
    }

    /// Create or replace a table. Returns the id of the table.
    ///
    /// # Errors
    /// Fails with `404` if the database does not exist.
    pub fn put_table(
        &self,
        database: &str,
        table: &str,
        schema: Schema,
        audit: AuditFields,
    ) -> RemoteResult<Uuid> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let db = databases
            .get_mut(database)
            .ok_or_else(|| no_such_database(database))?;

        let id = db.tables.get(table).map_or_else(Uuid::now_v7, |t| t.id);
        let branches = db
            .tables
            .get(table)
            .map(|t| t.branches.clone())
            .unwrap_or_default();
        db.tables.insert(
            table.to_string(),
            StoredTable {
                id,
                is_external: false,
                schema,
                audit,
                branches,
            },
        );
        Ok(id)
    }

    /// Register a branch of an existing table.
    ///
    /// # Errors
    /// Fails with `404` if the database or table does not exist.
    pub fn put_branch(&self, database: &str, table: &str, branch: &str) -> RemoteResult<()> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let stored = databases
            .get_mut(database)
            .and_then(|db| db.tables.get_mut(table))
            .ok_or_else(|| no_such_table(&format!("{database}.{table}")))?;
        stored.branches.insert(branch.to_string());
        Ok(())
    }

    fn with_table<T>(
        &self,
        identifier: &Identifier,
        f: impl FnOnce(&StoredDatabase, &StoredTable) -> T,
    ) -> RemoteResult<T> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        let db = databases
            .get(identifier.database())
            .ok_or_else(|| no_such_table(&identifier.to_string()))?;
        let table = db
            .tables
            .get(identifier.table())
            .filter(|t| identifier.branch().is_none_or(|b| t.branches.contains(b)))
            .ok_or_else(|| no_such_table(&identifier.to_string()))?;
        Ok(f(db, table))
    }
}

#[async_trait::async_trait]
impl RemoteMetadataService for InMemoryMetadataService {
    async fn get_config(&self) -> RemoteResult<ConfigResponse> {
        Ok(self.config.clone())
    }

    async fn list_databases(&self) -> RemoteResult<Vec<String>> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        Ok(databases.keys().cloned().collect())
    }

    async fn list_databases_paged(
        &self,
        max_results: Option<u32>,
        page_token: Option<String>,
        database_name_pattern: Option<String>,
    ) -> RemoteResult<PagedList<String>> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        Ok(paginate(
            databases.keys(),
            max_results,
            page_token.as_deref(),
            database_name_pattern.as_deref(),
        ))
    }

    async fn create_database(
        &self,
        name: &str,
        properties: BTreeMap<String, String>,
    ) -> RemoteResult<()> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        if databases.contains_key(name) {
            return Err(ErrorModel::conflict(
                format!("Database {name} already exists"),
                "AlreadyExists",
                None,
            ));
        }

        let location = properties
            .get(DB_LOCATION_KEY)
            .cloned()
            .unwrap_or_else(|| format!("{}/{name}.db", self.warehouse_root));
        let options = properties
            .into_iter()
            .filter(|(k, _)| k != DB_LOCATION_KEY)
            .collect();
        databases.insert(
            name.to_string(),
            StoredDatabase {
                id: Uuid::now_v7(),
                location,
                options,
                audit: AuditFields::default(),
                tables: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn get_database(&self, name: &str) -> RemoteResult<GetDatabaseResponse> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        let db = databases.get(name).ok_or_else(|| no_such_database(name))?;
        Ok(GetDatabaseResponse::builder()
            .id(db.id.to_string())
            .name(name)
            .location(db.location.clone())
            .options(db.options.clone())
            .audit(db.audit.clone())
            .build())
    }

    async fn drop_database(&self, name: &str) -> RemoteResult<()> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        databases
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| no_such_database(name))
    }

    async fn alter_database(
        &self,
        name: &str,
        remove_keys: Vec<String>,
        set_properties: BTreeMap<String, String>,
    ) -> RemoteResult<()> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        let db = databases.get_mut(name).ok_or_else(|| no_such_database(name))?;
        for key in &remove_keys {
            db.options.remove(key);
        }
        db.options.extend(set_properties);
        Ok(())
    }

    async fn list_tables(&self, database: &str) -> RemoteResult<Vec<String>> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        let db = databases
            .get(database)
            .ok_or_else(|| no_such_database(database))?;
        Ok(db.tables.keys().cloned().collect())
    }

    async fn list_tables_paged(
        &self,
        database: &str,
        max_results: Option<u32>,
        page_token: Option<String>,
        table_name_pattern: Option<String>,
    ) -> RemoteResult<PagedList<String>> {
        let databases = self.databases.read().unwrap_or_else(PoisonError::into_inner);
        let db = databases
            .get(database)
            .ok_or_else(|| no_such_database(database))?;
        Ok(paginate(
            db.tables.keys(),
            max_results,
            page_token.as_deref(),
            table_name_pattern.as_deref(),
        ))
    }

    async fn get_table(&self, identifier: &Identifier) -> RemoteResult<GetTableResponse> {
        self.with_table(identifier, |db, table| {
            GetTableResponse::builder()
                .id(table.id.to_string())
                .name(identifier.table())
                .path(format!("{}/{}", db.location, identifier.table()))
                .is_external(table.is_external)
                .schema(table.schema.clone())
                .audit(table.audit.clone())
                .build()
        })
    }

    async fn load_table_token(
        &self,
        identifier: &Identifier,
    ) -> RemoteResult<GetTableTokenResponse> {
        let table_id = self.with_table(identifier, |_, table| table.id)?;
        let serial = self.token_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let expires_at = chrono::Utc::now() + self.token_lifetime;

        Ok(GetTableTokenResponse {
            token: BTreeMap::from([
                ("fs.memory.token".to_string(), format!("{table_id}-{serial}")),
                (
                    "fs.memory.expiration".to_string(),
                    expires_at.timestamp_millis().to_string(),
                ),
            ]),
            expires_at_millis: expires_at.timestamp_millis(),
        })
    }
}

fn no_such_database(name: &str) -> ErrorModel {
    ErrorModel::not_found(
        format!("Database {name} does not exist"),
        "NoSuchDatabase",
        None,
    )
}

fn no_such_table(name: &str) -> ErrorModel {
    ErrorModel::not_found(format!("Table {name} does not exist"), "NoSuchTable", None)
}

fn paginate<'a>(
    names: impl Iterator<Item = &'a String>,
    max_results: Option<u32>,
    page_token: Option<&str>,
    pattern: Option<&str>,
) -> PagedList<String> {
    let mut page = names
        .filter(|name| pattern.is_none_or(|p| matches_pattern(name, p)))
        .filter(|name| page_token.is_none_or(|token| name.as_str() > token))
        .cloned()
        .collect_vec();

    let limit = max_results.map_or(usize::MAX, |m| usize::try_from(m).unwrap_or(usize::MAX));
    if page.len() <= limit || limit == 0 {
        return PagedList::new(page, None);
    }
    page.truncate(limit);
    let next_page_token = page.last().cloned();
    PagedList::new(page, next_page_token)
}

/// `%` matches any sequence of characters, everything else matches itself.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    let parts = pattern.split('%').collect_vec();
    let [first, middle @ .., last] = parts.as_slice() else {
        return name == pattern;
    };

    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };
    for part in middle {
        match remaining.find(part) {
            Some(i) => remaining = &remaining[i + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}
