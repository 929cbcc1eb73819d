mod token;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

pub use token::{DataToken, TokenFileAccessor, TokenState};

use super::{Identifier, Location, RemoteMetadataService};

/// How files of a loaded table are accessed.
pub enum FileAccess<S> {
    /// Fall back to the statically configured file access of the embedding application.
    Static,
    /// Short-lived, table-scoped data tokens fetched from the metadata service.
    Token(Arc<TokenFileAccessor<S>>),
}

impl<S> std::fmt::Debug for FileAccess<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileAccess::Static => f.write_str("Static"),
            FileAccess::Token(accessor) => f.debug_tuple("Token").field(accessor).finish(),
        }
    }
}

impl<S> Clone for FileAccess<S> {
    fn clone(&self) -> Self {
        match self {
            FileAccess::Static => FileAccess::Static,
            FileAccess::Token(accessor) => FileAccess::Token(accessor.clone()),
        }
    }
}

impl<S> FileAccess<S> {
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, FileAccess::Static)
    }

    #[must_use]
    pub fn token_accessor(&self) -> Option<&Arc<TokenFileAccessor<S>>> {
        match self {
            FileAccess::Static => None,
            FileAccess::Token(accessor) => Some(accessor),
        }
    }
}

/// Chooses the file access strategy of every table load.
///
/// The decision depends only on `data_token_enabled`, which is fixed at construction.
pub struct FileAccessResolver<S> {
    data_token_enabled: bool,
    refresh_margin: Duration,
    options: Arc<BTreeMap<String, String>>,
    service: Arc<S>,
}

impl<S> std::fmt::Debug for FileAccessResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAccessResolver")
            .field("data_token_enabled", &self.data_token_enabled)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteMetadataService> FileAccessResolver<S> {
    pub fn new(
        data_token_enabled: bool,
        refresh_margin: Duration,
        options: Arc<BTreeMap<String, String>>,
        service: Arc<S>,
    ) -> Self {
        Self {
            data_token_enabled,
            refresh_margin,
            options,
            service,
        }
    }

    #[must_use]
    pub fn data_token_enabled(&self) -> bool {
        self.data_token_enabled
    }

    /// Bind file access for `identifier` stored at `path`. Performs no network call.
    #[must_use]
    pub fn resolve(&self, identifier: &Identifier, path: &Location) -> FileAccess<S> {
        if !self.data_token_enabled {
            return FileAccess::Static;
        }

        FileAccess::Token(Arc::new(TokenFileAccessor::new(
            identifier.clone(),
            path.clone(),
            self.service.clone(),
            self.options.clone(),
            self.refresh_margin,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use lakecat_ext::catalog::rest::{ErrorModel, GetTableTokenResponse};
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::service::{CatalogError, MockRemoteMetadataService};

    fn location() -> Location {
        "s3://bucket/db.db/t".parse().unwrap()
    }

    fn token_response(lifetime: chrono::Duration) -> GetTableTokenResponse {
        GetTableTokenResponse {
            token: btreemap! {
                "fs.s3.accessKeyId".to_string() => "key".to_string(),
                "fs.s3.secretAccessKey".to_string() => "secret".to_string(),
            },
            expires_at_millis: (Utc::now() + lifetime).timestamp_millis(),
        }
    }

    fn resolver(
        enabled: bool,
        margin: Duration,
        service: MockRemoteMetadataService,
    ) -> FileAccessResolver<MockRemoteMetadataService> {
        FileAccessResolver::new(
            enabled,
            margin,
            Arc::new(btreemap! {
                "fs.s3.endpoint".to_string() => "http://minio:9000".to_string(),
                "fs.s3.accessKeyId".to_string() => "static-key".to_string(),
            }),
            Arc::new(service),
        )
    }

    #[test]
    fn test_disabled_always_static() {
        let resolver = resolver(false, Duration::ZERO, MockRemoteMetadataService::new());
        for id in ["db.t", "db.t.b1", "other.x"] {
            let id: Identifier = id.parse().unwrap();
            assert!(resolver.resolve(&id, &location()).is_static());
        }
    }

    #[tokio::test]
    async fn test_enabled_is_lazy_and_caches_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut service = MockRemoteMetadataService::new();
        let counter = calls.clone();
        service.expect_load_table_token().returning(move |id| {
            assert_eq!(id.to_string(), "db.t.b1");
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(token_response(chrono::Duration::hours(2)))
        });
        let resolver = resolver(true, Duration::from_secs(60), service);

        let id: Identifier = "db.t.b1".parse().unwrap();
        let access = resolver.resolve(&id, &location());
        let accessor = access.token_accessor().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(accessor.state().await, TokenState::Unfetched);
        assert_eq!(accessor.identifier(), &id);
        assert_eq!(accessor.path(), &location());

        let options = accessor.file_options().await.unwrap();
        accessor.credential().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(accessor.state().await, TokenState::Valid);
        assert_eq!(
            options,
            btreemap! {
                "fs.s3.endpoint".to_string() => "http://minio:9000".to_string(),
                "fs.s3.accessKeyId".to_string() => "key".to_string(),
                "fs.s3.secretAccessKey".to_string() => "secret".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_refreshes_within_margin() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut service = MockRemoteMetadataService::new();
        let counter = calls.clone();
        service.expect_load_table_token().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(token_response(chrono::Duration::minutes(5)))
        });
        let resolver = resolver(true, Duration::from_secs(600), service);
        let id: Identifier = "db.t".parse().unwrap();
        let access = resolver.resolve(&id, &location());
        let accessor = access.token_accessor().unwrap();

        accessor.credential().await.unwrap();
        assert_eq!(accessor.state().await, TokenState::Expired);
        accessor.credential().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_token_fetch_failure_is_credential_error() {
        let mut service = MockRemoteMetadataService::new();
        service.expect_load_table_token().returning(|_| {
            Err(ErrorModel::forbidden(
                "no data token",
                "NotAuthorized",
                None,
            ))
        });
        let resolver = resolver(true, Duration::ZERO, service);
        let id: Identifier = "db.t".parse().unwrap();
        let access = resolver.resolve(&id, &location());

        let err = access
            .token_accessor()
            .unwrap()
            .credential()
            .await
            .unwrap_err();
        assert_eq!(err.identifier, id);
        assert_eq!(err.source.code, 403);
        assert!(matches!(
            CatalogError::from(err),
            CatalogError::Credential(_)
        ));
    }

    #[tokio::test]
    async fn test_already_expired_token_is_rejected() {
        let mut service = MockRemoteMetadataService::new();
        service
            .expect_load_table_token()
            .returning(|_| Ok(token_response(chrono::Duration::seconds(-10))));
        let resolver = resolver(true, Duration::ZERO, service);
        let id: Identifier = "db.t".parse().unwrap();
        let access = resolver.resolve(&id, &location());
        let accessor = access.token_accessor().unwrap();

        let err = accessor.credential().await.unwrap_err();
        assert_eq!(err.source.r#type, "TokenExpiredOnArrival");
        assert_eq!(accessor.state().await, TokenState::Unfetched);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let token = DataToken::new(
            btreemap! {"password".to_string() => "hunter2".to_string()},
            Utc::now(),
        );
        assert!(!format!("{token:?}").contains("hunter2"));
    }
}
