use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use lakecat_ext::catalog::rest::{ErrorModel, GetTableTokenResponse};
use tokio::sync::{Mutex, RwLock};
use veil::Redact;

use crate::service::{
    CredentialError, Identifier, Location, RemoteMetadataService, TokenExpiredOnArrival,
};

/// Lifecycle of the credential held by a [`TokenFileAccessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TokenState {
    /// No credential was requested yet.
    Unfetched,
    Valid,
    /// A credential is held but expires within the refresh margin.
    Expired,
    /// A fetch is in flight. Readers still observe the previous credential, if any.
    Refreshing,
}

/// A data token as handed out to file readers and writers.
#[derive(Redact, Clone, PartialEq, Eq)]
pub struct DataToken {
    #[redact]
    token: BTreeMap<String, String>,
    expires_at: DateTime<Utc>,
}

impl DataToken {
    #[must_use]
    pub fn new(token: BTreeMap<String, String>, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    #[must_use]
    pub fn token(&self) -> &BTreeMap<String, String> {
        &self.token
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `true` once `now + margin` reaches the expiry.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let margin = chrono::Duration::from_std(margin).unwrap_or(chrono::Duration::MAX);
        now.checked_add_signed(margin)
            .is_none_or(|deadline| deadline >= self.expires_at)
    }
}

/// File access scoped to a single table through short-lived data tokens.
///
/// The token is fetched on first use and refreshed once it expires within the
/// configured margin. Only one refresh runs at a time; concurrent readers
/// observe either the previous or the new token, never a mix.
pub struct TokenFileAccessor<S> {
    identifier: Identifier,
    path: Location,
    service: Arc<S>,
    catalog_options: Arc<BTreeMap<String, String>>,
    refresh_margin: Duration,
    current: RwLock<Option<Arc<DataToken>>>,
    refresh: Mutex<()>,
}

impl<S> std::fmt::Debug for TokenFileAccessor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFileAccessor")
            .field("identifier", &self.identifier)
            .field("path", &self.path)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteMetadataService> TokenFileAccessor<S> {
    pub(crate) fn new(
        identifier: Identifier,
        path: Location,
        service: Arc<S>,
        catalog_options: Arc<BTreeMap<String, String>>,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            identifier,
            path,
            service,
            catalog_options,
            refresh_margin,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    #[must_use]
    pub fn path(&self) -> &Location {
        &self.path
    }

    pub async fn state(&self) -> TokenState {
        if self.refresh.try_lock().is_err() {
            return TokenState::Refreshing;
        }
        match self.current.read().await.as_ref() {
            None => TokenState::Unfetched,
            Some(token) if token.expires_within(Utc::now(), self.refresh_margin) => {
                TokenState::Expired
            }
            Some(_) => TokenState::Valid,
        }
    }

    /// The current data token, fetching or refreshing it if required.
    ///
    /// A token whose lifetime is shorter than the refresh margin is handed out
    /// once and refetched on every following call. Such tokens are logged at
    /// debug level when they arrive.
    pub async fn credential(&self) -> Result<Arc<DataToken>, CredentialError> {
        if let Some(token) = self.valid_token().await {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we were waiting for the lock.
        if let Some(token) = self.valid_token().await {
            return Ok(token);
        }

        let token = Arc::new(self.fetch().await?);
        *self.current.write().await = Some(token.clone());
        Ok(token)
    }

    /// Catalog options overlaid with the current data token. Token entries win.
    pub async fn file_options(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let token = self.credential().await?;
        let mut options = (*self.catalog_options).clone();
        options.extend(token.token().iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(options)
    }

    async fn valid_token(&self) -> Option<Arc<DataToken>> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|token| !token.expires_within(Utc::now(), self.refresh_margin))
            .cloned()
    }

    async fn fetch(&self) -> Result<DataToken, CredentialError> {
        let GetTableTokenResponse {
            token,
            expires_at_millis,
        } = self
            .service
            .load_table_token(&self.identifier)
            .await
            .map_err(|e| CredentialError::new(self.identifier.clone(), e))?;

        let expires_at = DateTime::<Utc>::from_timestamp_millis(expires_at_millis)
            .filter(|expires_at| *expires_at > Utc::now())
            .ok_or_else(|| {
                CredentialError::new(
                    self.identifier.clone(),
                    ErrorModel::from(
                        TokenExpiredOnArrival::new()
                            .append_detail(format!("expiresAtMillis: {expires_at_millis}")),
                    ),
                )
            })?;

        tracing::debug!(
            identifier = %self.identifier,
            path = %self.path,
            %expires_at,
            "Refreshed data token"
        );

        let token = DataToken::new(token, expires_at);
        if token.expires_within(Utc::now(), self.refresh_margin) {
            tracing::debug!(
                identifier = %self.identifier,
                %expires_at,
                refresh_margin_ms = self.refresh_margin.as_millis(),
                "Data token expires within the refresh margin, it will be refetched on next use"
            );
        }
        Ok(token)
    }
}
