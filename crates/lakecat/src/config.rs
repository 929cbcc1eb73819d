use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::service::InvalidConfig;

/// Options key holding the absolute storage path of a table.
pub const PATH_OPTION_KEY: &str = "path";
/// Options key holding the branch a table was addressed through.
pub const BRANCH_OPTION_KEY: &str = "branch";
/// Database property holding the storage location of a database.
pub const DB_LOCATION_KEY: &str = "location";

const DEFAULT_TOKEN_REFRESH_MARGIN_MS: u64 = 60 * 60 * 1000;

#[cfg(not(test))]
const ENV_PREFIX: &str = "LAKECAT__";
#[cfg(test)]
const ENV_PREFIX: &str = "LAKECAT_TEST__";
const ENV_IGNORED_KEY: &str = "data_token_enabled";

/// Catalog-wide configuration, read once when a catalog is constructed.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Hand out token-scoped file access for loaded tables instead of
    /// relying on statically configured file access.
    pub data_token_enabled: bool,
    /// Endpoint of the metadata service. Informational for the core; transports use it.
    pub uri: Option<Url>,
    pub warehouse: Option<String>,
    /// A data token is refreshed once it expires within this many milliseconds.
    pub token_refresh_margin_ms: u64,
    /// Page size used by paged listings when the caller does not pass one.
    pub page_size_default: Option<u32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_token_enabled: false,
            uri: None,
            warehouse: None,
            token_refresh_margin_ms: DEFAULT_TOKEN_REFRESH_MARGIN_MS,
            page_size_default: None,
        }
    }
}

impl CatalogConfig {
    /// Extract the configuration from a catalog options map.
    ///
    /// Sources, later ones winning: compiled defaults, `options`, then environment
    /// variables prefixed with `LAKECAT__` (`__` separates nested keys).
    /// Option keys may be written in kebab-case or dotted form (`data-token.enabled`).
    ///
    /// `data_token_enabled` is only read from `options`; the environment cannot toggle it.
    /// A `LAKECAT__DATA_TOKEN_ENABLED` variable is ignored.
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, InvalidConfig> {
        let defaults = figment::providers::Serialized::defaults(CatalogConfig::default());
        let options = options
            .iter()
            .map(|(k, v)| (normalize_key(k), v.clone()))
            .collect::<BTreeMap<_, _>>();
        let env = figment::providers::Env::prefixed(ENV_PREFIX)
            .split("__")
            .ignore(&[ENV_IGNORED_KEY]);

        figment::Figment::from(defaults)
            .merge(figment::providers::Serialized::defaults(options))
            .merge(env)
            .extract_lossy::<CatalogConfig>()
            .map_err(|e| InvalidConfig::new(e.to_string()))
    }

    #[must_use]
    pub fn token_refresh_margin(&self) -> Duration {
        Duration::from_millis(self.token_refresh_margin_ms)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['-', '.'], "_")
}
