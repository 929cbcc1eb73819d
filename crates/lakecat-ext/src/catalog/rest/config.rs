use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

/// Server-side catalog configuration returned when a client connects.
///
/// `defaults` are applied below the client's own options, `overrides` above them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl ConfigResponse {
    /// Merge the client options with this configuration: `defaults`, then
    /// `client_options`, then `overrides`, later sources winning.
    #[must_use]
    pub fn merge(&self, client_options: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut merged = self.defaults.clone();
        merged.extend(client_options.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(self.overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

#[cfg(test)]
mod tests {
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_merge_precedence() {
        let config = ConfigResponse {
            defaults: btreemap! {
                "data-token-enabled".to_string() => "false".to_string(),
                "page-size-default".to_string() => "100".to_string(),
            },
            overrides: btreemap! {
                "warehouse".to_string() => "prod".to_string(),
            },
        };
        let client = btreemap! {
            "data-token-enabled".to_string() => "true".to_string(),
            "warehouse".to_string() => "dev".to_string(),
        };

        assert_eq!(
            config.merge(&client),
            btreemap! {
                "data-token-enabled".to_string() => "true".to_string(),
                "page-size-default".to_string() => "100".to_string(),
                "warehouse".to_string() => "prod".to_string(),
            }
        );
    }
}
