use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

pub const AUDIT_OWNER: &str = "owner";
pub const AUDIT_CREATED_AT: &str = "createdAt";
pub const AUDIT_CREATED_BY: &str = "createdBy";
pub const AUDIT_UPDATED_AT: &str = "updatedAt";
pub const AUDIT_UPDATED_BY: &str = "updatedBy";

/// Provenance fields the metadata service attaches to database and table responses.
///
/// All fields are optional. A missing field contributes nothing when the fields
/// are written into an options map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub owner: Option<String>,
    /// Milliseconds since the unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub created_by: Option<String>,
    /// Milliseconds since the unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub updated_by: Option<String>,
    /// Free-form provenance pairs beyond the well-known fields.
    #[serde(
        default,
        rename = "auditOptions",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    #[builder(default)]
    pub extra: BTreeMap<String, String>,
}

impl AuditFields {
    /// All provenance pairs carried by this response.
    ///
    /// Well-known fields are emitted after `extra`, so they win on a key collision.
    #[must_use]
    pub fn audit_options(&self) -> Vec<(String, String)> {
        let known = [
            (AUDIT_OWNER, self.owner.clone()),
            (AUDIT_CREATED_AT, self.created_at.map(|v| v.to_string())),
            (AUDIT_CREATED_BY, self.created_by.clone()),
            (AUDIT_UPDATED_AT, self.updated_at.map(|v| v.to_string())),
            (AUDIT_UPDATED_BY, self.updated_by.clone()),
        ];

        self.extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(
                known
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k.to_string(), v))),
            )
            .collect()
    }

    /// Write every present provenance pair into `options`, overwriting colliding keys.
    pub fn put_audit_options_to(&self, options: &mut BTreeMap<String, String>) {
        options.extend(self.audit_options());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.created_at.is_none()
            && self.created_by.is_none()
            && self.updated_at.is_none()
            && self.updated_by.is_none()
            && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_missing_fields_inject_nothing() {
        let audit = AuditFields::default();
        assert!(audit.is_empty());

        let mut options = btreemap! {"a".to_string() => "1".to_string()};
        audit.put_audit_options_to(&mut options);
        assert_eq!(options, btreemap! {"a".to_string() => "1".to_string()});
    }

    #[test]
    fn test_audit_overwrites_colliding_keys() {
        let audit = AuditFields::builder()
            .owner("alice")
            .created_at(1_700_000_000_000)
            .updated_by("bob")
            .build();

        let mut options = btreemap! {
            "owner".to_string() => "declared".to_string(),
            "bucket".to_string() => "4".to_string(),
        };
        audit.put_audit_options_to(&mut options);

        assert_eq!(
            options,
            btreemap! {
                "owner".to_string() => "alice".to_string(),
                "bucket".to_string() => "4".to_string(),
                "createdAt".to_string() => "1700000000000".to_string(),
                "updatedBy".to_string() => "bob".to_string(),
            }
        );
    }

    #[test]
    fn test_known_fields_win_over_extra() {
        let audit = AuditFields::builder()
            .owner("alice")
            .extra(btreemap! {
                "owner".to_string() => "mallory".to_string(),
                "job".to_string() => "nightly".to_string(),
            })
            .build();

        let mut options = BTreeMap::new();
        audit.put_audit_options_to(&mut options);
        assert_eq!(options.get("owner").map(String::as_str), Some("alice"));
        assert_eq!(options.get("job").map(String::as_str), Some("nightly"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let audit: AuditFields = serde_json::from_value(serde_json::json!({
            "owner": "alice",
            "createdAt": 1,
            "updatedBy": "bob",
            "auditOptions": {"job": "nightly"}
        }))
        .unwrap();
        assert_eq!(audit.owner.as_deref(), Some("alice"));
        assert_eq!(audit.created_at, Some(1));
        assert_eq!(audit.updated_by.as_deref(), Some("bob"));
        assert_eq!(audit.extra.get("job").map(String::as_str), Some("nightly"));
    }
}
