use std::{fmt::Display, str::FromStr};

use super::InvalidLocation;

/// Absolute storage path of a table or database, kept verbatim as the service reported it.
///
/// Locations with a scheme (`s3://`, `oss://`, `file://`, ...) must be valid URLs.
/// Scheme-less locations must be absolute paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl FromStr for Location {
    type Err = InvalidLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(InvalidLocation::new(s, "location is empty"));
        }
        if s.trim() != s {
            return Err(InvalidLocation::new(
                s,
                "location has leading or trailing whitespace",
            ));
        }

        if s.contains("://") {
            url::Url::parse(s).map_err(|e| {
                InvalidLocation::new(s, "location is not a valid URL").append_detail(e.to_string())
            })?;
        } else if !s.starts_with('/') {
            return Err(InvalidLocation::new(
                s,
                "location without scheme must be an absolute path",
            ));
        }

        Ok(Self(s.to_string()))
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
