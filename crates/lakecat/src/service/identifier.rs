use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use super::MalformedIdentifier;

const SEPARATOR: char = '.';

/// Fully qualified reference to a table: `database.table[.branch]`.
///
/// Serialized as its string form, so parsing and formatting round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Identifier {
    database: String,
    table: String,
    branch: Option<String>,
}

impl Identifier {
    /// Identifier of the main branch of `database.table`.
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, MalformedIdentifier> {
        Self::build(database.into(), table.into(), None)
    }

    /// Identifier of a named branch of `database.table`.
    pub fn with_branch(
        database: impl Into<String>,
        table: impl Into<String>,
        branch: impl Into<String>,
    ) -> Result<Self, MalformedIdentifier> {
        Self::build(database.into(), table.into(), Some(branch.into()))
    }

    fn build(
        database: String,
        table: String,
        branch: Option<String>,
    ) -> Result<Self, MalformedIdentifier> {
        let segments = std::iter::once(&database)
            .chain(std::iter::once(&table))
            .chain(branch.as_ref());
        for segment in segments {
            if segment.is_empty() {
                return Err(MalformedIdentifier::new(
                    format_parts(&database, &table, branch.as_deref()),
                    "empty name segment",
                ));
            }
            if segment.contains(SEPARATOR) {
                return Err(MalformedIdentifier::new(
                    format_parts(&database, &table, branch.as_deref()),
                    "name segments must not contain '.'",
                ));
            }
        }

        Ok(Self {
            database,
            table,
            branch,
        })
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

fn format_parts(database: &str, table: &str, branch: Option<&str>) -> String {
    match branch {
        Some(branch) => format!("{database}{SEPARATOR}{table}{SEPARATOR}{branch}"),
        None => format!("{database}{SEPARATOR}{table}"),
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_parts(
            &self.database,
            &self.table,
            self.branch.as_deref(),
        ))
    }
}

impl FromStr for Identifier {
    type Err = MalformedIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(SEPARATOR).collect::<Vec<_>>();
        match parts.as_slice() {
            [database, table] => Self::new(*database, *table),
            [database, table, branch] => Self::with_branch(*database, *table, *branch),
            _ => Err(MalformedIdentifier::new(
                s,
                "expected `database.table` or `database.table.branch`",
            )),
        }
    }
}

impl TryFrom<&str> for Identifier {
    type Error = MalformedIdentifier;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Identifier {
    type Error = MalformedIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&String> for Identifier {
    type Error = MalformedIdentifier;

    fn try_from(value: &String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<&Identifier> for Identifier {
    fn from(value: &Identifier) -> Self {
        value.clone()
    }
}
