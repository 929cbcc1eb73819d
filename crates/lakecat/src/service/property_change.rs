use std::collections::{BTreeMap, BTreeSet};

/// A single change to a database's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyChange {
    Set { key: String, value: String },
    Remove { key: String },
}

impl PropertyChange {
    #[must_use]
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        PropertyChange::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        PropertyChange::Remove { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            PropertyChange::Set { key, .. } | PropertyChange::Remove { key } => key,
        }
    }
}

/// Reduced form of a batch of [`PropertyChange`]s.
///
/// `set` and `remove` never share a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyChanges {
    pub set: BTreeMap<String, String>,
    pub remove: BTreeSet<String>,
}

impl PropertyChanges {
    /// Fold `changes` left to right. The last change to a key wins, whatever its variant.
    #[must_use]
    pub fn reduce<'a>(changes: impl IntoIterator<Item = &'a PropertyChange>) -> Self {
        changes
            .into_iter()
            .fold(Self::default(), |mut acc, change| {
                match change {
                    PropertyChange::Set { key, value } => {
                        acc.remove.remove(key);
                        acc.set.insert(key.clone(), value.clone());
                    }
                    PropertyChange::Remove { key } => {
                        acc.set.remove(key);
                        acc.remove.insert(key.clone());
                    }
                }
                acc
            })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<String, String>, BTreeSet<String>) {
        (self.set, self.remove)
    }
}

impl<'a> FromIterator<&'a PropertyChange> for PropertyChanges {
    fn from_iter<T: IntoIterator<Item = &'a PropertyChange>>(iter: T) -> Self {
        Self::reduce(iter)
    }
}
