mod error;
pub mod file_access;
mod identifier;
mod location;
mod metadata;
mod property_change;
mod remote;

pub use error::*;
pub use file_access::{FileAccess, FileAccessResolver, TokenFileAccessor, TokenState};
pub use identifier::Identifier;
pub use location::Location;
pub use metadata::{DataField, Database, Schema, TableMetadata};
pub use property_change::{PropertyChange, PropertyChanges};
#[cfg(test)]
pub use remote::MockRemoteMetadataService;
pub use remote::{RemoteMetadataService, RemoteResult};
