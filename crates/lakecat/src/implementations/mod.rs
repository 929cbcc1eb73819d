//! Implementations of [`RemoteMetadataService`](crate::service::RemoteMetadataService).

mod memory;

pub use memory::InMemoryMetadataService;
