#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod service;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod implementations;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogResolver, Table};
pub use config::CatalogConfig;
pub use lakecat_ext;
pub use service::{CatalogError, Identifier, PropertyChange};
pub use tokio;
pub use tracing;
