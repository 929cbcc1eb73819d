mod audit;
mod config;
mod database;
mod error;
mod pagination;
mod table;

pub use audit::*;
pub use config::*;
pub use database::*;
pub use error::*;
pub use pagination::*;
pub use table::*;
