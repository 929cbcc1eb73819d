mod schema;

pub use schema::{DataField, Schema};
