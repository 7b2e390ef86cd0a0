//! Minimal schema: which fields exist, which are sortable, and how each is
//! scored.

pub mod field;
#[allow(clippy::module_inception)]
pub mod schema;

pub use field::FieldDefinition;
pub use schema::{Schema, SchemaBuilder};
