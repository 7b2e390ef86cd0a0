//! Stored documents returned by a search.
//!
//! Documents are plain field maps. Matching never looks at them; they are
//! fetched lazily by [`Hits`](crate::search::Hits) once a hit is consumed.

#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

pub use document::{Document, DocumentBuilder};
pub use field_value::FieldValue;
