//! # Lucerne
//!
//! A query execution engine for full-text search.
//!
//! Queries are compiled against collection statistics, turned into a tree of
//! matchers per segment, and walked in doc-ID order. Collectors consume the
//! matches; the top-K collector ranks them by score or by a sort spec.
//!
//! ## Features
//!
//! - Term, phrase, boolean, match-all and no-match queries
//! - TF-IDF and BM25 scoring
//! - Deleted documents filtered during collection
//! - Sorting by score, doc ID or sortable fields
//! - Sequential or parallel segment search, and searchers over searchers
//!
//! ```
//! use std::sync::Arc;
//!
//! use lucerne::document::Document;
//! use lucerne::index::{MemorySegment, SegmentReader};
//! use lucerne::query::TermQuery;
//! use lucerne::schema::Schema;
//! use lucerne::search::{IndexSearcher, Searcher};
//!
//! let mut builder = MemorySegment::builder();
//! builder.add_document(
//!     Document::builder().add_text("body", "the quick fox").build(),
//!     [("body", "the quick fox")],
//! );
//! let segment: Arc<dyn SegmentReader> = Arc::new(builder.build().unwrap());
//! let searcher = IndexSearcher::new(vec![segment], Arc::new(Schema::new())).unwrap();
//!
//! let top_docs = searcher.search(&TermQuery::new("body", "fox"), 0, 10).unwrap();
//! assert_eq!(top_docs.doc_ids(), vec![1]);
//! ```

pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod schema;
pub mod search;
pub mod util;

/// A document number. Segment-local IDs run from 1; 0 means "no document".
pub type DocId = u32;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
