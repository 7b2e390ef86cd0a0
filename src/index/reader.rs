//! The read-only view of one segment consumed by compilers and collectors.

use std::fmt::Debug;
use std::sync::Arc;

use crate::DocId;
use crate::document::Document;
use crate::error::Result;
use crate::index::posting::PostingList;
use crate::query::sort::SortValue;
use crate::util::bit_set::BitSet;

/// Per-field length statistics for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldStats {
    /// Number of documents with at least one token in the field.
    pub doc_count: u64,
    /// Total number of tokens in the field across the segment.
    pub total_length: u64,
}

impl FieldStats {
    /// Average number of tokens per document holding the field.
    pub fn avg_length(&self) -> f32 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_length as f32 / self.doc_count as f32
        }
    }
}

/// Access to one segment of an index.
///
/// Doc IDs are segment-local and run `1..=doc_max`. Deleted documents keep
/// their IDs and are reported through [`SegmentReader::deletions`].
pub trait SegmentReader: Send + Sync + Debug {
    /// Highest doc ID in the segment.
    fn doc_max(&self) -> DocId;

    /// Number of live (non-deleted) documents.
    fn doc_count(&self) -> u64;

    /// Number of documents containing `term` in `field`.
    fn doc_freq(&self, field: &str, term: &str) -> u64;

    /// Open a posting list, or `None` if the term does not occur.
    fn posting_list(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingList>>>;

    /// Deleted documents, if any.
    fn deletions(&self) -> Option<Arc<BitSet>>;

    /// Length statistics for `field`.
    fn field_stats(&self, field: &str) -> Option<FieldStats>;

    /// The sort key of `field` in `doc_id`, [`SortValue::Null`] when absent.
    fn sort_value(&self, field: &str, doc_id: DocId) -> Result<SortValue>;

    /// Load the stored fields of `doc_id`.
    fn fetch_doc(&self, doc_id: DocId) -> Result<Document>;
}

/// A shared segment handle.
pub type SegmentRef = Arc<dyn SegmentReader>;
