use std::sync::Arc;

use crate::DocId;
use crate::error::Result;
use crate::index::posting::PostingList;
use crate::query::similarity::Similarity;

/// Matches the documents of one posting list.
#[derive(Debug)]
pub struct TermMatcher {
    postings: Box<dyn PostingList>,
    similarity: Arc<dyn Similarity>,
    /// Normalized query weight of the term.
    weight: f32,
    avg_field_length: f32,
}

impl TermMatcher {
    /// Create a matcher over `postings`.
    pub fn new(
        postings: Box<dyn PostingList>,
        similarity: Arc<dyn Similarity>,
        weight: f32,
        avg_field_length: f32,
    ) -> Self {
        TermMatcher {
            postings,
            similarity,
            weight,
            avg_field_length,
        }
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        self.postings.next()
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        self.postings.advance(target)
    }

    pub(crate) fn score(&self) -> f32 {
        let posting = self.postings.posting();
        self.similarity.score(
            posting.freq as f32,
            posting.field_length,
            self.avg_field_length,
            self.weight,
        )
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.postings.doc_id()
    }

    pub(crate) fn cost(&self) -> u64 {
        self.postings.doc_freq()
    }
}
