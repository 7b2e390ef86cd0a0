use crate::DocId;
use crate::error::Result;
use crate::query::matcher::effective_target;

/// Replays a fixed list of doc IDs and scores.
///
/// Useful for exercising composite matchers and collectors without building
/// a segment.
#[derive(Debug, Clone)]
pub struct MockMatcher {
    doc_ids: Vec<DocId>,
    scores: Vec<f32>,
    /// Index of the next unread entry.
    tick: usize,
    doc_id: DocId,
}

impl MockMatcher {
    /// Create a mock from parallel lists of doc IDs and scores.
    ///
    /// # Panics
    ///
    /// Panics if the lists differ in length or the doc IDs are not strictly
    /// ascending and non-zero.
    pub fn new(doc_ids: Vec<DocId>, scores: Vec<f32>) -> Self {
        assert_eq!(
            doc_ids.len(),
            scores.len(),
            "doc_ids and scores must have the same length"
        );
        assert!(
            doc_ids.first().is_none_or(|&first| first > 0)
                && doc_ids.windows(2).all(|pair| pair[0] < pair[1]),
            "doc_ids must be non-zero and strictly ascending"
        );
        MockMatcher {
            doc_ids,
            scores,
            tick: 0,
            doc_id: 0,
        }
    }

    /// Create a mock scoring every doc 1.0.
    pub fn from_doc_ids(doc_ids: Vec<DocId>) -> Self {
        let scores = vec![1.0; doc_ids.len()];
        Self::new(doc_ids, scores)
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        self.advance(0)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        let target = effective_target(target, self.doc_id).unwrap_or(DocId::MAX);
        while self.tick < self.doc_ids.len() && self.doc_ids[self.tick] < target {
            self.tick += 1;
        }
        self.doc_id = match self.doc_ids.get(self.tick) {
            Some(&doc_id) => {
                self.tick += 1;
                doc_id
            }
            None => 0,
        };
        Ok(self.doc_id)
    }

    pub(crate) fn score(&self) -> f32 {
        self.scores[self.tick - 1]
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.doc_ids.len() as u64
    }
}
