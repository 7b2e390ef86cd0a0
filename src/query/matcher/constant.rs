use crate::DocId;
use crate::error::Result;
use crate::query::matcher::effective_target;

/// Matches every doc ID in `1..=doc_max` with a fixed score.
#[derive(Debug, Clone)]
pub struct MatchAllMatcher {
    doc_max: DocId,
    score: f32,
    doc_id: DocId,
    exhausted: bool,
}

impl MatchAllMatcher {
    pub fn new(doc_max: DocId, score: f32) -> Self {
        MatchAllMatcher {
            doc_max,
            score,
            doc_id: 0,
            exhausted: doc_max == 0,
        }
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        self.advance(0)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(0);
        }
        match effective_target(target, self.doc_id) {
            Some(target) if target <= self.doc_max => {
                self.doc_id = target;
            }
            _ => {
                self.exhausted = true;
                self.doc_id = 0;
            }
        }
        Ok(self.doc_id)
    }

    pub(crate) fn score(&self) -> f32 {
        self.score
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.doc_max as u64
    }
}

/// Matches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMatchMatcher;

impl NoMatchMatcher {
    pub fn new() -> Self {
        NoMatchMatcher
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        Ok(0)
    }

    pub(crate) fn advance(&mut self, _target: DocId) -> Result<DocId> {
        Ok(0)
    }

    pub(crate) fn score(&self) -> f32 {
        0.0
    }

    pub(crate) fn doc_id(&self) -> DocId {
        0
    }

    pub(crate) fn cost(&self) -> u64 {
        0
    }
}
