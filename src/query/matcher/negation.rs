use crate::DocId;
use crate::error::Result;
use crate::query::matcher::{Matcher, effective_target};

/// Matches every document in `1..=doc_max` that the negated child does not.
/// Every match scores 0.
#[derive(Debug)]
pub struct NotMatcher {
    negated: Box<Matcher>,
    doc_max: DocId,
    doc_id: DocId,
    /// Next document the negated child matches; `DocId::MAX` once it is
    /// exhausted.
    next_negation: DocId,
    exhausted: bool,
}

impl NotMatcher {
    /// Create a negation bounded by `doc_max`.
    pub fn new(negated: Matcher, doc_max: DocId) -> Self {
        NotMatcher {
            negated: Box::new(negated),
            doc_max,
            doc_id: 0,
            next_negation: 0,
            exhausted: false,
        }
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        self.advance(0)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(0);
        }
        let Some(mut candidate) = effective_target(target, self.doc_id) else {
            return Ok(self.exhaust());
        };

        while candidate <= self.doc_max {
            if self.next_negation < candidate {
                self.next_negation = match self.negated.advance(candidate)? {
                    0 => DocId::MAX,
                    doc_id => doc_id,
                };
            }
            if self.next_negation != candidate {
                self.doc_id = candidate;
                return Ok(candidate);
            }
            candidate = match candidate.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(self.exhaust())
    }

    fn exhaust(&mut self) -> DocId {
        self.exhausted = true;
        self.doc_id = 0;
        0
    }

    pub(crate) fn score(&self) -> f32 {
        0.0
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.doc_max as u64
    }
}

/// Matches documents of `inner` that `excluded` does not match (AND NOT).
/// Scores come from `inner` alone.
#[derive(Debug)]
pub struct FilteredMatcher {
    inner: Box<Matcher>,
    excluded: Box<Matcher>,
    /// Next document `excluded` matches; `DocId::MAX` once it is exhausted.
    next_excluded: DocId,
}

impl FilteredMatcher {
    /// Create the matcher.
    pub fn new(inner: Matcher, excluded: Matcher) -> Self {
        FilteredMatcher {
            inner: Box::new(inner),
            excluded: Box::new(excluded),
            next_excluded: 0,
        }
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        let doc_id = self.inner.next()?;
        self.skip_excluded(doc_id)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc_id = self.inner.advance(target)?;
        self.skip_excluded(doc_id)
    }

    fn skip_excluded(&mut self, mut doc_id: DocId) -> Result<DocId> {
        while doc_id != 0 {
            if self.next_excluded < doc_id {
                self.next_excluded = match self.excluded.advance(doc_id)? {
                    0 => DocId::MAX,
                    excluded => excluded,
                };
            }
            if self.next_excluded != doc_id {
                break;
            }
            doc_id = self.inner.next()?;
        }
        Ok(doc_id)
    }

    pub(crate) fn score(&self) -> f32 {
        self.inner.score()
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.inner.doc_id()
    }

    pub(crate) fn cost(&self) -> u64 {
        self.inner.cost()
    }
}
