use std::sync::Arc;

use crate::DocId;
use crate::error::Result;
use crate::index::posting::PostingList;
use crate::query::matcher::effective_target;
use crate::query::similarity::Similarity;

/// Matches documents in which the phrase terms occur at consecutive
/// positions. The phrase frequency stands in for the term frequency when
/// scoring.
#[derive(Debug)]
pub struct PhraseMatcher {
    /// One posting list per phrase term, in phrase order.
    postings: Vec<Box<dyn PostingList>>,
    similarity: Arc<dyn Similarity>,
    weight: f32,
    avg_field_length: f32,
    doc_id: DocId,
    phrase_freq: u32,
    field_length: u32,
    exhausted: bool,
}

impl PhraseMatcher {
    /// Create a matcher; `postings` must hold at least one list.
    pub fn new(
        postings: Vec<Box<dyn PostingList>>,
        similarity: Arc<dyn Similarity>,
        weight: f32,
        avg_field_length: f32,
    ) -> Self {
        assert!(!postings.is_empty(), "PhraseMatcher needs at least one term");
        PhraseMatcher {
            postings,
            similarity,
            weight,
            avg_field_length,
            doc_id: 0,
            phrase_freq: 0,
            field_length: 0,
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
        match effective_target(target, self.doc_id) {
            Some(target) => self.seek(target),
            None => Ok(self.exhaust()),
        }
    }

    /// Find the first document at or after `candidate` where every term
    /// occurs and the phrase occurs at least once.
    fn seek(&mut self, mut candidate: DocId) -> Result<DocId> {
        loop {
            let mut highest = candidate;
            for postings in self.postings.iter_mut() {
                let mut doc_id = postings.doc_id();
                if doc_id < candidate {
                    doc_id = postings.advance(candidate)?;
                }
                if doc_id == 0 || doc_id > candidate {
                    highest = doc_id;
                    break;
                }
            }
            if highest == 0 {
                return Ok(self.exhaust());
            }
            if highest > candidate {
                candidate = highest;
                continue;
            }

            let phrase_freq = self.count_phrases();
            if phrase_freq > 0 {
                self.doc_id = candidate;
                self.phrase_freq = phrase_freq;
                self.field_length = self.postings[0].posting().field_length;
                return Ok(candidate);
            }

            candidate = match candidate.checked_add(1) {
                Some(next) => next,
                None => return Ok(self.exhaust()),
            };
        }
    }

    /// Number of start positions at which the whole phrase occurs.
    fn count_phrases(&self) -> u32 {
        let (first, rest) = match self.postings.split_first() {
            Some(split) => split,
            None => return 0,
        };

        first
            .posting()
            .positions
            .iter()
            .filter(|&&start| {
                rest.iter().enumerate().all(|(offset, postings)| {
                    start
                        .checked_add(offset as u32 + 1)
                        .map(|wanted| postings.posting().positions.binary_search(&wanted).is_ok())
                        .unwrap_or(false)
                })
            })
            .count() as u32
    }

    fn exhaust(&mut self) -> DocId {
        self.exhausted = true;
        self.doc_id = 0;
        0
    }

    pub(crate) fn score(&self) -> f32 {
        self.similarity.score(
            self.phrase_freq as f32,
            self.field_length,
            self.avg_field_length,
            self.weight,
        )
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.postings
            .iter()
            .map(|postings| postings.doc_freq())
            .min()
            .unwrap_or(0)
    }
}
