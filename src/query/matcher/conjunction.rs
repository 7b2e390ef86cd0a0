use crate::DocId;
use crate::error::Result;
use crate::query::matcher::{Matcher, effective_target};
use crate::query::similarity::Similarity;

/// Matches documents on which every child matches (AND).
///
/// Children are ordered by ascending cost so the rarest one proposes
/// candidates. The score is the sum of the child scores times the coord
/// factor for full overlap.
#[derive(Debug)]
pub struct ConjunctionMatcher {
    children: Vec<Matcher>,
    coord: f32,
    doc_id: DocId,
    exhausted: bool,
}

impl ConjunctionMatcher {
    /// Create a conjunction. With no children nothing matches.
    pub fn new(mut children: Vec<Matcher>, similarity: &dyn Similarity) -> Self {
        children.sort_by_key(|child| child.cost());
        let num_children = children.len() as u32;
        ConjunctionMatcher {
            exhausted: children.is_empty(),
            coord: similarity.coord(num_children, num_children),
            children,
            doc_id: 0,
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
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

        loop {
            let mut highest = candidate;
            for child in self.children.iter_mut() {
                let mut doc_id = child.doc_id();
                if doc_id < candidate {
                    doc_id = child.advance(candidate)?;
                }
                if doc_id == 0 || doc_id > candidate {
                    highest = doc_id;
                    break;
                }
            }

            if highest == 0 {
                return Ok(self.exhaust());
            }
            if highest == candidate {
                self.doc_id = candidate;
                return Ok(candidate);
            }
            candidate = highest;
        }
    }

    fn exhaust(&mut self) -> DocId {
        self.exhausted = true;
        self.doc_id = 0;
        0
    }

    pub(crate) fn score(&self) -> f32 {
        let sum: f32 = self.children.iter().map(|child| child.score()).sum();
        sum * self.coord
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.children.first().map(|child| child.cost()).unwrap_or(0)
    }
}
