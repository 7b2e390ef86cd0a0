use crate::DocId;
use crate::error::Result;
use crate::query::matcher::{Matcher, effective_target};
use crate::query::similarity::Similarity;

/// Matches documents on which any child matches (OR).
///
/// Children sit in an array-backed min-heap keyed by their current doc ID.
/// On each match the heap top gives the doc; every child positioned there
/// contributes its score and is moved past it. The summed score is scaled by
/// a coord factor for the number of matching children, looked up in a table
/// built once at construction.
#[derive(Debug)]
pub struct DisjunctionMatcher {
    children: Vec<Matcher>,
    /// Indices into `children`, heap-ordered by doc ID.
    heap: Vec<usize>,
    /// `coord_factors[n]` for `n` matching children.
    coord_factors: Vec<f32>,
    need_score: bool,
    min_match: usize,
    primed: bool,
    doc_id: DocId,
    score: f32,
    matched: usize,
    exhausted: bool,
}

impl DisjunctionMatcher {
    /// Create a disjunction that computes scores.
    pub fn new(children: Vec<Matcher>, similarity: &dyn Similarity) -> Self {
        Self::with_options(children, similarity, true, 1)
    }

    /// Create a disjunction.
    ///
    /// Without `need_score` child scores are never read and
    /// [`Matcher::score`] returns 0. A document matches only when at least
    /// `min_match` children (clamped to 1 or more) match it.
    pub fn with_options(
        children: Vec<Matcher>,
        similarity: &dyn Similarity,
        need_score: bool,
        min_match: usize,
    ) -> Self {
        let coord_factors = similarity.coord_factors(children.len() as u32);
        DisjunctionMatcher {
            heap: Vec::with_capacity(children.len()),
            exhausted: children.is_empty(),
            children,
            coord_factors,
            need_score,
            min_match: min_match.max(1),
            primed: false,
            doc_id: 0,
            score: 0.0,
            matched: 0,
        }
    }

    /// Number of children matching the current document.
    pub fn matched_count(&self) -> usize {
        self.matched
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        self.advance(0)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(0);
        }
        let Some(target) = effective_target(target, self.doc_id) else {
            return Ok(self.exhaust());
        };

        if self.primed {
            self.raise_heap(target)?;
        } else {
            self.prime(target)?;
        }

        while let Some(&top) = self.heap.first() {
            let doc_id = self.children[top].doc_id();
            let mut score = 0.0;
            let mut matched = 0;

            while let Some(&top) = self.heap.first() {
                let child = &mut self.children[top];
                if child.doc_id() != doc_id {
                    break;
                }
                if self.need_score {
                    score += child.score();
                }
                matched += 1;
                if child.next()? == 0 {
                    self.remove_top();
                } else {
                    self.sift_down(0);
                }
            }

            if matched >= self.min_match {
                self.doc_id = doc_id;
                self.matched = matched;
                self.score = if self.need_score {
                    score * self.coord_factors[matched]
                } else {
                    0.0
                };
                return Ok(doc_id);
            }
        }

        Ok(self.exhaust())
    }

    /// Position every child for the first time.
    fn prime(&mut self, target: DocId) -> Result<()> {
        self.primed = true;
        for idx in 0..self.children.len() {
            if self.children[idx].advance(target)? != 0 {
                self.heap.push(idx);
                self.sift_up(self.heap.len() - 1);
            }
        }
        Ok(())
    }

    /// Move every child still below `target` up to it.
    fn raise_heap(&mut self, target: DocId) -> Result<()> {
        while let Some(&top) = self.heap.first() {
            let child = &mut self.children[top];
            if child.doc_id() >= target {
                break;
            }
            if child.advance(target)? == 0 {
                self.remove_top();
            } else {
                self.sift_down(0);
            }
        }
        Ok(())
    }

    fn exhaust(&mut self) -> DocId {
        self.exhausted = true;
        self.doc_id = 0;
        self.matched = 0;
        0
    }

    fn key(&self, heap_idx: usize) -> DocId {
        self.children[self.heap[heap_idx]].doc_id()
    }

    fn remove_top(&mut self) {
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.key(idx) < self.key(parent) {
                self.heap.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;
            if left < len && self.key(left) < self.key(smallest) {
                smallest = left;
            }
            if right < len && self.key(right) < self.key(smallest) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.heap.swap(idx, smallest);
            idx = smallest;
        }
    }

    pub(crate) fn score(&self) -> f32 {
        self.score
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.children.iter().map(|child| child.cost()).sum()
    }
}
