use std::ops::Bound;
use std::sync::Arc;

use crate::DocId;
use crate::error::Result;
use crate::index::reader::SegmentReader;
use crate::query::matcher::effective_target;
use crate::query::sort::SortValue;

/// Matches the documents whose sort value for a field lies between two
/// bounds. Documents without a value never match. Every match scores the
/// same fixed score.
#[derive(Debug)]
pub struct RangeMatcher {
    segment: Arc<dyn SegmentReader>,
    field: String,
    lower: Bound<SortValue>,
    upper: Bound<SortValue>,
    doc_max: DocId,
    score: f32,
    doc_id: DocId,
    exhausted: bool,
}

impl RangeMatcher {
    /// Create a matcher over `segment`, walking `1..=segment.doc_max()`.
    pub fn new(
        segment: Arc<dyn SegmentReader>,
        field: impl Into<String>,
        lower: Bound<SortValue>,
        upper: Bound<SortValue>,
        score: f32,
    ) -> Self {
        let doc_max = segment.doc_max();
        RangeMatcher {
            segment,
            field: field.into(),
            lower,
            upper,
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
        let Some(mut candidate) = effective_target(target, self.doc_id) else {
            return Ok(self.exhaust());
        };

        while candidate <= self.doc_max {
            let value = self.segment.sort_value(&self.field, candidate)?;
            if in_range(&value, &self.lower, &self.upper) {
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
        self.score
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.doc_max as u64
    }
}

/// Whether a present `value` satisfies both bounds.
pub(crate) fn in_range(value: &SortValue, lower: &Bound<SortValue>, upper: &Bound<SortValue>) -> bool {
    if value.is_null() {
        return false;
    }
    let above_lower = match lower {
        Bound::Included(bound) => value.compare(bound).is_ge(),
        Bound::Excluded(bound) => value.compare(bound).is_gt(),
        Bound::Unbounded => true,
    };
    let below_upper = match upper {
        Bound::Included(bound) => value.compare(bound).is_le(),
        Bound::Excluded(bound) => value.compare(bound).is_lt(),
        Bound::Unbounded => true,
    };
    above_lower && below_upper
}
