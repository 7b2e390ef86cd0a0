//! Collectors consume the matches of a matcher tree.
//!
//! The collection driver ([`Matcher::collect`]) hands every live match to a
//! [`Collector`] together with the matcher itself, so the collector decides
//! whether the score is worth computing. Before each segment is searched the
//! collector is told which segment it is reading and the doc-ID base that
//! turns segment-local IDs into searcher-wide ones.

use std::fmt::Debug;
use std::sync::Arc;

use log::trace;

use crate::DocId;
use crate::error::{LucerneError, Result};
use crate::index::reader::SegmentReader;
use crate::query::hit_queue::{HitQueue, SortAction, compare_doc_ids, compare_scores};
use crate::query::match_doc::{MatchDoc, TopDocs};
use crate::query::matcher::Matcher;
use crate::query::sort::{SortSpec, SortValue};
use crate::schema::Schema;
use crate::util::bit_set::BitSet;

/// Consumer of matches.
pub trait Collector: Send + Debug {
    /// Prepare for the matches of `segment`, whose local doc IDs are offset
    /// by `base`.
    fn set_segment(&mut self, segment: Arc<dyn SegmentReader>, base: DocId) -> Result<()>;

    /// Receive a segment-local match. `matcher` is positioned on `doc_id`.
    fn collect(&mut self, doc_id: DocId, matcher: &Matcher) -> Result<()>;

    /// Whether this collector reads scores. Matchers built for a collector
    /// that does not may skip scoring.
    fn need_score(&self) -> bool {
        true
    }
}

impl<C: Collector + ?Sized> Collector for &mut C {
    fn set_segment(&mut self, segment: Arc<dyn SegmentReader>, base: DocId) -> Result<()> {
        (**self).set_segment(segment, base)
    }

    fn collect(&mut self, doc_id: DocId, matcher: &Matcher) -> Result<()> {
        (**self).collect(doc_id, matcher)
    }

    fn need_score(&self) -> bool {
        (**self).need_score()
    }
}

/// Keeps the best `wanted` hits under a sort order.
///
/// Every match is counted. Once the queue is full, a match is compared with
/// the worst retained hit one sort action at a time, and its score and sort
/// values are only pulled as far as that comparison needs them.
#[derive(Debug)]
pub struct TopCollector {
    queue: HitQueue,
    /// Field names of the sort spec's field rules, in rule order.
    sort_fields: Vec<String>,
    need_score: bool,
    segment: Option<Arc<dyn SegmentReader>>,
    base: DocId,
    total_hits: u32,
}

impl TopCollector {
    /// Create a collector keeping `wanted` hits.
    ///
    /// Without a sort spec hits rank by descending score. A spec naming a
    /// field the schema does not mark sortable is rejected.
    pub fn new(schema: &Schema, sort_spec: Option<SortSpec>, wanted: usize) -> Result<Self> {
        if let Some(spec) = &sort_spec {
            spec.validate(schema)?;
        }
        let sort_fields = sort_spec
            .as_ref()
            .map(|spec| spec.field_names().into_iter().map(String::from).collect())
            .unwrap_or_default();
        let need_score = sort_spec.as_ref().is_none_or(|spec| spec.needs_score());

        Ok(TopCollector {
            queue: HitQueue::new(sort_spec.as_ref(), wanted),
            sort_fields,
            need_score,
            segment: None,
            base: 0,
            total_hits: 0,
        })
    }

    /// Number of matches seen so far.
    pub fn total_hits(&self) -> u32 {
        self.total_hits
    }

    /// The best hits so far, best first.
    pub fn top_docs(&self) -> TopDocs {
        TopDocs::new(self.queue.clone().pop_all(), self.total_hits)
    }

    /// Consume the collector, returning its hits.
    pub fn into_top_docs(self) -> TopDocs {
        TopDocs::new(self.queue.pop_all(), self.total_hits)
    }

    fn sort_value(&self, index: usize, local_doc_id: DocId) -> Result<SortValue> {
        let segment = self.segment.as_ref().ok_or_else(|| {
            LucerneError::InvalidOperation(
                "Field sort requires set_segment before collect".to_string(),
            )
        })?;
        segment.sort_value(&self.sort_fields[index], local_doc_id)
    }

    /// Whether the candidate beats the worst retained hit. `score` and
    /// `values` cache what the comparison pulled.
    fn beats_worst(
        &self,
        local_doc_id: DocId,
        doc_id: DocId,
        matcher: &Matcher,
        score: &mut Option<f32>,
        values: &mut Vec<SortValue>,
    ) -> Result<bool> {
        let Some(worst) = self.queue.peek_worst() else {
            return Ok(true);
        };

        for action in self.queue.actions() {
            let ord = match *action {
                SortAction::Score { reverse } => {
                    let score = *score.get_or_insert_with(|| matcher.score());
                    compare_scores(score, worst.score, reverse)
                }
                SortAction::DocId { reverse } => compare_doc_ids(doc_id, worst.doc_id, reverse),
                SortAction::Field { index, reverse } => {
                    while values.len() <= index {
                        values.push(self.sort_value(values.len(), local_doc_id)?);
                    }
                    let worst_value = worst
                        .values
                        .as_ref()
                        .and_then(|values| values.get(index))
                        .unwrap_or(&SortValue::Null);
                    values[index].compare_nulls_last(worst_value, reverse)
                }
            };
            if ord != std::cmp::Ordering::Equal {
                return Ok(ord == std::cmp::Ordering::Less);
            }
        }
        Ok(doc_id < worst.doc_id)
    }
}

impl Collector for TopCollector {
    fn set_segment(&mut self, segment: Arc<dyn SegmentReader>, base: DocId) -> Result<()> {
        trace!("TopCollector reading segment at base {base}");
        self.segment = Some(segment);
        self.base = base;
        Ok(())
    }

    fn collect(&mut self, doc_id: DocId, matcher: &Matcher) -> Result<()> {
        self.total_hits = self.total_hits.saturating_add(1);
        if self.queue.max_size() == 0 {
            return Ok(());
        }

        let global_doc_id = self.base + doc_id;
        let mut score = None;
        let mut values = Vec::new();

        if self.queue.is_full()
            && !self.beats_worst(doc_id, global_doc_id, matcher, &mut score, &mut values)?
        {
            return Ok(());
        }

        let score = match score {
            Some(score) => score,
            None if self.need_score => matcher.score(),
            None => 0.0,
        };
        let mut match_doc = MatchDoc::new(global_doc_id, score);
        if !self.sort_fields.is_empty() {
            while values.len() < self.sort_fields.len() {
                values.push(self.sort_value(values.len(), doc_id)?);
            }
            match_doc = match_doc.with_values(values);
        }
        self.queue.insert(match_doc);
        Ok(())
    }

    fn need_score(&self) -> bool {
        self.need_score
    }
}

/// Keeps every match with its score, in collection order.
#[derive(Debug, Default)]
pub struct AllCollector {
    match_docs: Vec<MatchDoc>,
    base: DocId,
}

impl AllCollector {
    pub fn new() -> Self {
        AllCollector::default()
    }

    /// The collected matches.
    pub fn match_docs(&self) -> &[MatchDoc] {
        &self.match_docs
    }

    pub fn into_match_docs(self) -> Vec<MatchDoc> {
        self.match_docs
    }
}

impl Collector for AllCollector {
    fn set_segment(&mut self, _segment: Arc<dyn SegmentReader>, base: DocId) -> Result<()> {
        self.base = base;
        Ok(())
    }

    fn collect(&mut self, doc_id: DocId, matcher: &Matcher) -> Result<()> {
        self.match_docs
            .push(MatchDoc::new(self.base + doc_id, matcher.score()));
        Ok(())
    }
}

/// Counts matches without scoring them.
#[derive(Debug, Default)]
pub struct CountCollector {
    count: u64,
}

impl CountCollector {
    pub fn new() -> Self {
        CountCollector::default()
    }

    /// Number of matches collected.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Collector for CountCollector {
    fn set_segment(&mut self, _segment: Arc<dyn SegmentReader>, _base: DocId) -> Result<()> {
        Ok(())
    }

    fn collect(&mut self, _doc_id: DocId, _matcher: &Matcher) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn need_score(&self) -> bool {
        false
    }
}

/// Sets a bit for every match.
///
/// # Panics
///
/// Collecting a doc ID at or beyond the capacity panics.
#[derive(Debug)]
pub struct BitCollector {
    bits: BitSet,
    base: DocId,
}

impl BitCollector {
    /// Create a collector for doc IDs below `capacity`.
    pub fn new(capacity: usize) -> Self {
        BitCollector {
            bits: BitSet::new(capacity),
            base: 0,
        }
    }

    pub fn bits(&self) -> &BitSet {
        &self.bits
    }

    pub fn into_bits(self) -> BitSet {
        self.bits
    }
}

impl Collector for BitCollector {
    fn set_segment(&mut self, _segment: Arc<dyn SegmentReader>, base: DocId) -> Result<()> {
        self.base = base;
        Ok(())
    }

    fn collect(&mut self, doc_id: DocId, _matcher: &Matcher) -> Result<()> {
        self.bits.set(self.base + doc_id);
        Ok(())
    }

    fn need_score(&self) -> bool {
        false
    }
}

/// Shifts every segment base by a fixed offset before delegating.
///
/// Used to collect from a sub-searcher whose doc IDs start at `offset` in an
/// enclosing searcher.
#[derive(Debug)]
pub struct OffsetCollector<C> {
    inner: C,
    offset: DocId,
}

impl<C: Collector> OffsetCollector<C> {
    pub fn new(inner: C, offset: DocId) -> Self {
        OffsetCollector { inner, offset }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Collector> Collector for OffsetCollector<C> {
    fn set_segment(&mut self, segment: Arc<dyn SegmentReader>, base: DocId) -> Result<()> {
        self.inner.set_segment(segment, base + self.offset)
    }

    fn collect(&mut self, doc_id: DocId, matcher: &Matcher) -> Result<()> {
        self.inner.collect(doc_id, matcher)
    }

    fn need_score(&self) -> bool {
        self.inner.need_score()
    }
}
