//! Bounded priority queue of hits.
//!
//! The queue keeps the best `max_size` [`MatchDoc`]s seen so far under a
//! [`SortSpec`]. It is an array-backed binary heap whose root is the worst
//! retained hit, so deciding whether a new hit competes is a single
//! comparison against the root.

use std::cmp::Ordering;

use crate::DocId;
use crate::query::match_doc::{MatchDoc, TopDocs};
use crate::query::sort::{SortRuleKind, SortSpec, SortValue};

/// One compiled comparison step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAction {
    /// Higher scores first (lower when reversed).
    Score { reverse: bool },
    /// Lower doc IDs first (higher when reversed).
    DocId { reverse: bool },
    /// Compare `values[index]`, nulls last.
    Field { index: usize, reverse: bool },
}

impl SortAction {
    /// Compile a spec into comparison steps. Field rules index the
    /// `values` of each hit in rule order.
    pub fn compile(sort_spec: Option<&SortSpec>) -> Vec<SortAction> {
        let Some(spec) = sort_spec else {
            return vec![SortAction::Score { reverse: false }];
        };

        let mut next_field = 0;
        spec.rules()
            .iter()
            .map(|rule| match rule.kind() {
                SortRuleKind::Score => SortAction::Score {
                    reverse: rule.reverse(),
                },
                SortRuleKind::DocId => SortAction::DocId {
                    reverse: rule.reverse(),
                },
                SortRuleKind::Field(_) => {
                    let index = next_field;
                    next_field += 1;
                    SortAction::Field {
                        index,
                        reverse: rule.reverse(),
                    }
                }
            })
            .collect()
    }
}

/// Compare scores for ranking: `Less` means `a` ranks ahead of `b`.
pub fn compare_scores(a: f32, b: f32, reverse: bool) -> Ordering {
    let ord = b.total_cmp(&a);
    if reverse { ord.reverse() } else { ord }
}

/// Compare doc IDs for ranking: `Less` means `a` ranks ahead of `b`.
pub fn compare_doc_ids(a: DocId, b: DocId, reverse: bool) -> Ordering {
    let ord = a.cmp(&b);
    if reverse { ord.reverse() } else { ord }
}

/// Rank two hits. `Less` means `a` ranks ahead of `b`; ties on every action
/// fall back to ascending doc ID.
pub fn compare_match_docs(actions: &[SortAction], a: &MatchDoc, b: &MatchDoc) -> Ordering {
    for action in actions {
        let ord = match *action {
            SortAction::Score { reverse } => compare_scores(a.score, b.score, reverse),
            SortAction::DocId { reverse } => compare_doc_ids(a.doc_id, b.doc_id, reverse),
            SortAction::Field { index, reverse } => {
                field_value(a, index).compare_nulls_last(field_value(b, index), reverse)
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.doc_id.cmp(&b.doc_id)
}

fn field_value(doc: &MatchDoc, index: usize) -> &SortValue {
    const NULL: &SortValue = &SortValue::Null;
    doc.values
        .as_ref()
        .and_then(|values| values.get(index))
        .unwrap_or(NULL)
}

/// A bounded queue keeping the best hits under a sort order.
#[derive(Debug, Clone)]
pub struct HitQueue {
    /// Heap with the worst retained hit at index 0.
    heap: Vec<MatchDoc>,
    max_size: usize,
    actions: Vec<SortAction>,
}

impl HitQueue {
    /// Create a queue holding at most `max_size` hits. Without a sort spec
    /// hits rank by descending score.
    pub fn new(sort_spec: Option<&SortSpec>, max_size: usize) -> Self {
        HitQueue {
            heap: Vec::with_capacity(max_size.min(1024)),
            max_size,
            actions: SortAction::compile(sort_spec),
        }
    }

    /// The compiled comparison steps.
    pub fn actions(&self) -> &[SortAction] {
        &self.actions
    }

    /// Rank two hits under this queue's order.
    pub fn compare(&self, a: &MatchDoc, b: &MatchDoc) -> Ordering {
        compare_match_docs(&self.actions, a, b)
    }

    /// Number of retained hits.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if no hits are retained.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the queue holds `max_size` hits.
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.max_size
    }

    /// Maximum number of retained hits.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The worst retained hit.
    pub fn peek_worst(&self) -> Option<&MatchDoc> {
        self.heap.first()
    }

    /// Offer a hit. Returns whether it was kept.
    pub fn insert(&mut self, doc: MatchDoc) -> bool {
        if self.max_size == 0 {
            return false;
        }
        if self.heap.len() < self.max_size {
            self.heap.push(doc);
            self.sift_up(self.heap.len() - 1);
            return true;
        }
        if self.compare(&doc, &self.heap[0]) == Ordering::Less {
            self.heap[0] = doc;
            self.sift_down(0);
            true
        } else {
            false
        }
    }

    /// Drain the queue into a best-first list.
    pub fn pop_all(self) -> Vec<MatchDoc> {
        let actions = self.actions;
        let mut docs = self.heap;
        docs.sort_by(|a, b| compare_match_docs(&actions, a, b));
        docs
    }

    /// `a` ranks strictly behind `b`.
    fn worse(&self, a: usize, b: usize) -> bool {
        self.compare(&self.heap[a], &self.heap[b]) == Ordering::Greater
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.worse(idx, parent) {
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
            let mut worst = idx;
            if left < len && self.worse(left, worst) {
                worst = left;
            }
            if right < len && self.worse(right, worst) {
                worst = right;
            }
            if worst == idx {
                break;
            }
            self.heap.swap(idx, worst);
            idx = worst;
        }
    }
}

/// Merge several already-ranked result sets into the best `wanted` overall.
///
/// Doc IDs must already be distinct across parts; total hits are summed.
pub fn merge_top_docs<I>(parts: I, sort_spec: Option<&SortSpec>, wanted: usize) -> TopDocs
where
    I: IntoIterator<Item = TopDocs>,
{
    let mut queue = HitQueue::new(sort_spec, wanted);
    let mut total_hits = 0u32;
    for part in parts {
        total_hits = total_hits.saturating_add(part.total_hits);
        for match_doc in part.match_docs {
            // Parts are ranked, so once one hit is rejected the rest of the
            // part cannot compete either.
            if !queue.insert(match_doc) {
                break;
            }
        }
    }
    TopDocs::new(queue.pop_all(), total_hits)
}
