//! Matchers: pull-based iterators over matching doc IDs.
//!
//! Every matcher follows one positioning contract:
//!
//! - [`Matcher::next`] moves to the next match strictly above the current
//!   position and returns it, or `0` once exhausted. An exhausted matcher
//!   stays exhausted.
//! - [`Matcher::advance`] moves to the first match at or above `target`,
//!   but always moves at least one document: the effective target is
//!   `max(target, doc_id() + 1)`.
//! - [`Matcher::score`] is only valid right after a non-zero `next` or
//!   `advance`. Calling it before the first move or after exhaustion panics.
//!
//! Doc IDs are segment-local and start at 1; `0` is never a match.

mod bit_vec;
mod conjunction;
mod constant;
mod disjunction;
mod mock;
mod negation;
mod phrase;
mod range;
mod required_optional;
mod series;
mod term;

use std::time::Instant;

use log::debug;

use crate::DocId;
use crate::error::{LucerneError, Result};
use crate::query::collector::Collector;

pub use self::bit_vec::BitVecMatcher;
pub use self::conjunction::ConjunctionMatcher;
pub use self::constant::{MatchAllMatcher, NoMatchMatcher};
pub use self::disjunction::DisjunctionMatcher;
pub use self::mock::MockMatcher;
pub use self::negation::{FilteredMatcher, NotMatcher};
pub use self::phrase::PhraseMatcher;
pub use self::range::RangeMatcher;
pub use self::required_optional::RequiredOptionalMatcher;
pub use self::series::SeriesMatcher;
pub use self::term::TermMatcher;

/// Number of candidates between deadline checks.
const DEADLINE_CHECK_INTERVAL: u32 = 1024;

/// A node of a matcher tree.
#[derive(Debug)]
pub enum Matcher {
    /// Documents containing a term.
    Term(TermMatcher),
    /// Documents containing terms at consecutive positions.
    Phrase(PhraseMatcher),
    /// Documents matched by every child (AND).
    Conjunction(ConjunctionMatcher),
    /// Documents matched by any child (OR).
    Disjunction(DisjunctionMatcher),
    /// A required child scored together with an optional one.
    RequiredOptional(RequiredOptionalMatcher),
    /// Documents not matched by the child.
    Not(NotMatcher),
    /// Documents matched by one child but not another (AND NOT).
    Filtered(FilteredMatcher),
    /// The set bits of a bit set.
    BitVec(BitVecMatcher),
    /// Several matchers concatenated with doc-ID offsets.
    Series(SeriesMatcher),
    /// Documents whose sort value lies in a range.
    Range(RangeMatcher),
    /// Every document.
    MatchAll(MatchAllMatcher),
    /// No document.
    NoMatch(NoMatchMatcher),
    /// Fixed doc IDs and scores.
    Mock(MockMatcher),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            Matcher::Term($m) => $body,
            Matcher::Phrase($m) => $body,
            Matcher::Conjunction($m) => $body,
            Matcher::Disjunction($m) => $body,
            Matcher::RequiredOptional($m) => $body,
            Matcher::Not($m) => $body,
            Matcher::Filtered($m) => $body,
            Matcher::BitVec($m) => $body,
            Matcher::Series($m) => $body,
            Matcher::Range($m) => $body,
            Matcher::MatchAll($m) => $body,
            Matcher::NoMatch($m) => $body,
            Matcher::Mock($m) => $body,
        }
    };
}

impl Matcher {
    /// Move to the next match, returning it or `0` when exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<DocId> {
        dispatch!(self, m => m.next())
    }

    /// Move to the first match at or above `max(target, doc_id() + 1)`.
    pub fn advance(&mut self, target: DocId) -> Result<DocId> {
        dispatch!(self, m => m.advance(target))
    }

    /// Score of the current match.
    ///
    /// # Panics
    ///
    /// Panics if the matcher is not positioned on a match.
    pub fn score(&self) -> f32 {
        assert!(
            self.doc_id() != 0,
            "score() called on a matcher that is not positioned on a match"
        );
        dispatch!(self, m => m.score())
    }

    /// The current doc ID, `0` before the first move and after exhaustion.
    pub fn doc_id(&self) -> DocId {
        dispatch!(self, m => m.doc_id())
    }

    /// Estimated number of matches.
    pub fn cost(&self) -> u64 {
        dispatch!(self, m => m.cost())
    }

    /// Short name of the variant, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Matcher::Term(_) => "Term",
            Matcher::Phrase(_) => "Phrase",
            Matcher::Conjunction(_) => "Conjunction",
            Matcher::Disjunction(_) => "Disjunction",
            Matcher::RequiredOptional(_) => "RequiredOptional",
            Matcher::Not(_) => "Not",
            Matcher::Filtered(_) => "Filtered",
            Matcher::BitVec(_) => "BitVec",
            Matcher::Series(_) => "Series",
            Matcher::Range(_) => "Range",
            Matcher::MatchAll(_) => "MatchAll",
            Matcher::NoMatch(_) => "NoMatch",
            Matcher::Mock(_) => "Mock",
        }
    }

    /// Feed every match not present in `deletions` to `collector`.
    pub fn collect(
        &mut self,
        collector: &mut dyn Collector,
        deletions: Option<&mut Matcher>,
    ) -> Result<()> {
        self.collect_with_deadline(collector, deletions, None)
    }

    /// Like [`Matcher::collect`], aborting with
    /// [`LucerneError::OperationCancelled`] once `deadline` has passed. The
    /// clock is checked every 1024 candidates.
    pub fn collect_with_deadline(
        &mut self,
        collector: &mut dyn Collector,
        mut deletions: Option<&mut Matcher>,
        deadline: Option<Instant>,
    ) -> Result<()> {
        let mut doc_id: DocId = 0;
        let mut next_deletion: DocId = if deletions.is_some() { 0 } else { DocId::MAX };
        let mut candidates = 0u32;
        let mut skipped = 0u64;

        loop {
            doc_id = match doc_id.checked_add(1) {
                Some(target) => self.advance(target)?,
                None => 0,
            };
            if doc_id == 0 {
                break;
            }

            if let Some(deadline) = deadline {
                candidates = candidates.wrapping_add(1);
                if candidates % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                    return Err(LucerneError::timeout(format!(
                        "search deadline passed at doc {doc_id}"
                    )));
                }
            }

            if let Some(deletions) = deletions.as_deref_mut() {
                if next_deletion < doc_id {
                    next_deletion = deletions.advance(doc_id)?;
                    if next_deletion == 0 {
                        next_deletion = DocId::MAX;
                    }
                }
                if next_deletion == doc_id {
                    skipped += 1;
                    continue;
                }
            }

            collector.collect(doc_id, self)?;
        }

        if skipped > 0 {
            debug!("{} matcher skipped {} deleted docs", self.name(), skipped);
        }
        Ok(())
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Matcher {
                fn from(matcher: $ty) -> Self {
                    Matcher::$variant(matcher)
                }
            }
        )*
    };
}

impl_from_variant!(
    Term(TermMatcher),
    Phrase(PhraseMatcher),
    Conjunction(ConjunctionMatcher),
    Disjunction(DisjunctionMatcher),
    RequiredOptional(RequiredOptionalMatcher),
    Not(NotMatcher),
    Filtered(FilteredMatcher),
    BitVec(BitVecMatcher),
    Series(SeriesMatcher),
    Range(RangeMatcher),
    MatchAll(MatchAllMatcher),
    NoMatch(NoMatchMatcher),
    Mock(MockMatcher),
);

/// Effective target of an `advance` call from `current`.
#[inline]
pub(crate) fn effective_target(target: DocId, current: DocId) -> Option<DocId> {
    current.checked_add(1).map(|next| next.max(target))
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use crate::query::collector::{AllCollector, CountCollector};
    use crate::query::similarity::TfIdfSimilarity;
    use crate::util::bit_set::BitSet;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_advance_equivalent_to_next_loop() {
        let docs = [2, 5, 9, 14];
        for target in 0..=16 {
            let mut advanced = mock(&docs);
            let mut stepped = mock(&docs);
            let expected = loop {
                let doc_id = stepped.next().unwrap();
                if doc_id == 0 || doc_id >= target {
                    break doc_id;
                }
            };
            assert_eq!(advanced.advance(target).unwrap(), expected, "target {target}");
        }
    }

    #[test]
    fn test_advance_always_moves() {
        let mut matcher = mock(&[2, 5, 9, 14]);
        assert_eq!(matcher.advance(5).unwrap(), 5);
        assert_eq!(matcher.advance(5).unwrap(), 9);
        assert_eq!(matcher.advance(1).unwrap(), 14);
        assert_eq!(matcher.advance(1).unwrap(), 0);
        assert_eq!(matcher.next().unwrap(), 0);
    }

    #[test]
    #[should_panic(expected = "not positioned")]
    fn test_score_before_first_move_panics() {
        let matcher = mock(&[1]);
        matcher.score();
    }

    #[test]
    #[should_panic(expected = "not positioned")]
    fn test_score_after_exhaustion_panics() {
        let mut matcher = mock(&[1]);
        matcher.next().unwrap();
        matcher.next().unwrap();
        matcher.score();
    }

    #[test]
    fn test_collect_skips_deletions() {
        let mut matcher = mock(&[1, 2, 3, 4, 5]);
        let mut deletions: Matcher =
            BitVecMatcher::new(Arc::new(BitSet::from_bits(8, [2, 4])), 5).into();
        let mut collector = AllCollector::new();

        matcher.collect(&mut collector, Some(&mut deletions)).unwrap();

        let ids: Vec<_> = collector.match_docs().iter().map(|doc| doc.doc_id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    fn collect_scored(matcher: &mut Matcher, deleted: &[DocId], doc_max: DocId) -> Vec<(DocId, f32)> {
        let mut deletions: Matcher =
            BitVecMatcher::new(Arc::new(BitSet::from_bits(16, deleted.iter().copied())), doc_max)
                .into();
        let mut collector = AllCollector::new();
        matcher.collect(&mut collector, Some(&mut deletions)).unwrap();
        collector
            .match_docs()
            .iter()
            .map(|doc| (doc.doc_id, doc.score))
            .collect()
    }

    #[test]
    fn test_collect_conjunction_skips_deletions() {
        let mut matcher: Matcher = ConjunctionMatcher::new(
            vec![mock(&[1, 2, 3, 4, 5]), mock(&[1, 2, 3, 4, 5, 6])],
            &TfIdfSimilarity::new(),
        )
        .into();
        assert_eq!(
            collect_scored(&mut matcher, &[2, 4], 6),
            vec![(1, 2.0), (3, 2.0), (5, 2.0)]
        );
    }

    #[test]
    fn test_collect_disjunction_skips_deletions() {
        let mut matcher: Matcher = DisjunctionMatcher::new(
            vec![mock(&[1, 2, 4, 6]), mock(&[2, 3, 4, 7])],
            &TfIdfSimilarity::new(),
        )
        .into();
        // Deleted docs 2 and 4 are matched by both children; 6 and 7 by one.
        assert_eq!(
            collect_scored(&mut matcher, &[2, 4, 7], 8),
            vec![(1, 0.5), (3, 0.5), (6, 0.5)]
        );
    }

    #[test]
    fn test_collect_without_deletions() {
        let mut matcher = mock(&[3, 7, 8]);
        let mut collector = CountCollector::new();
        matcher.collect(&mut collector, None).unwrap();
        assert_eq!(collector.count(), 3);
    }

    #[test]
    fn test_collect_deadline() {
        let mut matcher: Matcher = MatchAllMatcher::new(5000, 1.0).into();
        let mut collector = CountCollector::new();
        let deadline = Instant::now() - Duration::from_millis(1);

        let result = matcher.collect_with_deadline(&mut collector, None, Some(deadline));
        assert!(matches!(result, Err(LucerneError::OperationCancelled(_))));
        assert_eq!(collector.count(), DEADLINE_CHECK_INTERVAL as u64 - 1);
    }

    #[test]
    fn test_collect_deadline_not_reached() {
        let mut matcher: Matcher = MatchAllMatcher::new(3000, 1.0).into();
        let mut collector = CountCollector::new();
        let deadline = Instant::now() + Duration::from_secs(3600);

        matcher
            .collect_with_deadline(&mut collector, None, Some(deadline))
            .unwrap();
        assert_eq!(collector.count(), 3000);
    }
}
