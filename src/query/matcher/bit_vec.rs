use std::sync::Arc;

use crate::DocId;
use crate::error::Result;
use crate::query::matcher::effective_target;
use crate::util::bit_set::BitSet;

/// Matches the set bits of a shared bit set, up to `doc_max`. Used for
/// deletions and cached filters; every match scores 0.
#[derive(Debug)]
pub struct BitVecMatcher {
    bits: Arc<BitSet>,
    doc_max: DocId,
    doc_id: DocId,
    cost: u64,
    exhausted: bool,
}

impl BitVecMatcher {
    /// Create a matcher over `bits`.
    pub fn new(bits: Arc<BitSet>, doc_max: DocId) -> Self {
        let cost = bits.count() as u64;
        BitVecMatcher {
            bits,
            doc_max,
            doc_id: 0,
            cost,
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
        let found = effective_target(target, self.doc_id)
            .and_then(|target| self.bits.next_set_bit(target))
            .filter(|&doc_id| doc_id <= self.doc_max);

        match found {
            Some(doc_id) => {
                self.doc_id = doc_id;
                Ok(doc_id)
            }
            None => {
                self.exhausted = true;
                self.doc_id = 0;
                Ok(0)
            }
        }
    }

    pub(crate) fn score(&self) -> f32 {
        0.0
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::matcher::Matcher;
    use crate::query::matcher::test_util::drain;

    #[test]
    fn test_iterates_set_bits() {
        let bits = Arc::new(BitSet::from_bits(64, [0, 3, 17, 40]));
        let mut matcher: Matcher = BitVecMatcher::new(bits, 63).into();
        // Bit 0 is never a doc ID.
        assert_eq!(drain(&mut matcher), vec![3, 17, 40]);
    }

    #[test]
    fn test_bounded_by_doc_max() {
        let bits = Arc::new(BitSet::from_bits(64, [3, 17, 40]));
        let mut matcher: Matcher = BitVecMatcher::new(Arc::clone(&bits), 20).into();
        assert_eq!(matcher.advance(4).unwrap(), 17);
        assert_eq!(matcher.next().unwrap(), 0);
        assert_eq!(matcher.cost(), 3);
    }
}
