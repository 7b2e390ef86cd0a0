//! Fixed-capacity bit set used for deletions and filters.

use bit_vec::BitVec;

/// A fixed-capacity set of document IDs.
///
/// Capacity is fixed at construction and rounded up to whole bytes, so a set
/// created with capacity 10 occupies two bytes and accepts indices `0..16`.
/// Indexing outside the capacity is a programmer error and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bits: BitVec,
}

impl BitSet {
    /// Create an empty bit set able to hold `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        let bytes = capacity.div_ceil(8);
        BitSet {
            bits: BitVec::from_elem(bytes * 8, false),
        }
    }

    /// Create a bit set with the given bits set.
    pub fn from_bits<I>(capacity: usize, bits: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut set = BitSet::new(capacity);
        for bit in bits {
            set.set(bit);
        }
        set
    }

    /// Number of addressable bits (always a multiple of eight).
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Number of bytes backing the set.
    pub fn byte_len(&self) -> usize {
        self.bits.len() / 8
    }

    /// Set a bit.
    pub fn set(&mut self, bit: u32) {
        self.check(bit);
        self.bits.set(bit as usize, true);
    }

    /// Clear a bit.
    pub fn clear(&mut self, bit: u32) {
        self.check(bit);
        self.bits.set(bit as usize, false);
    }

    /// Check whether a bit is set.
    pub fn get(&self, bit: u32) -> bool {
        self.check(bit);
        self.bits.get(bit as usize).unwrap_or(false)
    }

    /// Count the set bits.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| *bit).count()
    }

    /// The first set bit at or after `from`, if any.
    pub fn next_set_bit(&self, from: u32) -> Option<u32> {
        let len = self.bits.len();
        let mut idx = from as usize;
        if idx >= len {
            return None;
        }

        // Skip empty storage blocks before scanning bits.
        let blocks = self.bits.storage();
        while idx < len {
            let block_idx = idx / 32;
            let offset = idx % 32;
            let block = blocks[block_idx] >> offset;
            if block == 0 {
                idx = (block_idx + 1) * 32;
                continue;
            }
            let found = idx + block.trailing_zeros() as usize;
            return if found < len {
                Some(found as u32)
            } else {
                None
            };
        }
        None
    }

    /// Iterate over all set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let mut next = self.next_set_bit(0);
        std::iter::from_fn(move || {
            let current = next?;
            next = current
                .checked_add(1)
                .and_then(|from| self.next_set_bit(from));
            Some(current)
        })
    }

    /// Raw bytes, most significant bit first within each byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.to_bytes()
    }

    fn check(&self, bit: u32) {
        assert!(
            (bit as usize) < self.bits.len(),
            "bit {bit} out of range for BitSet of capacity {}",
            self.bits.len()
        );
    }
}
