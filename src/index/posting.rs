//! Posting lists.
//!
//! A posting list walks the documents containing one term of one field in
//! ascending doc-ID order. [`MemoryPostingList`] is the in-memory
//! implementation: postings are delta-encoded as varints into a single byte
//! buffer, with a skip list every `skip_interval` postings so that
//! [`PostingList::advance`] can jump over long runs.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DocId;
use crate::error::{LucerneError, Result};
use crate::util::varint;

/// A single posting: one document's occurrences of a term.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Posting {
    /// Document ID.
    pub doc_id: DocId,
    /// Term frequency in the document.
    pub freq: u32,
    /// Number of tokens in the field for this document.
    pub field_length: u32,
    /// Positions of the term in the field, ascending.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting from term positions; the frequency is the number of
    /// positions.
    pub fn with_positions(doc_id: DocId, field_length: u32, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            freq: positions.len() as u32,
            field_length,
            positions,
        }
    }
}

/// A per-term, per-segment cursor over postings.
///
/// Follows the same positioning contract as
/// [`Matcher`](crate::query::matcher::Matcher): `0` means exhausted and stays
/// exhausted, and `advance` always moves forward at least one posting.
pub trait PostingList: Send + Debug {
    /// Move to the next posting, returning its doc ID or `0` when exhausted.
    fn next(&mut self) -> Result<DocId>;

    /// Move to the first posting whose doc ID is at least `target`.
    fn advance(&mut self, target: DocId) -> Result<DocId>;

    /// Doc ID of the current posting, `0` before the first move.
    fn doc_id(&self) -> DocId;

    /// The current posting. Only meaningful while positioned.
    fn posting(&self) -> &Posting;

    /// Number of documents in the list.
    fn doc_freq(&self) -> u64;
}

/// Configuration for in-memory posting lists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostingListConfig {
    /// Number of postings between skip entries.
    pub skip_interval: usize,
}

impl Default for PostingListConfig {
    fn default() -> Self {
        PostingListConfig { skip_interval: 16 }
    }
}

impl PostingListConfig {
    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.skip_interval == 0 {
            return Err(LucerneError::invalid_config(
                "skip_interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Entry point into the middle of an encoded posting buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SkipEntry {
    /// Doc ID of the posting just before `offset`; the delta base there.
    last_doc_id: DocId,
    /// Byte offset of the next posting.
    offset: usize,
    /// Number of postings before `offset`.
    ordinal: u64,
}

/// Immutable, shareable encoding of one term's postings.
#[derive(Debug, Clone, Default)]
pub struct EncodedPostings {
    bytes: Vec<u8>,
    skips: Vec<SkipEntry>,
    doc_freq: u64,
}

impl EncodedPostings {
    /// Encode postings, which must be in strictly ascending doc-ID order
    /// starting above zero.
    ///
    /// Layout per posting: doc delta, freq, field length, position count,
    /// then position deltas, all as varints.
    pub fn encode(postings: &[Posting], config: &PostingListConfig) -> Result<Self> {
        config.validate()?;

        let mut bytes = Vec::new();
        let mut skips = Vec::new();
        let mut last_doc_id: DocId = 0;

        for (ordinal, posting) in postings.iter().enumerate() {
            if posting.doc_id <= last_doc_id {
                return Err(LucerneError::index(format!(
                    "Postings out of order: {} after {}",
                    posting.doc_id, last_doc_id
                )));
            }

            if ordinal > 0 && ordinal % config.skip_interval == 0 {
                skips.push(SkipEntry {
                    last_doc_id,
                    offset: bytes.len(),
                    ordinal: ordinal as u64,
                });
            }

            varint::encode_u32(posting.doc_id - last_doc_id, &mut bytes);
            varint::encode_u32(posting.freq, &mut bytes);
            varint::encode_u32(posting.field_length, &mut bytes);
            varint::encode_u32(posting.positions.len() as u32, &mut bytes);

            let mut last_position = 0u32;
            for (i, &position) in posting.positions.iter().enumerate() {
                if i > 0 && position <= last_position {
                    return Err(LucerneError::index(format!(
                        "Positions out of order in doc {}",
                        posting.doc_id
                    )));
                }
                varint::encode_u32(position - last_position, &mut bytes);
                last_position = position;
            }

            last_doc_id = posting.doc_id;
        }

        Ok(EncodedPostings {
            bytes,
            skips,
            doc_freq: postings.len() as u64,
        })
    }

    /// Wrap raw bytes produced elsewhere. No skip data is available, and
    /// corrupt bytes surface as errors during iteration.
    pub fn from_raw(bytes: Vec<u8>, doc_freq: u64) -> Self {
        EncodedPostings {
            bytes,
            skips: Vec::new(),
            doc_freq,
        }
    }

    /// Number of postings encoded.
    pub fn doc_freq(&self) -> u64 {
        self.doc_freq
    }

    /// Size of the encoded buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of skip entries.
    pub fn skip_count(&self) -> usize {
        self.skips.len()
    }
}

/// Cursor over [`EncodedPostings`].
#[derive(Debug)]
pub struct MemoryPostingList {
    data: Arc<EncodedPostings>,
    /// Byte offset of the next undecoded posting.
    pos: usize,
    /// Number of postings decoded so far.
    ordinal: u64,
    posting: Posting,
    exhausted: bool,
}

impl MemoryPostingList {
    /// Create a cursor positioned before the first posting.
    pub fn new(data: Arc<EncodedPostings>) -> Self {
        MemoryPostingList {
            data,
            pos: 0,
            ordinal: 0,
            posting: Posting::default(),
            exhausted: false,
        }
    }

    fn exhaust(&mut self) -> DocId {
        self.exhausted = true;
        self.posting.doc_id = 0;
        0
    }

    fn decode_next(&mut self) -> Result<DocId> {
        if self.ordinal >= self.data.doc_freq {
            return Ok(self.exhaust());
        }

        let bytes = &self.data.bytes;
        let pos = &mut self.pos;

        let delta = varint::decode_u32(bytes, pos)?;
        if delta == 0 {
            return Err(LucerneError::index("Zero doc delta in posting list"));
        }
        let doc_id = self
            .posting
            .doc_id
            .checked_add(delta)
            .ok_or_else(|| LucerneError::index("Doc ID overflow in posting list"))?;
        let freq = varint::decode_u32(bytes, pos)?;
        let field_length = varint::decode_u32(bytes, pos)?;
        let num_positions = varint::decode_u32(bytes, pos)?;

        self.posting.positions.clear();
        let mut position = 0u32;
        for _ in 0..num_positions {
            position = position
                .checked_add(varint::decode_u32(bytes, pos)?)
                .ok_or_else(|| LucerneError::index("Position overflow in posting list"))?;
            self.posting.positions.push(position);
        }

        self.posting.doc_id = doc_id;
        self.posting.freq = freq;
        self.posting.field_length = field_length;
        self.ordinal += 1;

        Ok(doc_id)
    }

    /// Jump to the last skip entry that still lies before `target`.
    fn skip_towards(&mut self, target: DocId) {
        let skips = &self.data.skips;
        let idx = skips.partition_point(|entry| entry.last_doc_id < target);
        if idx == 0 {
            return;
        }
        let entry = skips[idx - 1];
        if entry.offset > self.pos {
            self.pos = entry.offset;
            self.ordinal = entry.ordinal;
            self.posting.doc_id = entry.last_doc_id;
        }
    }
}

impl PostingList for MemoryPostingList {
    fn next(&mut self) -> Result<DocId> {
        if self.exhausted {
            return Ok(0);
        }
        self.decode_next()
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(0);
        }
        let target = target.max(self.posting.doc_id.saturating_add(1));
        self.skip_towards(target);

        loop {
            let doc_id = self.decode_next()?;
            if doc_id == 0 || doc_id >= target {
                return Ok(doc_id);
            }
        }
    }

    fn doc_id(&self) -> DocId {
        self.posting.doc_id
    }

    fn posting(&self) -> &Posting {
        &self.posting
    }

    fn doc_freq(&self) -> u64 {
        self.data.doc_freq
    }
}
