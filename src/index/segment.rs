//! In-memory segments built from pre-tokenized documents.

use std::sync::Arc;

use ahash::AHashMap;
use log::debug;

use crate::DocId;
use crate::document::Document;
use crate::error::{LucerneError, Result};
use crate::index::posting::{
    EncodedPostings, MemoryPostingList, Posting, PostingList, PostingListConfig,
};
use crate::index::reader::{FieldStats, SegmentReader};
use crate::query::sort::SortValue;
use crate::util::bit_set::BitSet;

/// A read-only segment held entirely in memory.
#[derive(Debug)]
pub struct MemorySegment {
    /// field -> term -> postings
    terms: AHashMap<String, AHashMap<String, Arc<EncodedPostings>>>,
    field_stats: AHashMap<String, FieldStats>,
    /// Stored documents; doc ID `n` lives at index `n - 1`.
    docs: Vec<Document>,
    deletions: Option<Arc<BitSet>>,
}

impl MemorySegment {
    /// Create a builder for a new segment.
    pub fn builder() -> MemorySegmentBuilder {
        MemorySegmentBuilder::new()
    }

    /// Number of distinct terms in `field`.
    pub fn term_count(&self, field: &str) -> usize {
        self.terms.get(field).map(|terms| terms.len()).unwrap_or(0)
    }

    fn doc(&self, doc_id: DocId) -> Result<&Document> {
        doc_id
            .checked_sub(1)
            .and_then(|idx| self.docs.get(idx as usize))
            .ok_or_else(|| {
                LucerneError::not_found(format!(
                    "Doc {doc_id} is outside 1..={}",
                    self.docs.len()
                ))
            })
    }
}

impl SegmentReader for MemorySegment {
    fn doc_max(&self) -> DocId {
        self.docs.len() as DocId
    }

    fn doc_count(&self) -> u64 {
        let deleted = self.deletions.as_ref().map(|bits| bits.count()).unwrap_or(0);
        (self.docs.len() - deleted) as u64
    }

    fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.terms
            .get(field)
            .and_then(|terms| terms.get(term))
            .map(|postings| postings.doc_freq())
            .unwrap_or(0)
    }

    fn posting_list(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingList>>> {
        Ok(self
            .terms
            .get(field)
            .and_then(|terms| terms.get(term))
            .map(|postings| {
                Box::new(MemoryPostingList::new(Arc::clone(postings))) as Box<dyn PostingList>
            }))
    }

    fn deletions(&self) -> Option<Arc<BitSet>> {
        self.deletions.clone()
    }

    fn field_stats(&self, field: &str) -> Option<FieldStats> {
        self.field_stats.get(field).copied()
    }

    fn sort_value(&self, field: &str, doc_id: DocId) -> Result<SortValue> {
        Ok(self
            .doc(doc_id)?
            .get_field(field)
            .map(|value| value.to_sort_value())
            .unwrap_or(SortValue::Null))
    }

    fn fetch_doc(&self, doc_id: DocId) -> Result<Document> {
        self.doc(doc_id).cloned()
    }
}

/// Collects documents and their tokens, then encodes a [`MemorySegment`].
#[derive(Debug, Default)]
pub struct MemorySegmentBuilder {
    config: PostingListConfig,
    /// field -> term -> postings in doc order
    postings: AHashMap<String, AHashMap<String, Vec<Posting>>>,
    field_stats: AHashMap<String, FieldStats>,
    docs: Vec<Document>,
    deleted: Vec<DocId>,
}

impl MemorySegmentBuilder {
    /// Create a builder with the default posting configuration.
    pub fn new() -> Self {
        MemorySegmentBuilder::default()
    }

    /// Use a custom posting configuration.
    pub fn with_config(mut self, config: PostingListConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a document and return its doc ID.
    ///
    /// `fields` pairs each indexed field with its already-analyzed tokens,
    /// separated by whitespace. Token positions are their index in that
    /// sequence.
    pub fn add_document<'a, I>(&mut self, stored: Document, fields: I) -> DocId
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.docs.push(stored);
        let doc_id = self.docs.len() as DocId;

        for (field, tokens) in fields {
            let mut positions: AHashMap<&str, Vec<u32>> = AHashMap::new();
            let mut field_length = 0u32;
            for (position, token) in tokens.split_whitespace().enumerate() {
                positions.entry(token).or_default().push(position as u32);
                field_length += 1;
            }
            if field_length == 0 {
                continue;
            }

            let stats = self.field_stats.entry(field.to_string()).or_default();
            stats.doc_count += 1;
            stats.total_length += field_length as u64;

            let terms = self.postings.entry(field.to_string()).or_default();
            for (term, term_positions) in positions {
                terms
                    .entry(term.to_string())
                    .or_default()
                    .push(Posting::with_positions(doc_id, field_length, term_positions));
            }
        }

        doc_id
    }

    /// Mark a previously added document as deleted.
    pub fn delete_document(&mut self, doc_id: DocId) -> Result<()> {
        if doc_id == 0 || doc_id as usize > self.docs.len() {
            return Err(LucerneError::invalid_argument(format!(
                "Cannot delete unknown doc {doc_id}"
            )));
        }
        self.deleted.push(doc_id);
        Ok(())
    }

    /// Encode all postings and produce the segment.
    pub fn build(self) -> Result<MemorySegment> {
        let mut terms = AHashMap::with_capacity(self.postings.len());
        let mut num_terms = 0usize;
        for (field, field_postings) in self.postings {
            let mut encoded = AHashMap::with_capacity(field_postings.len());
            for (term, postings) in field_postings {
                encoded.insert(
                    term,
                    Arc::new(EncodedPostings::encode(&postings, &self.config)?),
                );
            }
            num_terms += encoded.len();
            terms.insert(field, encoded);
        }

        let deletions = if self.deleted.is_empty() {
            None
        } else {
            let capacity = self.docs.len() + 1;
            Some(Arc::new(BitSet::from_bits(capacity, self.deleted)))
        };

        debug!(
            "Built memory segment: {} docs, {} terms, {} deleted",
            self.docs.len(),
            num_terms,
            deletions.as_ref().map(|bits| bits.count()).unwrap_or(0)
        );

        Ok(MemorySegment {
            terms,
            field_stats: self.field_stats,
            docs: self.docs,
            deletions,
        })
    }
}
