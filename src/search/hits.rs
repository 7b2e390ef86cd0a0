//! Lazy cursor over ranked hits.

use crate::DocId;
use crate::document::Document;
use crate::error::Result;
use crate::query::match_doc::TopDocs;
use crate::search::searcher::Searcher;

/// A hit with its stored fields.
#[derive(Debug, Clone)]
pub struct HitDoc {
    /// Searcher-wide doc ID.
    pub doc_id: DocId,
    /// Relevance score.
    pub score: f32,
    /// Stored fields.
    pub document: Document,
}

/// Walks ranked hits, fetching each document only when it is reached.
#[derive(Debug)]
pub struct Hits<'a> {
    searcher: &'a dyn Searcher,
    top_docs: TopDocs,
    cursor: usize,
}

impl<'a> Hits<'a> {
    /// Create a cursor over `top_docs`, whose doc IDs belong to `searcher`.
    pub fn new(searcher: &'a dyn Searcher, top_docs: TopDocs) -> Self {
        Hits {
            searcher,
            top_docs,
            cursor: 0,
        }
    }

    /// Number of documents that matched, including those outside this page.
    pub fn total_hits(&self) -> u32 {
        self.top_docs.total_hits
    }

    /// Number of hits in this page.
    pub fn len(&self) -> usize {
        self.top_docs.len()
    }

    /// Check if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.top_docs.is_empty()
    }

    /// The underlying ranked hits.
    pub fn top_docs(&self) -> &TopDocs {
        &self.top_docs
    }

    /// Fetch the next hit, or `None` at the end of the page.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<HitDoc>> {
        let Some(match_doc) = self.top_docs.match_docs.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        let document = self.searcher.fetch_doc(match_doc.doc_id)?;
        Ok(Some(HitDoc {
            doc_id: match_doc.doc_id,
            score: match_doc.score,
            document,
        }))
    }
}

impl Iterator for Hits<'_> {
    type Item = Result<HitDoc>;

    fn next(&mut self) -> Option<Self::Item> {
        Hits::next(self).transpose()
    }
}
