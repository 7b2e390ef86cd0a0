//! A searcher over several searchers.

use std::sync::Arc;

use log::debug;

use crate::DocId;
use crate::document::Document;
use crate::error::{LucerneError, Result};
use crate::query::collector::{Collector, OffsetCollector};
use crate::query::hit_queue::merge_top_docs;
use crate::query::match_doc::TopDocs;
use crate::query::query::Compiler;
use crate::query::sort::SortSpec;
use crate::schema::Schema;
use crate::search::searcher::Searcher;

/// Presents several searchers as one.
///
/// Queries are compiled once against the combined statistics, so scores are
/// comparable across sub-searchers. Sub-searcher `i` owns the doc IDs
/// `starts[i] + 1 ..= starts[i] + doc_max_i`.
#[derive(Debug)]
pub struct PolySearcher {
    searchers: Vec<Arc<dyn Searcher>>,
    starts: Vec<DocId>,
    doc_max: u64,
    schema: Arc<Schema>,
}

impl PolySearcher {
    /// Combine `searchers`, compiling queries against `schema`.
    pub fn new(searchers: Vec<Arc<dyn Searcher>>, schema: Arc<Schema>) -> Result<Self> {
        let mut starts = Vec::with_capacity(searchers.len());
        let mut doc_max = 0u64;
        for searcher in &searchers {
            starts.push(DocId::try_from(doc_max).map_err(|_| {
                LucerneError::invalid_argument(format!("{doc_max} doc IDs exceed the doc ID range"))
            })?);
            doc_max += searcher.doc_max();
        }
        if doc_max > DocId::MAX as u64 {
            return Err(LucerneError::invalid_argument(format!(
                "{doc_max} doc IDs exceed the doc ID range"
            )));
        }
        debug!(
            "PolySearcher over {} searchers, {} docs",
            searchers.len(),
            doc_max
        );
        Ok(PolySearcher {
            searchers,
            starts,
            doc_max,
            schema,
        })
    }

    /// The doc-ID base of each sub-searcher.
    pub fn starts(&self) -> &[DocId] {
        &self.starts
    }

    fn searcher_of(&self, doc_id: DocId) -> Option<usize> {
        if doc_id == 0 || doc_id as u64 > self.doc_max {
            return None;
        }
        self.starts
            .partition_point(|&start| start < doc_id)
            .checked_sub(1)
    }
}

impl Searcher for PolySearcher {
    fn doc_max(&self) -> u64 {
        self.doc_max
    }

    fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.searchers
            .iter()
            .map(|searcher| searcher.doc_freq(field, term))
            .sum()
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn fetch_doc(&self, doc_id: DocId) -> Result<Document> {
        let idx = self.searcher_of(doc_id).ok_or_else(|| {
            LucerneError::not_found(format!("Doc {doc_id} is outside 1..={}", self.doc_max))
        })?;
        self.searchers[idx].fetch_doc(doc_id - self.starts[idx])
    }

    fn collect_compiled(
        &self,
        compiler: &dyn Compiler,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        for (searcher, &start) in self.searchers.iter().zip(&self.starts) {
            let mut offset = OffsetCollector::new(&mut *collector, start);
            searcher.collect_compiled(compiler, &mut offset)?;
        }
        Ok(())
    }

    fn top_docs_compiled(
        &self,
        compiler: &dyn Compiler,
        wanted: usize,
        sort_spec: Option<&SortSpec>,
    ) -> Result<TopDocs> {
        let mut parts = Vec::with_capacity(self.searchers.len());
        for (searcher, &start) in self.searchers.iter().zip(&self.starts) {
            let mut part = searcher.top_docs_compiled(compiler, wanted, sort_spec)?;
            for match_doc in &mut part.match_docs {
                match_doc.doc_id += start;
            }
            parts.push(part);
        }
        Ok(merge_top_docs(parts, sort_spec, wanted))
    }
}
