//! The searcher interface shared by single-index and composite searchers.

use std::fmt::Debug;
use std::sync::Arc;

use log::debug;

use crate::DocId;
use crate::document::Document;
use crate::error::Result;
use crate::query::collector::Collector;
use crate::query::match_doc::TopDocs;
use crate::query::query::{Compiler, Query};
use crate::query::sort::SortSpec;
use crate::schema::Schema;
use crate::search::hits::Hits;

/// Runs queries over a set of documents.
///
/// Implementors provide collection statistics and the execution of an
/// already compiled query; compilation, paging and the [`Hits`] cursor are
/// built on top. Doc IDs are searcher-wide and start at 1.
pub trait Searcher: Send + Sync + Debug {
    /// Total number of doc IDs, deleted ones included.
    fn doc_max(&self) -> u64;

    /// Number of documents containing `term` in `field`.
    fn doc_freq(&self, field: &str, term: &str) -> u64;

    /// The schema queries are compiled against.
    fn schema(&self) -> &Arc<Schema>;

    /// Load the stored fields of `doc_id`.
    fn fetch_doc(&self, doc_id: DocId) -> Result<Document>;

    /// Feed every live match of `compiler` to `collector`.
    fn collect_compiled(&self, compiler: &dyn Compiler, collector: &mut dyn Collector)
    -> Result<()>;

    /// Rank the live matches of `compiler`, keeping the best `wanted`.
    fn top_docs_compiled(
        &self,
        compiler: &dyn Compiler,
        wanted: usize,
        sort_spec: Option<&SortSpec>,
    ) -> Result<TopDocs>;

    /// Compile and normalize `query` against this searcher.
    fn compile(&self, query: &dyn Query) -> Result<Box<dyn Compiler>>
    where
        Self: Sized,
    {
        let mut compiler = query.make_compiler(self, query.boost())?;
        compiler.normalize();
        debug!("Compiled {} into {}", query.description(), compiler.description());
        Ok(compiler)
    }

    /// Feed every live match of `query` to `collector`.
    fn collect(&self, query: &dyn Query, collector: &mut dyn Collector) -> Result<()>
    where
        Self: Sized,
    {
        let compiler = self.compile(query)?;
        self.collect_compiled(compiler.as_ref(), collector)
    }

    /// The best `wanted` matches of `query`, ranked by `sort_spec` or by
    /// descending score.
    fn top_docs(
        &self,
        query: &dyn Query,
        wanted: usize,
        sort_spec: Option<&SortSpec>,
    ) -> Result<TopDocs>
    where
        Self: Sized,
    {
        let compiler = self.compile(query)?;
        self.top_docs_compiled(compiler.as_ref(), wanted, sort_spec)
    }

    /// One page of matches by descending score: hits `offset..offset + limit`.
    fn search(&self, query: &dyn Query, offset: usize, limit: usize) -> Result<TopDocs>
    where
        Self: Sized,
    {
        let top_docs = self.top_docs(query, offset.saturating_add(limit), None)?;
        Ok(top_docs.skip(offset))
    }

    /// A cursor over one page of hits that loads stored fields on demand.
    fn hits(
        &self,
        query: &dyn Query,
        offset: usize,
        num_wanted: usize,
        sort_spec: Option<&SortSpec>,
    ) -> Result<Hits<'_>>
    where
        Self: Sized,
    {
        let top_docs = self.top_docs(query, offset.saturating_add(num_wanted), sort_spec)?;
        Ok(Hits::new(self, top_docs.skip(offset)))
    }
}
