//! Searcher over the segments of one index.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::DocId;
use crate::document::Document;
use crate::error::{LucerneError, Result};
use crate::index::reader::SegmentReader;
use crate::query::collector::{Collector, TopCollector};
use crate::query::hit_queue::merge_top_docs;
use crate::query::match_doc::TopDocs;
use crate::query::matcher::{BitVecMatcher, Matcher};
use crate::query::query::Compiler;
use crate::query::sort::SortSpec;
use crate::schema::Schema;
use crate::search::SearcherConfig;
use crate::search::searcher::Searcher;

/// Searches a fixed list of segments.
///
/// Segment `i` owns the searcher-wide doc IDs `starts[i] + 1 ..= starts[i] +
/// doc_max_i`.
#[derive(Debug)]
pub struct IndexSearcher {
    segments: Vec<Arc<dyn SegmentReader>>,
    /// Doc-ID base of each segment.
    starts: Vec<DocId>,
    doc_max: u64,
    schema: Arc<Schema>,
    config: SearcherConfig,
}

impl IndexSearcher {
    /// Create a sequential searcher with the default configuration.
    ///
    /// Fails if the segments hold more doc IDs than fit in a [`DocId`].
    pub fn new(segments: Vec<Arc<dyn SegmentReader>>, schema: Arc<Schema>) -> Result<Self> {
        let mut starts = Vec::with_capacity(segments.len());
        let mut doc_max = 0u64;
        for segment in &segments {
            starts.push(DocId::try_from(doc_max).map_err(|_| out_of_range(doc_max))?);
            doc_max += segment.doc_max() as u64;
        }
        if doc_max > DocId::MAX as u64 {
            return Err(out_of_range(doc_max));
        }
        Ok(IndexSearcher {
            segments,
            starts,
            doc_max,
            schema,
            config: SearcherConfig::default(),
        })
    }

    /// Create a searcher with a custom configuration.
    ///
    /// Fails if the segments hold more doc IDs than fit in a [`DocId`], or
    /// if the configured similarity is invalid.
    pub fn with_config(
        segments: Vec<Arc<dyn SegmentReader>>,
        schema: Arc<Schema>,
        config: SearcherConfig,
    ) -> Result<Self> {
        let schema = match &config.default_similarity {
            Some(similarity) => {
                let mut schema = Schema::clone(&schema);
                schema.set_default_similarity(similarity.build()?);
                Arc::new(schema)
            }
            None => schema,
        };

        let mut searcher = IndexSearcher::new(segments, schema)?;
        searcher.config = config;
        debug!(
            "IndexSearcher over {} segments, {} docs, parallel={}",
            searcher.segments.len(),
            searcher.doc_max,
            searcher.config.parallel
        );
        Ok(searcher)
    }

    /// The segments, in doc-ID order.
    pub fn segments(&self) -> &[Arc<dyn SegmentReader>] {
        &self.segments
    }

    /// The doc-ID base of each segment.
    pub fn starts(&self) -> &[DocId] {
        &self.starts
    }

    /// The active configuration.
    pub fn config(&self) -> &SearcherConfig {
        &self.config
    }

    /// Number of live documents across all segments.
    pub fn doc_count(&self) -> u64 {
        self.segments.iter().map(|segment| segment.doc_count()).sum()
    }

    /// Run one segment's matcher tree into `collector`, skipping deletions.
    fn collect_segment(
        &self,
        idx: usize,
        compiler: &dyn Compiler,
        collector: &mut dyn Collector,
        deadline: Option<Instant>,
    ) -> Result<()> {
        let segment = &self.segments[idx];
        collector.set_segment(Arc::clone(segment), self.starts[idx])?;

        let Some(mut matcher) = compiler.make_matcher(segment, collector.need_score())? else {
            trace!("Segment {idx}: no matcher");
            return Ok(());
        };
        let mut deletions: Option<Matcher> = segment
            .deletions()
            .map(|bits| BitVecMatcher::new(bits, segment.doc_max()).into());

        trace!(
            "Segment {idx}: {} matcher, cost {}, base {}",
            matcher.name(),
            matcher.cost(),
            self.starts[idx]
        );
        matcher.collect_with_deadline(collector, deletions.as_mut(), deadline)
    }

    /// Segment index holding `doc_id`.
    fn segment_of(&self, doc_id: DocId) -> Option<usize> {
        if doc_id == 0 || doc_id as u64 > self.doc_max {
            return None;
        }
        let idx = self.starts.partition_point(|&start| start < doc_id);
        idx.checked_sub(1)
    }
}

impl Searcher for IndexSearcher {
    fn doc_max(&self) -> u64 {
        self.doc_max
    }

    fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.segments
            .iter()
            .map(|segment| segment.doc_freq(field, term))
            .sum()
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn fetch_doc(&self, doc_id: DocId) -> Result<Document> {
        let idx = self.segment_of(doc_id).ok_or_else(|| {
            LucerneError::not_found(format!("Doc {doc_id} is outside 1..={}", self.doc_max))
        })?;
        self.segments[idx].fetch_doc(doc_id - self.starts[idx])
    }

    fn collect_compiled(
        &self,
        compiler: &dyn Compiler,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let deadline = self.config.deadline();
        for idx in 0..self.segments.len() {
            self.collect_segment(idx, compiler, collector, deadline)?;
        }
        Ok(())
    }

    fn top_docs_compiled(
        &self,
        compiler: &dyn Compiler,
        wanted: usize,
        sort_spec: Option<&SortSpec>,
    ) -> Result<TopDocs> {
        let max_wanted = usize::try_from(self.doc_max).unwrap_or(usize::MAX);
        if wanted > max_wanted {
            debug!("Clamping {wanted} wanted hits to {max_wanted} docs");
        }
        let wanted = wanted.min(max_wanted);
        let deadline = self.config.deadline();

        let top_docs = if self.config.parallel && self.segments.len() > 1 {
            let parts = (0..self.segments.len())
                .into_par_iter()
                .map(|idx| -> Result<TopDocs> {
                    let mut collector =
                        TopCollector::new(&self.schema, sort_spec.cloned(), wanted)?;
                    self.collect_segment(idx, compiler, &mut collector, deadline)?;
                    Ok(collector.into_top_docs())
                })
                .collect::<Result<Vec<_>>>()?;
            merge_top_docs(parts, sort_spec, wanted)
        } else {
            let mut collector = TopCollector::new(&self.schema, sort_spec.cloned(), wanted)?;
            self.collect_compiled(compiler, &mut collector)?;
            collector.into_top_docs()
        };

        if top_docs.total_hits as u64 > self.doc_max {
            warn!(
                "{} hits reported for {} doc IDs",
                top_docs.total_hits, self.doc_max
            );
        }
        debug!(
            "Search returned {} of {} hits",
            top_docs.len(),
            top_docs.total_hits
        );
        Ok(top_docs)
    }
}

fn out_of_range(doc_max: u64) -> LucerneError {
    LucerneError::invalid_argument(format!("{doc_max} doc IDs exceed the doc ID range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldValue;
    use crate::index::segment::MemorySegment;
    use crate::query::collector::CountCollector;
    use crate::query::match_all::MatchAllQuery;
    use crate::query::similarity::SimilarityConfig;
    use crate::query::sort::SortRule;
    use crate::query::term::TermQuery;

    /// Two segments: "a" in docs 1, 3 (local 1, 3) and 5 (local 2 of the
    /// second segment); doc 2 is deleted.
    fn segments() -> Vec<Arc<dyn SegmentReader>> {
        let mut first = MemorySegment::builder();
        for (rank, text) in [(3, "a b"), (1, "a"), (2, "a a c")] {
            first.add_document(
                Document::builder()
                    .add_text("body", text)
                    .add_integer("rank", rank)
                    .build(),
                [("body", text)],
            );
        }
        first.delete_document(2).unwrap();

        let mut second = MemorySegment::builder();
        for (rank, text) in [(5, "c"), (4, "a c")] {
            second.add_document(
                Document::builder()
                    .add_text("body", text)
                    .add_integer("rank", rank)
                    .build(),
                [("body", text)],
            );
        }

        let first: Arc<dyn SegmentReader> = Arc::new(first.build().unwrap());
        let second: Arc<dyn SegmentReader> = Arc::new(second.build().unwrap());
        vec![first, second]
    }

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder()
                .add_text_field("body")
                .add_sortable_field("rank")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_statistics() {
        let searcher = IndexSearcher::new(segments(), schema()).unwrap();
        assert_eq!(searcher.doc_max(), 5);
        assert_eq!(searcher.doc_count(), 4);
        assert_eq!(searcher.doc_freq("body", "a"), 4);
        assert_eq!(searcher.starts(), &[0, 3]);
    }

    #[test]
    fn test_top_docs_skips_deletions() {
        let searcher = IndexSearcher::new(segments(), schema()).unwrap();
        let top_docs = searcher
            .top_docs(&TermQuery::new("body", "a"), 10, None)
            .unwrap();
        let mut ids = top_docs.doc_ids();
        ids.sort();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(top_docs.total_hits, 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = IndexSearcher::new(segments(), schema()).unwrap();
        let parallel = IndexSearcher::with_config(
            segments(),
            schema(),
            SearcherConfig::default().parallel(true),
        )
        .unwrap();

        let query = TermQuery::new("body", "a");
        for wanted in [1, 2, 10] {
            let a = sequential.top_docs(&query, wanted, None).unwrap();
            let b = parallel.top_docs(&query, wanted, None).unwrap();
            assert_eq!(a, b, "wanted {wanted}");
        }
    }

    #[test]
    fn test_sort_by_field() {
        let searcher = IndexSearcher::new(segments(), schema()).unwrap();
        let spec = SortSpec::new(vec![SortRule::field("rank").reversed()]).unwrap();
        let top_docs = searcher
            .top_docs(&MatchAllQuery::new(), 10, Some(&spec))
            .unwrap();
        // Ranks: doc 1 -> 3, doc 3 -> 2, doc 4 -> 5, doc 5 -> 4.
        assert_eq!(top_docs.doc_ids(), vec![4, 5, 1, 3]);
    }

    #[test]
    fn test_unsortable_field() {
        let searcher = IndexSearcher::new(segments(), schema()).unwrap();
        let spec = SortSpec::new(vec![SortRule::field("body")]).unwrap();
        assert!(
            searcher
                .top_docs(&MatchAllQuery::new(), 10, Some(&spec))
                .is_err()
        );
    }

    #[test]
    fn test_collect_and_fetch() {
        let searcher = IndexSearcher::new(segments(), schema()).unwrap();
        let mut collector = CountCollector::new();
        searcher
            .collect(&TermQuery::new("body", "c"), &mut collector)
            .unwrap();
        assert_eq!(collector.count(), 3);

        let doc = searcher.fetch_doc(5).unwrap();
        assert_eq!(doc.get_field("rank"), Some(&FieldValue::Integer(4)));
        assert!(searcher.fetch_doc(0).is_err());
        assert!(searcher.fetch_doc(6).is_err());
    }

    #[test]
    fn test_search_pages() {
        let searcher = IndexSearcher::new(segments(), schema()).unwrap();
        let query = MatchAllQuery::new();
        let first = searcher.search(&query, 0, 2).unwrap();
        let second = searcher.search(&query, 2, 2).unwrap();
        assert_eq!(first.doc_ids(), vec![1, 3]);
        assert_eq!(second.doc_ids(), vec![4, 5]);
        assert_eq!(second.total_hits, 4);
        assert!(searcher.search(&query, 10, 2).unwrap().is_empty());
    }

    #[test]
    fn test_similarity_override() {
        let searcher = IndexSearcher::with_config(
            segments(),
            schema(),
            SearcherConfig::default().default_similarity(SimilarityConfig::Bm25 { k1: 1.2, b: 0.75 }),
        )
        .unwrap();
        assert_eq!(searcher.schema().similarity("body").name(), "bm25");

        let invalid = IndexSearcher::with_config(
            segments(),
            schema(),
            SearcherConfig::default().default_similarity(SimilarityConfig::Bm25 { k1: -1.0, b: 0.75 }),
        );
        assert!(invalid.is_err());
    }

    #[test]
    fn test_deadline_not_hit() {
        let searcher = IndexSearcher::with_config(
            segments(),
            schema(),
            SearcherConfig::default().deadline_ms(60_000),
        )
        .unwrap();
        let top_docs = searcher.top_docs(&MatchAllQuery::new(), 10, None).unwrap();
        assert_eq!(top_docs.total_hits, 4);
    }

    /// A segment claiming every doc ID, with no postings.
    #[derive(Debug)]
    struct FullSegment;

    impl SegmentReader for FullSegment {
        fn doc_max(&self) -> DocId {
            DocId::MAX
        }

        fn doc_count(&self) -> u64 {
            DocId::MAX as u64
        }

        fn doc_freq(&self, _field: &str, _term: &str) -> u64 {
            0
        }

        fn posting_list(
            &self,
            _field: &str,
            _term: &str,
        ) -> Result<Option<Box<dyn crate::index::posting::PostingList>>> {
            Ok(None)
        }

        fn deletions(&self) -> Option<Arc<crate::util::bit_set::BitSet>> {
            None
        }

        fn field_stats(&self, _field: &str) -> Option<crate::index::reader::FieldStats> {
            None
        }

        fn sort_value(&self, _field: &str, _doc_id: DocId) -> Result<crate::query::sort::SortValue> {
            Ok(crate::query::sort::SortValue::Null)
        }

        fn fetch_doc(&self, doc_id: DocId) -> Result<Document> {
            Err(LucerneError::not_found(format!("Doc {doc_id}")))
        }
    }

    #[test]
    fn test_doc_id_overflow_rejected() {
        let full: Arc<dyn SegmentReader> = Arc::new(FullSegment);
        assert!(IndexSearcher::new(vec![Arc::clone(&full)], schema()).is_ok());

        let result = IndexSearcher::new(vec![Arc::clone(&full), full], schema());
        assert!(matches!(result, Err(LucerneError::Other(_))));

        let mut small = segments();
        small.push(Arc::new(FullSegment));
        assert!(IndexSearcher::new(small, schema()).is_err());
    }
}
