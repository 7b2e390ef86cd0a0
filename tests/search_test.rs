//! End-to-end searches over in-memory segments.

use std::sync::Arc;

use lucerne::DocId;
use lucerne::document::{Document, FieldValue};
use lucerne::error::{LucerneError, Result};
use lucerne::index::{MemorySegment, SegmentReader};
use lucerne::query::{
    BooleanQuery, CountCollector, MatchAllQuery, PhraseQuery, RangeQuery, SimilarityConfig,
    SortRule, SortSpec, SortValue, TermQuery,
};
use lucerne::schema::Schema;
use lucerne::search::{IndexSearcher, PolySearcher, Searcher, SearcherConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// (title, tags, year)
const BOOKS: &[(&str, &str, i64)] = &[
    ("python programming", "python beginner", 2019),
    ("javascript web development", "javascript web", 2021),
    ("cooking with python", "python recipes", 2015),
    ("advanced python programming", "python advanced", 2023),
    ("rust programming language", "rust systems", 2022),
];

fn segment(books: &[(&str, &str, i64)], deleted: &[DocId]) -> Arc<dyn SegmentReader> {
    let mut builder = MemorySegment::builder();
    for (title, tags, year) in books {
        builder.add_document(
            Document::builder()
                .add_text("title", *title)
                .add_text("tags", *tags)
                .add_integer("year", *year)
                .build(),
            [("title", *title), ("tags", *tags)],
        );
    }
    for &doc_id in deleted {
        builder.delete_document(doc_id).unwrap();
    }
    Arc::new(builder.build().unwrap())
}

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::builder()
            .add_text_field("title")
            .add_text_field("tags")
            .add_sortable_field("year")
            .build()
            .unwrap(),
    )
}

fn sorted_ids(mut ids: Vec<DocId>) -> Vec<DocId> {
    ids.sort_unstable();
    ids
}

#[test]
fn test_boolean_must_not() -> Result<()> {
    init_logger();
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[])], schema())?;

    let query = BooleanQuery::builder()
        .must(Box::new(TermQuery::new("tags", "python")))
        .must_not(Box::new(TermQuery::new("title", "cooking")))
        .build();
    let top_docs = searcher.top_docs(&query, 10, None)?;
    assert_eq!(sorted_ids(top_docs.doc_ids()), vec![1, 4]);
    assert_eq!(top_docs.total_hits, 2);

    let query = BooleanQuery::builder()
        .must_not(Box::new(TermQuery::new("tags", "python")))
        .build();
    let top_docs = searcher.top_docs(&query, 10, None)?;
    assert_eq!(top_docs.doc_ids(), vec![2, 5]);
    Ok(())
}

#[test]
fn test_boolean_should_ranks_overlap_first() -> Result<()> {
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[])], schema())?;
    let query = BooleanQuery::builder()
        .should(Box::new(TermQuery::new("title", "python")))
        .should(Box::new(TermQuery::new("title", "programming")))
        .build();
    let top_docs = searcher.top_docs(&query, 10, None)?;
    assert_eq!(top_docs.total_hits, 4);
    // Docs 1 and 4 match both clauses; the shorter title wins.
    assert_eq!(&top_docs.doc_ids()[..2], &[1, 4]);
    Ok(())
}

#[test]
fn test_phrase() -> Result<()> {
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[])], schema())?;
    let query = PhraseQuery::from_phrase("title", "python programming");
    let top_docs = searcher.top_docs(&query, 10, None)?;
    assert_eq!(sorted_ids(top_docs.doc_ids()), vec![1, 4]);

    let query = PhraseQuery::from_phrase("title", "programming python");
    assert!(searcher.top_docs(&query, 10, None)?.is_empty());
    Ok(())
}

#[test]
fn test_deleted_documents_never_returned() -> Result<()> {
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[1, 4])], schema())?;
    let top_docs = searcher.top_docs(&TermQuery::new("tags", "python"), 10, None)?;
    assert_eq!(top_docs.doc_ids(), vec![3]);
    assert_eq!(top_docs.total_hits, 1);

    let mut collector = CountCollector::new();
    searcher.collect(&MatchAllQuery::new(), &mut collector)?;
    assert_eq!(collector.count(), 3);
    Ok(())
}

#[test]
fn test_sort_by_year() -> Result<()> {
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[])], schema())?;
    let query = TermQuery::new("title", "programming");

    let newest = SortSpec::new(vec![SortRule::field("year").reversed()])?;
    let top_docs = searcher.top_docs(&query, 10, Some(&newest))?;
    assert_eq!(top_docs.doc_ids(), vec![4, 5, 1]);

    let oldest = SortSpec::new(vec![SortRule::field("year")])?;
    let top_docs = searcher.top_docs(&query, 2, Some(&oldest))?;
    assert_eq!(top_docs.doc_ids(), vec![1, 5]);
    assert_eq!(top_docs.total_hits, 3);

    let by_doc = SortSpec::new(vec![SortRule::doc_id().reversed()])?;
    let top_docs = searcher.top_docs(&query, 10, Some(&by_doc))?;
    assert_eq!(top_docs.doc_ids(), vec![5, 4, 1]);
    Ok(())
}

#[test]
fn test_range_filter_across_segments() -> Result<()> {
    let searcher = IndexSearcher::new(
        vec![segment(&BOOKS[..2], &[]), segment(&BOOKS[2..], &[3])],
        schema(),
    )?;
    let recent = || RangeQuery::between("year", SortValue::Integer(2019), SortValue::Integer(2022));

    let top_docs = searcher.top_docs(&recent()?, 10, None)?;
    assert_eq!(sorted_ids(top_docs.doc_ids()), vec![1, 2]);

    let query = BooleanQuery::builder()
        .must(Box::new(TermQuery::new("tags", "python")))
        .must(Box::new(RangeQuery::at_least("year", SortValue::Integer(2016))?))
        .build();
    let newest = SortSpec::new(vec![SortRule::field("year").reversed()])?;
    let top_docs = searcher.top_docs(&query, 10, Some(&newest))?;
    assert_eq!(top_docs.doc_ids(), vec![4, 1]);
    Ok(())
}

#[test]
fn test_sort_errors() {
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[])], schema()).unwrap();
    let spec = SortSpec::new(vec![SortRule::field("title")]).unwrap();
    let result = searcher.top_docs(&MatchAllQuery::new(), 10, Some(&spec));
    assert!(result.is_err());

    assert!(SortSpec::new(Vec::new()).is_err());
}

#[test]
fn test_hits_paging() -> Result<()> {
    let searcher = IndexSearcher::new(vec![segment(BOOKS, &[])], schema())?;
    let spec = SortSpec::new(vec![SortRule::field("year")])?;

    let mut hits = searcher.hits(&MatchAllQuery::new(), 1, 2, Some(&spec))?;
    assert_eq!(hits.total_hits(), 5);
    assert_eq!(hits.len(), 2);

    let first = hits.next()?.expect("first hit");
    assert_eq!(first.doc_id, 1);
    assert_eq!(first.document.get_field("year"), Some(&FieldValue::Integer(2019)));
    let second = hits.next()?.expect("second hit");
    assert_eq!(second.doc_id, 2);
    assert!(hits.next()?.is_none());

    let years: Vec<i64> = searcher
        .hits(&MatchAllQuery::new(), 0, 10, Some(&spec))?
        .map(|hit| {
            hit.map(|hit| {
                hit.document
                    .get_field("year")
                    .and_then(|value| value.as_integer())
                    .unwrap_or_default()
            })
        })
        .collect::<Result<_>>()?;
    assert_eq!(years, vec![2015, 2019, 2021, 2022, 2023]);
    Ok(())
}

#[test]
fn test_multi_segment_and_poly_agree() -> Result<()> {
    let single = IndexSearcher::new(vec![segment(BOOKS, &[])], schema())?;
    let split = IndexSearcher::new(
        vec![segment(&BOOKS[..2], &[]), segment(&BOOKS[2..], &[])],
        schema(),
    )?;
    let a: Arc<dyn Searcher> =
        Arc::new(IndexSearcher::new(vec![segment(&BOOKS[..3], &[])], schema())?);
    let b: Arc<dyn Searcher> =
        Arc::new(IndexSearcher::new(vec![segment(&BOOKS[3..], &[])], schema())?);
    let poly = PolySearcher::new(vec![a, b], schema())?;

    let query = BooleanQuery::builder()
        .should(Box::new(TermQuery::new("title", "python")))
        .should(Box::new(TermQuery::new("tags", "rust")))
        .build();
    let expected = single.top_docs(&query, 3, None)?;
    assert_eq!(split.top_docs(&query, 3, None)?.doc_ids(), expected.doc_ids());
    assert_eq!(poly.top_docs(&query, 3, None)?.doc_ids(), expected.doc_ids());
    assert_eq!(poly.top_docs(&query, 3, None)?.total_hits, expected.total_hits);

    let doc = poly.fetch_doc(5)?;
    assert_eq!(
        doc.get_field("title"),
        Some(&FieldValue::Text("rust programming language".to_string()))
    );
    Ok(())
}

#[test]
fn test_parallel_search() -> Result<()> {
    let segments = vec![
        segment(&BOOKS[..2], &[]),
        segment(&BOOKS[2..4], &[1]),
        segment(&BOOKS[4..], &[]),
    ];
    let sequential = IndexSearcher::new(segments.clone(), schema())?;
    let parallel = IndexSearcher::with_config(
        segments,
        schema(),
        SearcherConfig::default().parallel(true),
    )?;

    let query = TermQuery::new("title", "programming");
    assert_eq!(
        parallel.top_docs(&query, 10, None)?,
        sequential.top_docs(&query, 10, None)?
    );
    Ok(())
}

#[test]
fn test_bm25_from_config() -> Result<()> {
    let config = SearcherConfig::from_json(r#"{"default_similarity": {"type": "bm25", "k1": 1.2, "b": 0.75}}"#)?;
    let searcher = IndexSearcher::with_config(vec![segment(BOOKS, &[])], schema(), config)?;
    let top_docs = searcher.top_docs(&TermQuery::new("title", "python"), 10, None)?;
    assert_eq!(top_docs.total_hits, 3);
    assert!(top_docs.match_docs.iter().all(|doc| doc.score > 0.0));
    // Shortest title first under length normalization.
    assert_eq!(top_docs.doc_ids()[0], 1);
    Ok(())
}

#[test]
fn test_deadline_cancels_search() {
    let texts: Vec<String> = (0..3000).map(|i| format!("word{}", i % 10)).collect();
    let mut builder = MemorySegment::builder();
    for text in &texts {
        builder.add_document(Document::new(), [("body", text.as_str())]);
    }
    let segment: Arc<dyn SegmentReader> = Arc::new(builder.build().unwrap());
    let searcher = IndexSearcher::with_config(
        vec![segment],
        Arc::new(Schema::new()),
        SearcherConfig::default().deadline_ms(0),
    )
    .unwrap();

    let result = searcher.top_docs(&MatchAllQuery::new(), 10, None);
    assert!(matches!(result, Err(LucerneError::OperationCancelled(_))));
}

#[test]
fn test_similarity_config_errors() {
    let result = IndexSearcher::with_config(
        vec![segment(BOOKS, &[])],
        schema(),
        SearcherConfig::default().default_similarity(SimilarityConfig::Bm25 { k1: 1.2, b: 2.0 }),
    );
    assert!(result.is_err());
}
