//! Criterion benchmarks for query execution.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lucerne::document::Document;
use lucerne::index::{MemorySegment, SegmentReader};
use lucerne::query::{BooleanQuery, PhraseQuery, SortRule, SortSpec, TermQuery};
use lucerne::schema::Schema;
use lucerne::search::{IndexSearcher, Searcher, SearcherConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORDS: &[&str] = &[
    "search", "engine", "full", "text", "index", "query", "document", "field", "term", "phrase",
    "boolean", "similarity", "relevance", "score", "segment", "posting", "matcher", "collector",
    "ranking", "filtering",
];

/// Generate segments of random documents over a small vocabulary.
fn generate_segments(num_segments: usize, docs_per_segment: usize) -> Vec<Arc<dyn SegmentReader>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..num_segments)
        .map(|_| {
            let mut builder = MemorySegment::builder();
            for _ in 0..docs_per_segment {
                let len = rng.random_range(20..120);
                let text: Vec<&str> = (0..len)
                    .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                    .collect();
                let text = text.join(" ");
                let rank = rng.random_range(0..1000);
                builder.add_document(
                    Document::builder().add_integer("rank", rank).build(),
                    [("body", text.as_str())],
                );
                if rng.random_bool(0.05) {
                    let doc_id = builder.add_document(Document::new(), [("body", "")]);
                    builder.delete_document(doc_id).unwrap();
                }
            }
            Arc::new(builder.build().unwrap()) as Arc<dyn SegmentReader>
        })
        .collect()
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

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let segments = generate_segments(4, 5_000);
    let searcher = IndexSearcher::new(segments, schema()).unwrap();
    group.throughput(Throughput::Elements(searcher.doc_max()));

    let term = TermQuery::new("body", "matcher");
    group.bench_function("term_top10", |b| {
        b.iter(|| black_box(searcher.top_docs(black_box(&term), 10, None).unwrap()))
    });

    let boolean = BooleanQuery::builder()
        .must(Box::new(TermQuery::new("body", "search")))
        .should(Box::new(TermQuery::new("body", "engine")))
        .must_not(Box::new(TermQuery::new("body", "ranking")))
        .build();
    group.bench_function("boolean_top10", |b| {
        b.iter(|| black_box(searcher.top_docs(black_box(&boolean), 10, None).unwrap()))
    });

    let phrase = PhraseQuery::from_phrase("body", "full text");
    group.bench_function("phrase_top10", |b| {
        b.iter(|| black_box(searcher.top_docs(black_box(&phrase), 10, None).unwrap()))
    });

    let spec = SortSpec::new(vec![SortRule::field("rank").reversed()]).unwrap();
    group.bench_function("term_sorted_by_field", |b| {
        b.iter(|| black_box(searcher.top_docs(&term, 10, Some(&spec)).unwrap()))
    });

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel");
    group.sample_size(20);

    let segments = generate_segments(8, 5_000);
    let sequential = IndexSearcher::new(segments.clone(), schema()).unwrap();
    let parallel = IndexSearcher::with_config(
        segments,
        schema(),
        SearcherConfig::default().parallel(true),
    )
    .unwrap();

    let query = BooleanQuery::builder()
        .should(Box::new(TermQuery::new("body", "posting")))
        .should(Box::new(TermQuery::new("body", "segment")))
        .build();

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(sequential.top_docs(&query, 100, None).unwrap()))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(parallel.top_docs(&query, 100, None).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_queries, bench_parallel);
criterion_main!(benches);
