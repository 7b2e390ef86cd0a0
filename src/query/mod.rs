//! Query execution: queries and their compilers, matchers, scoring models,
//! collectors and sort orders.

pub mod boolean;
pub mod collector;
pub mod hit_queue;
pub mod match_all;
pub mod match_doc;
pub mod matcher;
pub mod phrase;
#[allow(clippy::module_inception)]
pub mod query;
pub mod range;
pub mod similarity;
pub mod sort;
pub mod term;

pub use self::boolean::{BooleanClause, BooleanQuery, BooleanQueryBuilder, Occur};
pub use self::collector::{
    AllCollector, BitCollector, Collector, CountCollector, OffsetCollector, TopCollector,
};
pub use self::hit_queue::{HitQueue, SortAction, merge_top_docs};
pub use self::match_all::{MatchAllQuery, NoMatchQuery};
pub use self::match_doc::{MatchDoc, TopDocs};
pub use self::matcher::Matcher;
pub use self::phrase::PhraseQuery;
pub use self::query::{Compiler, Query};
pub use self::range::RangeQuery;
pub use self::similarity::{Bm25Similarity, Similarity, SimilarityConfig, TfIdfSimilarity};
pub use self::sort::{SortRule, SortRuleKind, SortSpec, SortValue};
pub use self::term::TermQuery;
