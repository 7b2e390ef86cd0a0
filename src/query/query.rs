//! Queries and their compiled form.
//!
//! A [`Query`] is a declarative, reusable description of what to match. At
//! search time it is compiled against a [`Searcher`] into a [`Compiler`],
//! which holds the weights derived from collection statistics. The compiler
//! is normalized once per search and then produces one [`Matcher`] per
//! segment.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::index::reader::SegmentReader;
use crate::query::matcher::Matcher;
use crate::query::similarity::Similarity;
use crate::search::Searcher;

/// Trait for search queries.
pub trait Query: Send + Sync + Debug {
    /// Compile this query against `searcher`'s statistics. `boost` is the
    /// effective boost, already multiplied through any enclosing queries.
    fn make_compiler(&self, searcher: &dyn Searcher, boost: f32) -> Result<Box<dyn Compiler>>;

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Set the boost factor for this query.
    fn set_boost(&mut self, boost: f32);

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The weighted, per-search form of a [`Query`].
pub trait Compiler: Send + Sync + Debug {
    /// Contribution of this compiler to the query norm.
    fn sum_of_squared_weights(&self) -> f32;

    /// Fold the query norm factor into the weights.
    fn apply_norm_factor(&mut self, factor: f32);

    /// The current (possibly normalized) weight.
    fn weight(&self) -> f32;

    /// The similarity used for normalization and scoring.
    fn similarity(&self) -> &Arc<dyn Similarity>;

    /// Normalize the weights of the whole compiler tree. Called once, on the
    /// root, before any matcher is made.
    fn normalize(&mut self) {
        let factor = self
            .similarity()
            .query_norm(self.sum_of_squared_weights());
        self.apply_norm_factor(factor);
    }

    /// Build the matcher for one segment, or `None` when nothing in the
    /// segment can match. `need_score` is false when the consumer never
    /// reads scores.
    fn make_matcher(
        &self,
        segment: &Arc<dyn SegmentReader>,
        need_score: bool,
    ) -> Result<Option<Matcher>>;

    /// Get a human-readable description of the compiled query.
    fn description(&self) -> String;
}
