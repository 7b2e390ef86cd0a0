//! Queries matching every document or none.

use std::sync::Arc;

use crate::error::Result;
use crate::index::reader::SegmentReader;
use crate::query::matcher::{MatchAllMatcher, Matcher, NoMatchMatcher};
use crate::query::query::{Compiler, Query};
use crate::query::similarity::Similarity;
use crate::search::Searcher;

/// Matches every document. Each scores the query's boost.
#[derive(Debug, Clone)]
pub struct MatchAllQuery {
    boost: f32,
}

impl MatchAllQuery {
    pub fn new() -> Self {
        MatchAllQuery { boost: 1.0 }
    }
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for MatchAllQuery {
    fn make_compiler(&self, searcher: &dyn Searcher, boost: f32) -> Result<Box<dyn Compiler>> {
        Ok(Box::new(ConstantCompiler {
            similarity: Arc::clone(searcher.schema().default_similarity()),
            score: boost,
            match_all: true,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        "*:*".to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Matches nothing.
#[derive(Debug, Clone)]
pub struct NoMatchQuery {
    boost: f32,
}

impl NoMatchQuery {
    pub fn new() -> Self {
        NoMatchQuery { boost: 1.0 }
    }
}

impl Default for NoMatchQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for NoMatchQuery {
    fn make_compiler(&self, searcher: &dyn Searcher, _boost: f32) -> Result<Box<dyn Compiler>> {
        Ok(Box::new(ConstantCompiler {
            similarity: Arc::clone(searcher.schema().default_similarity()),
            score: 0.0,
            match_all: false,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        "-*:*".to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Compiled form of [`MatchAllQuery`] and [`NoMatchQuery`]. It carries no
/// term statistics and ignores the query norm.
#[derive(Debug)]
pub struct ConstantCompiler {
    similarity: Arc<dyn Similarity>,
    score: f32,
    match_all: bool,
}

impl Compiler for ConstantCompiler {
    fn sum_of_squared_weights(&self) -> f32 {
        0.0
    }

    fn apply_norm_factor(&mut self, _factor: f32) {}

    fn weight(&self) -> f32 {
        self.score
    }

    fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    fn make_matcher(
        &self,
        segment: &Arc<dyn SegmentReader>,
        _need_score: bool,
    ) -> Result<Option<Matcher>> {
        let matcher = if self.match_all {
            MatchAllMatcher::new(segment.doc_max(), self.score).into()
        } else {
            NoMatchMatcher::new().into()
        };
        Ok(Some(matcher))
    }

    fn description(&self) -> String {
        if self.match_all {
            format!("MatchAll score={}", self.score)
        } else {
            "NoMatch".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::matcher::test_util::{drain, drain_scored};
    use crate::search::test_util::searcher_over;

    #[test]
    fn test_match_all_scores_boost() {
        let searcher = searcher_over(&["a", "b", "c"]);
        let mut compiler = MatchAllQuery::new().make_compiler(&searcher, 2.5).unwrap();
        compiler.normalize();
        let segment = searcher.segments()[0].clone();
        let mut matcher = compiler.make_matcher(&segment, true).unwrap().unwrap();
        assert_eq!(
            drain_scored(&mut matcher),
            vec![(1, 2.5), (2, 2.5), (3, 2.5)]
        );
    }

    #[test]
    fn test_no_match() {
        let searcher = searcher_over(&["a", "b"]);
        let compiler = NoMatchQuery::new().make_compiler(&searcher, 1.0).unwrap();
        let segment = searcher.segments()[0].clone();
        let mut matcher = compiler.make_matcher(&segment, true).unwrap().unwrap();
        assert!(drain(&mut matcher).is_empty());
    }
}
