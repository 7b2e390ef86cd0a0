//! Boolean query implementation for combining multiple queries.

use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::reader::SegmentReader;
use crate::query::matcher::{
    ConjunctionMatcher, DisjunctionMatcher, FilteredMatcher, MatchAllMatcher, Matcher, NoMatchMatcher,
    NotMatcher, RequiredOptionalMatcher,
};
use crate::query::query::{Compiler, Query};
use crate::query::similarity::Similarity;
use crate::search::Searcher;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: Box<dyn Query>,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    /// Create a MUST clause.
    pub fn must(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    /// Create a SHOULD clause.
    pub fn should(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    /// Create a MUST_NOT clause.
    pub fn must_not(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// A boolean query that combines multiple queries with boolean logic.
///
/// - With MUST clauses, a document must match all of them; SHOULD clauses
///   then only add to the score (unless a minimum is set).
/// - Without MUST clauses, a document must match at least one SHOULD clause,
///   or `minimum_should_match` of them.
/// - MUST_NOT clauses remove documents. A query made only of MUST_NOT
///   clauses matches every other document with score 0.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    /// The clauses in this boolean query.
    clauses: Vec<BooleanClause>,
    /// The boost factor for this query.
    boost: f32,
    /// Minimum number of should clauses that must match.
    minimum_should_match: usize,
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            boost: 1.0,
            minimum_should_match: 0,
        }
    }

    /// Create a builder.
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::new()
    }

    /// Add a clause to this boolean query.
    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must(query));
    }

    /// Add a SHOULD clause.
    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::should(query));
    }

    /// Add a MUST_NOT clause.
    pub fn add_must_not(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must_not(query));
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the minimum number of should clauses that must match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Get the minimum should match value.
    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    /// Check if this query is empty.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for BooleanQuery {
    fn make_compiler(&self, searcher: &dyn Searcher, boost: f32) -> Result<Box<dyn Compiler>> {
        let children = self
            .clauses
            .iter()
            .map(|clause| {
                let child_boost = clause.query.boost() * boost;
                Ok((clause.occur, clause.query.make_compiler(searcher, child_boost)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(BooleanCompiler {
            children,
            similarity: Arc::clone(searcher.schema().default_similarity()),
            minimum_should_match: self.minimum_should_match,
            boost,
            weight: boost,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{prefix}{}", clause.query.description())
            })
            .collect();

        let mut description = format!("({})", clauses.join(" "));
        if self.minimum_should_match > 0 {
            description.push_str(&format!("~{}", self.minimum_should_match));
        }
        if self.boost != 1.0 {
            description.push_str(&format!("^{}", self.boost));
        }
        description
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Compiled [`BooleanQuery`].
#[derive(Debug)]
pub struct BooleanCompiler {
    children: Vec<(Occur, Box<dyn Compiler>)>,
    similarity: Arc<dyn Similarity>,
    minimum_should_match: usize,
    boost: f32,
    weight: f32,
}

impl BooleanCompiler {
    /// Matchers of the children with `occur` present in the segment.
    fn child_matchers(
        &self,
        occur: Occur,
        segment: &Arc<dyn SegmentReader>,
        need_score: bool,
    ) -> Result<(Vec<Matcher>, usize)> {
        let mut matchers = Vec::new();
        let mut total = 0;
        for (child_occur, compiler) in &self.children {
            if *child_occur != occur {
                continue;
            }
            total += 1;
            if let Some(matcher) = compiler.make_matcher(segment, need_score)? {
                matchers.push(matcher);
            }
        }
        Ok((matchers, total))
    }

    fn union(&self, mut matchers: Vec<Matcher>, need_score: bool, min_match: usize) -> Matcher {
        if matchers.len() == 1 && min_match <= 1 {
            if let Some(matcher) = matchers.pop() {
                return matcher;
            }
        }
        DisjunctionMatcher::with_options(matchers, self.similarity.as_ref(), need_score, min_match)
            .into()
    }
}

impl Compiler for BooleanCompiler {
    fn sum_of_squared_weights(&self) -> f32 {
        let sum: f32 = self
            .children
            .iter()
            .filter(|(occur, _)| *occur != Occur::MustNot)
            .map(|(_, compiler)| compiler.sum_of_squared_weights())
            .sum();
        sum
    }

    fn apply_norm_factor(&mut self, factor: f32) {
        self.weight = self.boost * factor;
        for (_, compiler) in &mut self.children {
            compiler.apply_norm_factor(factor);
        }
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    fn make_matcher(
        &self,
        segment: &Arc<dyn SegmentReader>,
        need_score: bool,
    ) -> Result<Option<Matcher>> {
        let (mut musts, must_total) = self.child_matchers(Occur::Must, segment, need_score)?;
        if musts.len() < must_total {
            trace!("Required clause absent from segment");
            return Ok(None);
        }
        let (mut shoulds, should_total) = self.child_matchers(Occur::Should, segment, need_score)?;
        let (must_nots, must_not_total) =
            self.child_matchers(Occur::MustNot, segment, false)?;
        let prohibited_only = must_total == 0 && should_total == 0 && must_not_total > 0;

        let min_should = self.minimum_should_match;
        if min_should > shoulds.len() {
            return Ok(None);
        }
        // Absent SHOULD clauses still count towards coord, so a document
        // scores the same whichever segment holds it. With required clauses
        // this holds even when no SHOULD clause occurs in the segment.
        if !shoulds.is_empty() || (must_total > 0 && should_total > 0) {
            shoulds.resize_with(should_total, || NoMatchMatcher::new().into());
        }

        let required = match musts.len() {
            0 => None,
            1 => musts.pop(),
            _ => Some(ConjunctionMatcher::new(musts, self.similarity.as_ref()).into()),
        };

        let positive: Option<Matcher> = match (required, shoulds.is_empty()) {
            (Some(required), true) => Some(required),
            (Some(required), false) if min_should == 0 => {
                let optional = self.union(shoulds, need_score, 1);
                Some(
                    RequiredOptionalMatcher::new(
                        required,
                        optional,
                        self.similarity.as_ref(),
                        need_score,
                    )
                    .into(),
                )
            }
            (Some(required), false) => {
                let optional = self.union(shoulds, need_score, min_should);
                Some(
                    ConjunctionMatcher::new(vec![required, optional], self.similarity.as_ref())
                        .into(),
                )
            }
            (None, false) => Some(self.union(shoulds, need_score, min_should.max(1))),
            (None, true) => None,
        };

        let matcher = match (positive, must_nots.is_empty()) {
            (Some(positive), true) => positive,
            (Some(positive), false) => {
                FilteredMatcher::new(positive, self.union(must_nots, false, 1)).into()
            }
            // Only prohibited clauses: everything else matches.
            (None, false) if prohibited_only => {
                NotMatcher::new(self.union(must_nots, false, 1), segment.doc_max()).into()
            }
            (None, true) if prohibited_only => MatchAllMatcher::new(segment.doc_max(), 0.0).into(),
            (None, _) => return Ok(None),
        };
        Ok(Some(matcher))
    }

    fn description(&self) -> String {
        let children: Vec<String> = self
            .children
            .iter()
            .map(|(occur, compiler)| format!("{occur:?}({})", compiler.description()))
            .collect();
        format!("Boolean[{}] weight={}", children.join(", "), self.weight)
    }
}

/// Builder for [`BooleanQuery`].
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    query: BooleanQuery,
}

impl BooleanQueryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        BooleanQueryBuilder {
            query: BooleanQuery::new(),
        }
    }

    /// Add a MUST clause.
    pub fn must(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_must(query);
        self
    }

    /// Add a SHOULD clause.
    pub fn should(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_should(query);
        self
    }

    /// Add a MUST_NOT clause.
    pub fn must_not(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_must_not(query);
        self
    }

    /// Set the boost factor.
    pub fn boost(mut self, boost: f32) -> Self {
        self.query.boost = boost;
        self
    }

    /// Set the minimum number of SHOULD clauses that must match.
    pub fn minimum_should_match(mut self, minimum: usize) -> Self {
        self.query.minimum_should_match = minimum;
        self
    }

    /// Build the query.
    pub fn build(self) -> BooleanQuery {
        self.query
    }
}
