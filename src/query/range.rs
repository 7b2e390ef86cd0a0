//! Range filter over sort values.

use std::ops::Bound;
use std::sync::Arc;

use crate::error::{LucerneError, Result};
use crate::index::reader::SegmentReader;
use crate::query::matcher::{Matcher, RangeMatcher};
use crate::query::query::{Compiler, Query};
use crate::query::similarity::Similarity;
use crate::query::sort::SortValue;
use crate::search::Searcher;

/// Matches documents whose value for a sortable field lies between two
/// bounds.
///
/// The query filters rather than ranks: every match scores the query's
/// boost, which defaults to 0. Documents without a value never match.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    field: String,
    lower: Bound<SortValue>,
    upper: Bound<SortValue>,
    boost: f32,
}

impl RangeQuery {
    /// Create a range query. At least one bound must be set, and neither may
    /// be [`SortValue::Null`].
    pub fn new<S: Into<String>>(
        field: S,
        lower: Bound<SortValue>,
        upper: Bound<SortValue>,
    ) -> Result<Self> {
        let field = field.into();
        if matches!((&lower, &upper), (Bound::Unbounded, Bound::Unbounded)) {
            return Err(LucerneError::query(format!(
                "Range on '{field}' needs a lower or an upper bound"
            )));
        }
        let null_bound = |bound: &Bound<SortValue>| {
            matches!(
                bound,
                Bound::Included(SortValue::Null) | Bound::Excluded(SortValue::Null)
            )
        };
        if null_bound(&lower) || null_bound(&upper) {
            return Err(LucerneError::query(format!(
                "Range on '{field}' cannot be bounded by null"
            )));
        }
        Ok(RangeQuery {
            field,
            lower,
            upper,
            boost: 0.0,
        })
    }

    /// Values from `lower` to `upper`, both included.
    pub fn between<S: Into<String>>(field: S, lower: SortValue, upper: SortValue) -> Result<Self> {
        Self::new(field, Bound::Included(lower), Bound::Included(upper))
    }

    /// Values at or above `lower`.
    pub fn at_least<S: Into<String>>(field: S, lower: SortValue) -> Result<Self> {
        Self::new(field, Bound::Included(lower), Bound::Unbounded)
    }

    /// Values strictly below `upper`.
    pub fn less_than<S: Into<String>>(field: S, upper: SortValue) -> Result<Self> {
        Self::new(field, Bound::Unbounded, Bound::Excluded(upper))
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn lower(&self) -> &Bound<SortValue> {
        &self.lower
    }

    pub fn upper(&self) -> &Bound<SortValue> {
        &self.upper
    }
}

impl Query for RangeQuery {
    fn make_compiler(&self, searcher: &dyn Searcher, boost: f32) -> Result<Box<dyn Compiler>> {
        let schema = searcher.schema();
        if !schema.is_sortable(&self.field) {
            return Err(LucerneError::query(format!(
                "Cannot range over unsortable field '{}'",
                self.field
            )));
        }
        Ok(Box::new(RangeCompiler {
            query: self.clone(),
            similarity: Arc::clone(schema.default_similarity()),
            score: boost,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let (open, lower) = match &self.lower {
            Bound::Included(value) => ("[", value.to_string()),
            Bound::Excluded(value) => ("{", value.to_string()),
            Bound::Unbounded => ("{", "*".to_string()),
        };
        let (close, upper) = match &self.upper {
            Bound::Included(value) => ("]", value.to_string()),
            Bound::Excluded(value) => ("}", value.to_string()),
            Bound::Unbounded => ("}", "*".to_string()),
        };
        let range = format!("{}:{open}{lower} TO {upper}{close}", self.field);
        if self.boost == 0.0 {
            range
        } else {
            format!("{range}^{}", self.boost)
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Compiled [`RangeQuery`]. Constant scoring; the query norm is ignored.
#[derive(Debug)]
pub struct RangeCompiler {
    query: RangeQuery,
    similarity: Arc<dyn Similarity>,
    score: f32,
}

impl Compiler for RangeCompiler {
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
        if segment.doc_max() == 0 {
            return Ok(None);
        }
        Ok(Some(
            RangeMatcher::new(
                Arc::clone(segment),
                self.query.field.clone(),
                self.query.lower.clone(),
                self.query.upper.clone(),
                self.score,
            )
            .into(),
        ))
    }

    fn description(&self) -> String {
        format!("Range[{}] score={}", self.query.description(), self.score)
    }
}
