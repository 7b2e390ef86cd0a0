//! Term query implementation for exact term matching.

use std::sync::Arc;

use log::trace;

use crate::error::Result;
use crate::index::reader::SegmentReader;
use crate::query::matcher::{Matcher, TermMatcher};
use crate::query::query::{Compiler, Query};
use crate::query::similarity::Similarity;
use crate::search::Searcher;

/// A query that matches documents containing a specific term.
///
/// The term is matched exactly; it is expected to be in the same analyzed
/// form as the indexed tokens.
#[derive(Debug, Clone)]
pub struct TermQuery {
    /// The field to search in.
    field: String,
    /// The term to search for.
    term: String,
    /// The boost factor for this query.
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn make_compiler(&self, searcher: &dyn Searcher, boost: f32) -> Result<Box<dyn Compiler>> {
        let similarity = searcher.schema().similarity(&self.field);
        let idf = similarity.idf(searcher.doc_freq(&self.field, &self.term), searcher.doc_max());
        Ok(Box::new(TermCompiler::new(
            self.field.clone(),
            self.term.clone(),
            similarity,
            idf,
            boost,
        )))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        if self.boost == 1.0 {
            format!("{}:{}", self.field, self.term)
        } else {
            format!("{}:{}^{}", self.field, self.term, self.boost)
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Compiled [`TermQuery`].
#[derive(Debug)]
pub struct TermCompiler {
    field: String,
    term: String,
    similarity: Arc<dyn Similarity>,
    idf: f32,
    raw_weight: f32,
    weight: f32,
}

impl TermCompiler {
    fn new(
        field: String,
        term: String,
        similarity: Arc<dyn Similarity>,
        idf: f32,
        boost: f32,
    ) -> Self {
        let raw_weight = idf * boost;
        let weight = similarity.normalized_weight(raw_weight, idf, 1.0);
        TermCompiler {
            field,
            term,
            similarity,
            idf,
            raw_weight,
            weight,
        }
    }

    /// The inverse document frequency of the term.
    pub fn idf(&self) -> f32 {
        self.idf
    }
}

impl Compiler for TermCompiler {
    fn sum_of_squared_weights(&self) -> f32 {
        self.raw_weight * self.raw_weight
    }

    fn apply_norm_factor(&mut self, factor: f32) {
        self.weight = self
            .similarity
            .normalized_weight(self.raw_weight, self.idf, factor);
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
        _need_score: bool,
    ) -> Result<Option<Matcher>> {
        let Some(postings) = segment.posting_list(&self.field, &self.term)? else {
            trace!("{}:{} absent from segment", self.field, self.term);
            return Ok(None);
        };
        let avg_field_length = segment
            .field_stats(&self.field)
            .map(|stats| stats.avg_length())
            .unwrap_or(0.0);
        Ok(Some(
            TermMatcher::new(
                postings,
                Arc::clone(&self.similarity),
                self.weight,
                avg_field_length,
            )
            .into(),
        ))
    }

    fn description(&self) -> String {
        format!("{}:{} weight={}", self.field, self.term, self.weight)
    }
}
