//! Phrase query implementation for matching consecutive terms.

use std::sync::Arc;

use crate::error::{LucerneError, Result};
use crate::index::reader::SegmentReader;
use crate::query::matcher::{Matcher, PhraseMatcher};
use crate::query::query::{Compiler, Query};
use crate::query::similarity::Similarity;
use crate::search::Searcher;

/// A query that matches documents containing its terms at consecutive
/// positions of one field.
#[derive(Debug, Clone)]
pub struct PhraseQuery {
    /// The field to search in.
    field: String,
    /// The terms, in phrase order.
    terms: Vec<String>,
    /// The boost factor for this query.
    boost: f32,
}

impl PhraseQuery {
    /// Create a new phrase query.
    pub fn new<F: Into<String>>(field: F, terms: Vec<String>) -> Self {
        PhraseQuery {
            field: field.into(),
            terms,
            boost: 1.0,
        }
    }

    /// Create a phrase query from whitespace-separated terms.
    pub fn from_phrase<F: Into<String>>(field: F, phrase: &str) -> Self {
        let terms = phrase.split_whitespace().map(String::from).collect();
        Self::new(field, terms)
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for PhraseQuery {
    fn make_compiler(&self, searcher: &dyn Searcher, boost: f32) -> Result<Box<dyn Compiler>> {
        if self.terms.is_empty() {
            return Err(LucerneError::query(format!(
                "Phrase query on '{}' has no terms",
                self.field
            )));
        }

        let similarity = searcher.schema().similarity(&self.field);
        let doc_max = searcher.doc_max();
        // The phrase weighs as much as its terms together.
        let idf: f32 = self
            .terms
            .iter()
            .map(|term| similarity.idf(searcher.doc_freq(&self.field, term), doc_max))
            .sum();

        let raw_weight = idf * boost;
        Ok(Box::new(PhraseCompiler {
            field: self.field.clone(),
            terms: self.terms.clone(),
            weight: similarity.normalized_weight(raw_weight, idf, 1.0),
            similarity,
            idf,
            raw_weight,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let phrase = format!("{}:\"{}\"", self.field, self.terms.join(" "));
        if self.boost == 1.0 {
            phrase
        } else {
            format!("{phrase}^{}", self.boost)
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Compiled [`PhraseQuery`].
#[derive(Debug)]
pub struct PhraseCompiler {
    field: String,
    terms: Vec<String>,
    similarity: Arc<dyn Similarity>,
    idf: f32,
    raw_weight: f32,
    weight: f32,
}

impl Compiler for PhraseCompiler {
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
        let mut postings = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match segment.posting_list(&self.field, term)? {
                Some(list) => postings.push(list),
                None => return Ok(None),
            }
        }
        let avg_field_length = segment
            .field_stats(&self.field)
            .map(|stats| stats.avg_length())
            .unwrap_or(0.0);
        Ok(Some(
            PhraseMatcher::new(
                postings,
                Arc::clone(&self.similarity),
                self.weight,
                avg_field_length,
            )
            .into(),
        ))
    }

    fn description(&self) -> String {
        format!(
            "{}:\"{}\" weight={}",
            self.field,
            self.terms.join(" "),
            self.weight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::matcher::test_util::drain;
    use crate::search::test_util::searcher_over;

    #[test]
    fn test_phrase_matches_consecutive_terms() {
        let searcher = searcher_over(&[
            "the quick brown fox",
            "brown quick fox",
            "quick brown",
            "a quick dog and a brown cat",
        ]);
        let compiler = PhraseQuery::from_phrase("body", "quick brown")
            .make_compiler(&searcher, 1.0)
            .unwrap();
        let segment = searcher.segments()[0].clone();
        let mut matcher = compiler.make_matcher(&segment, true).unwrap().unwrap();
        assert_eq!(drain(&mut matcher), vec![1, 3]);
    }

    #[test]
    fn test_phrase_with_missing_term() {
        let searcher = searcher_over(&["quick brown fox"]);
        let compiler = PhraseQuery::from_phrase("body", "quick red")
            .make_compiler(&searcher, 1.0)
            .unwrap();
        let segment = searcher.segments()[0].clone();
        assert!(compiler.make_matcher(&segment, true).unwrap().is_none());
    }

    #[test]
    fn test_empty_phrase_rejected() {
        let searcher = searcher_over(&["quick"]);
        let result = PhraseQuery::new("body", Vec::new()).make_compiler(&searcher, 1.0);
        assert!(matches!(result, Err(LucerneError::Query(_))));
    }

    #[test]
    fn test_phrase_description() {
        let query = PhraseQuery::from_phrase("title", "hello world");
        assert_eq!(query.description(), "title:\"hello world\"");
        assert_eq!(query.terms().len(), 2);
    }
}
