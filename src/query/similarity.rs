//! Scoring models.
//!
//! A [`Similarity`] turns raw statistics (term frequency, document frequency,
//! field length, clause overlap) into score components. Each field gets one
//! from the [`Schema`](crate::schema::Schema); matchers that do not score
//! (match-all, negation, bit sets) never consult it.

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LucerneError, Result};

/// A pluggable scoring model.
pub trait Similarity: Send + Sync + Debug {
    /// Weight of a term occurring `freq` times in a document.
    fn tf(&self, freq: f32) -> f32;

    /// Inverse document frequency of a term found in `doc_freq` of `doc_max`
    /// documents.
    fn idf(&self, doc_freq: u64, doc_max: u64) -> f32;

    /// Reward for matching `overlap` of `max_overlap` clauses.
    fn coord(&self, overlap: u32, max_overlap: u32) -> f32;

    /// Normalization for a field holding `num_tokens` tokens.
    fn length_norm(&self, num_tokens: u32) -> f32;

    /// Factor applied to every weight so that scores from different queries
    /// are comparable.
    fn query_norm(&self, sum_of_squared_weights: f32) -> f32;

    /// The final weight of a term once the query norm is known.
    fn normalized_weight(&self, raw_weight: f32, idf: f32, query_norm_factor: f32) -> f32 {
        raw_weight * idf * query_norm_factor
    }

    /// Score a single posting.
    fn score(&self, freq: f32, field_length: u32, _avg_field_length: f32, weight: f32) -> f32 {
        self.tf(freq) * self.length_norm(field_length) * weight
    }

    /// Coord values for `0..=num_clauses` matching clauses.
    fn coord_factors(&self, num_clauses: u32) -> Vec<f32> {
        (0..=num_clauses)
            .map(|overlap| self.coord(overlap, num_clauses))
            .collect()
    }

    /// Short name of this model.
    fn name(&self) -> &'static str;
}

/// Classic TF-IDF scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfSimilarity;

impl TfIdfSimilarity {
    /// Create a new TF-IDF similarity.
    pub fn new() -> Self {
        TfIdfSimilarity
    }
}

impl Similarity for TfIdfSimilarity {
    fn tf(&self, freq: f32) -> f32 {
        freq.sqrt()
    }

    fn idf(&self, doc_freq: u64, doc_max: u64) -> f32 {
        1.0 + (doc_max as f64 / (doc_freq as f64 + 1.0)).ln() as f32
    }

    fn coord(&self, overlap: u32, max_overlap: u32) -> f32 {
        if max_overlap == 0 {
            1.0
        } else {
            overlap as f32 / max_overlap as f32
        }
    }

    fn length_norm(&self, num_tokens: u32) -> f32 {
        if num_tokens == 0 {
            0.0
        } else {
            1.0 / (num_tokens as f32).sqrt()
        }
    }

    fn query_norm(&self, sum_of_squared_weights: f32) -> f32 {
        if sum_of_squared_weights <= 0.0 {
            0.0
        } else {
            1.0 / sum_of_squared_weights.sqrt()
        }
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

/// Okapi BM25 scoring.
///
/// Length normalization happens inside [`Similarity::score`] against the
/// average field length, so `length_norm` and `query_norm` are neutral and
/// there is no coordination reward.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Similarity {
    /// BM25 k1 parameter.
    k1: f32,
    /// BM25 b parameter.
    b: f32,
}

impl Bm25Similarity {
    /// Create a BM25 similarity with custom parameters.
    ///
    /// `k1` must be finite and non-negative; `b` must lie in `[0, 1]`.
    pub fn new(k1: f32, b: f32) -> Result<Self> {
        if !k1.is_finite() || k1 < 0.0 {
            return Err(LucerneError::invalid_config(format!(
                "BM25 k1 must be a non-negative number, got {k1}"
            )));
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(LucerneError::invalid_config(format!(
                "BM25 b must be between 0 and 1, got {b}"
            )));
        }
        Ok(Bm25Similarity { k1, b })
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Get the b parameter.
    pub fn b(&self) -> f32 {
        self.b
    }
}

impl Default for Bm25Similarity {
    fn default() -> Self {
        Bm25Similarity { k1: 1.2, b: 0.75 }
    }
}

impl Similarity for Bm25Similarity {
    fn tf(&self, freq: f32) -> f32 {
        freq
    }

    fn idf(&self, doc_freq: u64, doc_max: u64) -> f32 {
        let n = doc_max as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn coord(&self, _overlap: u32, _max_overlap: u32) -> f32 {
        1.0
    }

    fn length_norm(&self, _num_tokens: u32) -> f32 {
        1.0
    }

    fn query_norm(&self, _sum_of_squared_weights: f32) -> f32 {
        1.0
    }

    fn normalized_weight(&self, raw_weight: f32, _idf: f32, query_norm_factor: f32) -> f32 {
        raw_weight * query_norm_factor
    }

    fn score(&self, freq: f32, field_length: u32, avg_field_length: f32, weight: f32) -> f32 {
        if freq == 0.0 {
            return 0.0;
        }

        let norm_factor = if avg_field_length > 0.0 {
            1.0 - self.b + self.b * (field_length as f32 / avg_field_length)
        } else {
            1.0
        };

        weight * (freq * (self.k1 + 1.0)) / (freq + self.k1 * norm_factor)
    }

    fn name(&self) -> &'static str {
        "bm25"
    }
}

/// Serializable choice of scoring model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimilarityConfig {
    /// [`TfIdfSimilarity`]
    #[default]
    TfIdf,
    /// [`Bm25Similarity`]
    Bm25 {
        /// Term frequency saturation.
        k1: f32,
        /// Length normalization strength.
        b: f32,
    },
}

impl SimilarityConfig {
    /// Instantiate the configured model.
    pub fn build(&self) -> Result<Arc<dyn Similarity>> {
        match *self {
            SimilarityConfig::TfIdf => Ok(Arc::new(TfIdfSimilarity::new())),
            SimilarityConfig::Bm25 { k1, b } => Ok(Arc::new(Bm25Similarity::new(k1, b)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tfidf_components() {
        let sim = TfIdfSimilarity::new();
        assert_eq!(sim.tf(4.0), 2.0);
        assert_eq!(sim.length_norm(4), 0.5);
        assert_eq!(sim.length_norm(0), 0.0);
        assert_eq!(sim.query_norm(4.0), 0.5);
        assert_eq!(sim.query_norm(0.0), 0.0);
        assert_eq!(sim.coord(1, 2), 0.5);
        assert_eq!(sim.coord(0, 0), 1.0);

        // doc_max / (doc_freq + 1) == 1 gives ln(1) == 0.
        assert!((sim.idf(9, 10) - 1.0).abs() < 1e-6);
        assert!(sim.idf(1, 100) > sim.idf(50, 100));
    }

    #[test]
    fn test_coord_factors() {
        let sim = TfIdfSimilarity::new();
        assert_eq!(sim.coord_factors(2), vec![0.0, 0.5, 1.0]);
        assert_eq!(sim.coord_factors(0), vec![1.0]);
    }

    #[test]
    fn test_bm25_parameters() {
        let bm25 = Bm25Similarity::default();
        assert_eq!(bm25.k1(), 1.2);
        assert_eq!(bm25.b(), 0.75);

        assert!(Bm25Similarity::new(-1.0, 0.5).is_err());
        assert!(Bm25Similarity::new(1.2, 1.5).is_err());
        assert!(Bm25Similarity::new(f32::NAN, 0.5).is_err());
    }

    #[test]
    fn test_bm25_score() {
        let bm25 = Bm25Similarity::default();
        assert_eq!(bm25.score(0.0, 10, 10.0, 1.0), 0.0);

        // Shorter documents score higher for the same frequency.
        let short = bm25.score(2.0, 5, 10.0, 1.0);
        let long = bm25.score(2.0, 20, 10.0, 1.0);
        assert!(short > long);

        // Saturation: score grows with frequency but stays below k1 + 1.
        let high = bm25.score(100.0, 10, 10.0, 1.0);
        assert!(high > bm25.score(1.0, 10, 10.0, 1.0));
        assert!(high < bm25.k1() + 1.0);

        assert!(bm25.idf(1, 100) > 0.0);
        assert_eq!(bm25.coord_factors(3), vec![1.0; 4]);
    }

    #[test]
    fn test_similarity_config() {
        let config: SimilarityConfig =
            serde_json::from_str(r#"{"type":"bm25","k1":1.5,"b":0.5}"#).unwrap();
        assert_eq!(config, SimilarityConfig::Bm25 { k1: 1.5, b: 0.5 });
        assert_eq!(config.build().unwrap().name(), "bm25");

        assert_eq!(SimilarityConfig::default().build().unwrap().name(), "tfidf");
        assert!(SimilarityConfig::Bm25 { k1: 1.0, b: 2.0 }.build().is_err());
    }
}
