//! Searchers: run compiled queries over segments and rank the results.

pub mod hits;
pub mod index_searcher;
pub mod poly_searcher;
pub mod searcher;

pub use self::hits::{HitDoc, Hits};
pub use self::index_searcher::IndexSearcher;
pub use self::poly_searcher::PolySearcher;
pub use self::searcher::Searcher;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::similarity::SimilarityConfig;

/// Configuration for an [`IndexSearcher`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Search segments in parallel, one matcher tree per segment.
    pub parallel: bool,
    /// Overrides the schema's default similarity when set.
    pub default_similarity: Option<SimilarityConfig>,
    /// Abort a search that runs longer than this many milliseconds.
    pub deadline_ms: Option<u64>,
}

impl SearcherConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enable or disable parallel segment search.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the search deadline.
    pub fn deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    /// Set the default similarity override.
    pub fn default_similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.default_similarity = Some(similarity);
        self
    }

    /// The deadline for a search starting now.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms))
    }
}
