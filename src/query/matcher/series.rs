use crate::DocId;
use crate::error::{LucerneError, Result};
use crate::query::matcher::{Matcher, effective_target};

/// Concatenates matchers over consecutive doc-ID ranges into one stream.
///
/// Matcher `i` reports local doc IDs; they are shifted by `offsets[i]`. The
/// offsets must ascend, and each matcher's documents must fit below the next
/// offset.
#[derive(Debug)]
pub struct SeriesMatcher {
    matchers: Vec<Matcher>,
    offsets: Vec<DocId>,
    /// Index of the active matcher.
    tick: usize,
    doc_id: DocId,
}

impl SeriesMatcher {
    /// Create a series from matchers and their doc-ID offsets.
    pub fn new(matchers: Vec<Matcher>, offsets: Vec<DocId>) -> Result<Self> {
        if matchers.len() != offsets.len() {
            return Err(LucerneError::invalid_argument(format!(
                "{} matchers but {} offsets",
                matchers.len(),
                offsets.len()
            )));
        }
        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(LucerneError::invalid_argument(
                "Series offsets must be ascending",
            ));
        }
        Ok(SeriesMatcher {
            matchers,
            offsets,
            tick: 0,
            doc_id: 0,
        })
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        self.advance(0)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        let Some(target) = effective_target(target, self.doc_id) else {
            self.tick = self.matchers.len();
            self.doc_id = 0;
            return Ok(0);
        };

        while self.tick < self.matchers.len() {
            let offset = self.offsets[self.tick];
            let next_offset = self.offsets.get(self.tick + 1).copied().unwrap_or(DocId::MAX);

            if target <= next_offset {
                let local_target = target.saturating_sub(offset).max(1);
                let found = self.matchers[self.tick].advance(local_target)?;
                if found != 0 {
                    self.doc_id = offset + found;
                    return Ok(self.doc_id);
                }
            }
            self.tick += 1;
        }

        self.doc_id = 0;
        Ok(0)
    }

    pub(crate) fn score(&self) -> f32 {
        self.matchers[self.tick].score()
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub(crate) fn cost(&self) -> u64 {
        self.matchers.iter().map(|matcher| matcher.cost()).sum()
    }
}
