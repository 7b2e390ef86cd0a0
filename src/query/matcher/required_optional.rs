use crate::DocId;
use crate::error::Result;
use crate::query::matcher::Matcher;
use crate::query::similarity::Similarity;

/// The required child decides which documents match; the optional child
/// only adds to the score of documents it also matches.
///
/// The optional child is moved along with the required one, so the score
/// of the current match is always available without further I/O.
#[derive(Debug)]
pub struct RequiredOptionalMatcher {
    required: Box<Matcher>,
    optional: Box<Matcher>,
    /// Coord factors for one and for two matching children.
    coord_single: f32,
    coord_both: f32,
    need_score: bool,
    optional_exhausted: bool,
    optional_matches: bool,
}

impl RequiredOptionalMatcher {
    /// Create the matcher.
    pub fn new(
        required: Matcher,
        optional: Matcher,
        similarity: &dyn Similarity,
        need_score: bool,
    ) -> Self {
        RequiredOptionalMatcher {
            required: Box::new(required),
            optional: Box::new(optional),
            coord_single: similarity.coord(1, 2),
            coord_both: similarity.coord(2, 2),
            need_score,
            optional_exhausted: false,
            optional_matches: false,
        }
    }

    pub(crate) fn next(&mut self) -> Result<DocId> {
        let doc_id = self.required.next()?;
        self.sync_optional(doc_id)?;
        Ok(doc_id)
    }

    pub(crate) fn advance(&mut self, target: DocId) -> Result<DocId> {
        let doc_id = self.required.advance(target)?;
        self.sync_optional(doc_id)?;
        Ok(doc_id)
    }

    fn sync_optional(&mut self, doc_id: DocId) -> Result<()> {
        self.optional_matches = false;
        if doc_id == 0 || !self.need_score || self.optional_exhausted {
            return Ok(());
        }

        let mut optional_doc = self.optional.doc_id();
        if optional_doc < doc_id {
            optional_doc = self.optional.advance(doc_id)?;
            if optional_doc == 0 {
                self.optional_exhausted = true;
            }
        }
        self.optional_matches = optional_doc == doc_id;
        Ok(())
    }

    pub(crate) fn score(&self) -> f32 {
        let required = self.required.score();
        if self.optional_matches {
            (required + self.optional.score()) * self.coord_both
        } else {
            required * self.coord_single
        }
    }

    pub(crate) fn doc_id(&self) -> DocId {
        self.required.doc_id()
    }

    pub(crate) fn cost(&self) -> u64 {
        self.required.cost()
    }
}
