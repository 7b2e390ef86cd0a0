//! Per-field definitions.

use std::sync::Arc;

use crate::query::similarity::Similarity;

/// The definition of a single field.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    sortable: bool,
    similarity: Option<Arc<dyn Similarity>>,
}

impl FieldDefinition {
    /// Create an unsortable field that scores with the schema default.
    pub fn new<S: Into<String>>(name: S) -> Self {
        FieldDefinition {
            name: name.into(),
            sortable: false,
            similarity: None,
        }
    }

    /// Mark the field as usable in a field sort rule.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Score this field with a specific similarity.
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Get the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the field can be sorted on.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// The field-specific similarity, if one was set.
    pub fn similarity(&self) -> Option<&Arc<dyn Similarity>> {
        self.similarity.as_ref()
    }
}
