//! Schema lookup used by compilers and sort validation.

use std::sync::Arc;

use ahash::AHashMap;

use crate::error::{LucerneError, Result};
use crate::query::similarity::{Similarity, TfIdfSimilarity};
use crate::schema::field::FieldDefinition;

/// The set of known fields.
///
/// Fields not present in the schema can still be searched; they score with
/// the default similarity and cannot be sorted on.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Map of field names to their definitions
    fields: AHashMap<String, FieldDefinition>,
    /// Ordered list of field names (for consistent ordering)
    field_names: Vec<String>,
    /// Similarity for fields without their own
    default_similarity: Arc<dyn Similarity>,
}

impl Schema {
    /// Create an empty schema scoring with TF-IDF.
    pub fn new() -> Self {
        Self::with_default_similarity(Arc::new(TfIdfSimilarity::new()))
    }

    /// Create an empty schema with a custom default similarity.
    pub fn with_default_similarity(default_similarity: Arc<dyn Similarity>) -> Self {
        Schema {
            fields: AHashMap::new(),
            field_names: Vec::new(),
            default_similarity,
        }
    }

    /// Add a field to the schema.
    pub fn add_field(&mut self, field: FieldDefinition) -> Result<()> {
        let name = field.name().to_string();

        if name.is_empty() {
            return Err(LucerneError::schema("Field name cannot be empty"));
        }
        if self.fields.contains_key(&name) {
            return Err(LucerneError::schema(format!(
                "Field '{name}' already exists"
            )));
        }

        self.fields.insert(name.clone(), field);
        self.field_names.push(name);

        Ok(())
    }

    /// Get a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Check if a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether `name` is a known, sortable field.
    pub fn is_sortable(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .map(|field| field.is_sortable())
            .unwrap_or(false)
    }

    /// The similarity that scores `name`.
    pub fn similarity(&self, name: &str) -> Arc<dyn Similarity> {
        self.fields
            .get(name)
            .and_then(|field| field.similarity().cloned())
            .unwrap_or_else(|| Arc::clone(&self.default_similarity))
    }

    /// The schema-wide default similarity.
    pub fn default_similarity(&self) -> &Arc<dyn Similarity> {
        &self.default_similarity
    }

    /// Replace the default similarity. Fields with their own similarity keep
    /// it.
    pub fn set_default_similarity(&mut self, similarity: Arc<dyn Similarity>) {
        self.default_similarity = similarity;
    }

    /// Get all field names in the order they were added.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing schemas.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDefinition>,
    default_similarity: Option<Arc<dyn Similarity>>,
}

impl SchemaBuilder {
    /// Create a new schema builder.
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    /// Add a field.
    pub fn add_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a plain searchable text field.
    pub fn add_text_field<S: Into<String>>(self, name: S) -> Self {
        self.add_field(FieldDefinition::new(name))
    }

    /// Add a sortable field.
    pub fn add_sortable_field<S: Into<String>>(self, name: S) -> Self {
        self.add_field(FieldDefinition::new(name).sortable(true))
    }

    /// Set the default similarity.
    pub fn default_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.default_similarity = Some(similarity);
        self
    }

    /// Build the schema, failing on duplicate or empty field names.
    pub fn build(self) -> Result<Schema> {
        let mut schema = match self.default_similarity {
            Some(similarity) => Schema::with_default_similarity(similarity),
            None => Schema::new(),
        };
        for field in self.fields {
            schema.add_field(field)?;
        }
        Ok(schema)
    }
}
