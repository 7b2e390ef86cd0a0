//! Stored document structure.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;

/// A stored document: a map of field names to values.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Document {
    /// The field values for this document
    fields: AHashMap<String, FieldValue>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document {
            fields: AHashMap::new(),
        }
    }

    /// Add a field value to the document.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        DocumentBuilder {
            document: Document::new(),
        }
    }

    /// Add a field of any supported type.
    pub fn field<S: Into<String>, V: Into<FieldValue>>(mut self, name: S, value: V) -> Self {
        self.document.add_field(name, value.into());
        self
    }

    /// Add a text field.
    pub fn add_text<S: Into<String>, T: Into<String>>(self, name: S, value: T) -> Self {
        self.field(name, FieldValue::Text(value.into()))
    }

    /// Add an integer field.
    pub fn add_integer<S: Into<String>>(self, name: S, value: i64) -> Self {
        self.field(name, FieldValue::Integer(value))
    }

    /// Add a float field.
    pub fn add_float<S: Into<String>>(self, name: S, value: f64) -> Self {
        self.field(name, FieldValue::Float(value))
    }

    /// Build the document.
    pub fn build(self) -> Document {
        self.document
    }
}
