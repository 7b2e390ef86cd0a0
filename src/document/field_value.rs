//! Field value types for stored documents.

use serde::{Deserialize, Serialize};

use crate::query::sort::SortValue;

/// A value stored in a document field.
///
/// ```
/// use lucerne::document::FieldValue;
///
/// let value = FieldValue::Integer(100);
/// assert_eq!(value.as_integer(), Some(100));
///
/// let text = FieldValue::Text("42".to_string());
/// assert_eq!(text.as_text(), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
}

impl FieldValue {
    /// Get the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The sort key for this value.
    ///
    /// Booleans sort as integers (`false < true`).
    pub fn to_sort_value(&self) -> SortValue {
        match self {
            FieldValue::Text(s) => SortValue::Text(s.clone()),
            FieldValue::Integer(i) => SortValue::Integer(*i),
            FieldValue::Float(f) => SortValue::Float(*f),
            FieldValue::Boolean(b) => SortValue::Integer(*b as i64),
            FieldValue::Null => SortValue::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}
