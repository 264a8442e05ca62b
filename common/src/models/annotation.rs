//! Annotation query models.

use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

/// Annotation source bound to the annotation query editor.
///
/// Holds the host object verbatim (`name`, `enable`, `iconColor`, `rawQuery`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationQuery {
    fields: Map<String, Value>,
}

impl AnnotationQuery {
    /// Creates an annotation with the given query text.
    pub fn with_raw_query(raw_query: impl Into<String>) -> Self {
        let mut annotation = Self::default();
        annotation.set_raw_query(raw_query);
        annotation
    }

    /// Converts a host-supplied JSON object into an annotation.
    ///
    /// # Errors
    /// Returns `AppError::InvalidBoundState` if the value is not an object.
    pub fn from_host_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(AppError::InvalidBoundState("annotation must be an object".into())),
        }
    }

    /// Returns the object exactly as the host will read it back.
    pub fn to_host_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// User-authored query, whatever JSON value the host stored.
    pub fn raw_query(&self) -> Option<&Value> {
        self.fields.get("rawQuery")
    }

    /// Replaces the query text.
    pub fn set_raw_query(&mut self, raw_query: impl Into<String>) {
        self.fields
            .insert("rawQuery".to_string(), Value::String(raw_query.into()));
    }
}
