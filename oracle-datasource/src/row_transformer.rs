//! Normalizes raw driver values.
//!
//! The oci8 driver reports NUMBER columns as strings and NULL text as null;
//! the host expects floats and empty strings respectively.

use serde_json::Value;

use common::errors::{AppError, AppResult};
use common::models::ColumnInfo;

/// Converts one result row at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowTransformer;

impl RowTransformer {
    /// Creates a row transformer.
    pub fn new() -> Self {
        Self
    }

    /// Converts the values of a single row according to its column types.
    ///
    /// # Errors
    /// Returns `AppError::RowShape` if the row and column counts differ.
    pub fn transform(&self, columns: &[ColumnInfo], mut values: Vec<Value>) -> AppResult<Vec<Value>> {
        if columns.len() != values.len() {
            return Err(AppError::RowShape(format!(
                "{} columns but {} values",
                columns.len(),
                values.len()
            )));
        }

        for (column, value) in columns.iter().zip(values.iter_mut()) {
            match column.data_type.as_str() {
                "SQLT_NUM" => convert_number(column, value),
                "SQLT_CHR" | "SQLT_AFC" => {
                    if value.is_null() {
                        *value = Value::String(String::new());
                    }
                }
                _ => {}
            }
        }

        Ok(values)
    }
}

fn convert_number(column: &ColumnInfo, value: &mut Value) {
    let converted = match &*value {
        Value::Null => Value::from(0.0),
        Value::String(raw) => {
            match raw.trim().parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(number) => Value::Number(number),
                None => {
                    tracing::debug!(column = %column.name, value = %raw, "Error converting numeric to float");
                    return;
                }
            }
        }
        _ => return,
    };
    *value = converted;
}
