//! Bound-state models shared by the plugin crates.

pub mod annotation;
pub mod datasource;
pub mod query;

// Re-export commonly used types
pub use annotation::AnnotationQuery;
pub use datasource::{ConnectionConfig, DataSourceSettings, JsonData};
pub use query::{ColumnInfo, FillMode, FillSettings, MetricQuery, QueryFormat, TimeRange};

use serde_json::Value;

/// Returns true when a host field counts as unset: absent, null, `false`,
/// `0` or the empty string. Any other value, including non-strings, is set.
pub fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(None));
        assert!(is_falsy(Some(&Value::Null)));
        assert!(is_falsy(Some(&json!(""))));
        assert!(is_falsy(Some(&json!(false))));
        assert!(is_falsy(Some(&json!(0))));
        assert!(!is_falsy(Some(&json!("disable"))));
        assert!(!is_falsy(Some(&json!(" "))));
        assert!(!is_falsy(Some(&json!(42))));
        assert!(!is_falsy(Some(&json!({}))));
    }
}
