//! Metric query models.
//!
//! Contains the query editor's bound target, the dashboard time range and
//! column metadata for result rows.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

/// Result format requested by a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFormat {
    /// Rows become time series.
    TimeSeries,
    /// Rows are returned as a table.
    Table,
}

/// How gaps in a grouped time series are filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum FillMode {
    /// Missing points become null.
    Null,
    /// Missing points repeat the previous value.
    Previous,
    /// Missing points take a fixed value.
    Value(f64),
}

impl FillMode {
    /// Parses a fill argument as written in `$__timeGroup(col, interval, fill)`.
    ///
    /// # Errors
    /// Returns `AppError::Macro` if the argument is neither `NULL`, `previous`
    /// nor a number.
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "NULL" => Ok(FillMode::Null),
            "previous" => Ok(FillMode::Previous),
            other => other
                .parse::<f64>()
                .map(FillMode::Value)
                .map_err(|_| AppError::Macro(format!("error parsing fill value {}", other))),
        }
    }
}

/// Gap filling requested by a time-group macro.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillSettings {
    /// Bucket width in seconds.
    pub interval_seconds: f64,
    /// Fill strategy.
    #[serde(flatten)]
    pub mode: FillMode,
}

/// A query target bound to the query editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    /// Panel-local query identifier (`A`, `B`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// SQL text, possibly containing macros.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_sql: Option<String>,
    /// Requested result format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<QueryFormat>,
    /// Gap filling, set while expanding `$__timeGroup` with a fill argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillSettings>,
    /// Remaining host fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricQuery {
    /// Converts a host-supplied JSON object into a typed query.
    ///
    /// # Errors
    /// Returns `AppError::InvalidBoundState` if the value is not an object or
    /// has fields of the wrong type.
    pub fn from_host_value(value: Value) -> AppResult<Self> {
        if !value.is_object() {
            return Err(AppError::InvalidBoundState("query target must be an object".into()));
        }
        serde_json::from_value(value).map_err(|e| AppError::InvalidBoundState(e.to_string()))
    }

    /// Converts the query back into the JSON shape the host reads.
    pub fn to_host_value(&self) -> AppResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Enables gap filling for the given bucket width.
    ///
    /// # Errors
    /// Returns `AppError::Macro` if `fill` cannot be parsed.
    pub fn setup_fill(&mut self, interval: Duration, fill: &str) -> AppResult<()> {
        let mode = FillMode::parse(fill)?;
        self.fill = Some(FillSettings {
            interval_seconds: interval.as_secs_f64(),
            mode,
        });
        Ok(())
    }
}

/// Dashboard time range, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range.
    pub from: DateTime<Utc>,
    /// End of the range.
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a time range.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Parses a range from epoch-millisecond or RFC3339 strings.
    ///
    /// # Errors
    /// Returns `AppError::InvalidBoundState` if either bound is unparsable.
    pub fn parse(from: &str, to: &str) -> AppResult<Self> {
        Ok(Self {
            from: parse_instant(from)?,
            to: parse_instant(to)?,
        })
    }
}

fn parse_instant(raw: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = raw
            .parse()
            .map_err(|_| AppError::InvalidBoundState(format!("invalid epoch time: {}", raw)))?;
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| AppError::InvalidBoundState(format!("epoch time out of range: {}", raw)));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidBoundState(format!("invalid time: {}", raw)))
}

/// Column information in a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Driver-reported type name (e.g. `SQLT_NUM`).
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates column metadata.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill_mode_parse() {
        assert_eq!(FillMode::parse("NULL").unwrap(), FillMode::Null);
        assert_eq!(FillMode::parse("previous").unwrap(), FillMode::Previous);
        assert_eq!(FillMode::parse("1.5").unwrap(), FillMode::Value(1.5));
        assert!(matches!(FillMode::parse("null"), Err(AppError::Macro(_))));
    }

    #[test]
    fn test_setup_fill_records_interval() {
        let mut query = MetricQuery::default();
        query.setup_fill(Duration::from_secs(300), "0").unwrap();
        assert_eq!(
            query.fill,
            Some(FillSettings {
                interval_seconds: 300.0,
                mode: FillMode::Value(0.0)
            })
        );
    }

    #[test]
    fn test_fill_serializes_flat() {
        let mut query = MetricQuery::default();
        query.setup_fill(Duration::from_secs(60), "previous").unwrap();
        assert_eq!(
            query.to_host_value().unwrap(),
            json!({ "fill": { "intervalSeconds": 60.0, "mode": "previous" } })
        );
    }

    #[test]
    fn test_query_from_host_value() {
        let query = MetricQuery::from_host_value(json!({
            "refId": "A",
            "rawSql": "SELECT 1",
            "format": "time_series",
            "datasourceId": 3
        }))
        .unwrap();
        assert_eq!(query.ref_id.as_deref(), Some("A"));
        assert_eq!(query.format, Some(QueryFormat::TimeSeries));
        assert_eq!(query.extra.get("datasourceId"), Some(&json!(3)));
    }

    #[test]
    fn test_time_range_parse_epoch_and_rfc3339() {
        let range = TimeRange::parse("1500376552001", "2017-07-18T11:25:52Z").unwrap();
        assert_eq!(range.from.timestamp_millis(), 1_500_376_552_001);
        assert_eq!(range.to.timestamp(), 1_500_377_152);
        assert!(TimeRange::parse("yesterday", "now").is_err());
    }
}
