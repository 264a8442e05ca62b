//! SQL macro expansion.
//!
//! Queries may contain `$__name(args)` tokens that expand into Oracle SQL for
//! the current dashboard time range, e.g. `$__timeFilter(time_column)`.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use common::errors::{AppError, AppResult};
use common::models::{MetricQuery, TimeRange};

use crate::duration;

/// Oracle `TO_TIMESTAMP` format matching the RFC3339 strings the macros emit.
pub const TIME_FORMAT: &str = r#"YYYY-MM-DD"T"HH24:MI:SS"Z""#;

const DAY_SECONDS: f64 = 86400.0;

static MACRO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([_a-zA-Z0-9]+)\(([^\)]*)\)").expect("macro pattern is valid"));

/// Maps a `$__timeGroup` interval to an Oracle `TRUNC` date format, if it is one.
fn oracle_date_format(interval: &str) -> Option<&'static str> {
    let format = match interval {
        "CC" => "CC",
        "DAY" => "DAY",
        "1D" | "D" => "D",
        "DD" => "DD",
        "DDD" => "DDD",
        "DY" => "DY",
        "HH" => "HH",
        "HH12" => "HH12",
        "HH24" => "HH24",
        "1W" | "IW" => "IW",
        "IYYY" => "IYYY",
        "IYY" => "IYY",
        "IY" => "IY",
        "I" => "I",
        "J" => "J",
        "MI" => "MI",
        "MM" => "MM",
        "MON" => "MON",
        "MONTH" => "MONTH",
        "Q" => "Q",
        "RM" => "RM",
        "RR" => "RR",
        "RRRR" => "RRRR",
        "W" => "W",
        "WW" => "WW",
        "Y,YYY" => "Y,YYY",
        "YYYY" => "YYYY",
        "SYYYY" => "SYYYY",
        "YYY" => "YYY",
        "YY" => "YY",
        "Y" => "Y",
        _ => return None,
    };
    Some(format)
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Expands SQL macros for the oci8 data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroEngine {
    timescaledb: bool,
}

impl MacroEngine {
    /// Creates a macro engine.
    pub fn new(timescaledb: bool) -> Self {
        Self { timescaledb }
    }

    /// Whether the data source was configured for TimescaleDB.
    pub fn timescaledb(&self) -> bool {
        self.timescaledb
    }

    /// Replaces every macro in `sql`.
    ///
    /// `query` receives side settings some macros carry (gap filling).
    ///
    /// # Errors
    /// Returns the first `AppError::Macro` raised by any macro; no partial
    /// result is returned.
    pub fn interpolate(
        &self,
        query: &mut MetricQuery,
        time_range: &TimeRange,
        sql: &str,
    ) -> AppResult<String> {
        let mut result = String::with_capacity(sql.len());
        let mut last = 0;

        for caps in MACRO_RE.captures_iter(sql) {
            let Some(whole) = caps.get(0) else { continue };
            let (name, args) = split_macro(&caps);
            let expanded = self.evaluate(query, time_range, name, &args)?;

            result.push_str(&sql[last..whole.start()]);
            result.push_str(&expanded);
            last = whole.end();
        }
        result.push_str(&sql[last..]);

        tracing::debug!(from = %sql, to = %result, "Interpolated SQL macros");
        Ok(result)
    }

    fn evaluate(
        &self,
        query: &mut MetricQuery,
        time_range: &TimeRange,
        name: &str,
        args: &[&str],
    ) -> AppResult<String> {
        match name {
            "__time" => {
                let column = time_column(name, args)?;
                Ok(format!(r#"{} AS "time""#, column))
            }
            "__timeFilter" => {
                let column = time_column(name, args)?;
                Ok(format!(
                    "{} BETWEEN TO_TIMESTAMP('{}', '{}') AND TO_TIMESTAMP('{}', '{}')",
                    column,
                    format_time(&time_range.from),
                    TIME_FORMAT,
                    format_time(&time_range.to),
                    TIME_FORMAT
                ))
            }
            "__timeFrom" => Ok(format!("'{}'", format_time(&time_range.from))),
            "__timeTo" => Ok(format!("'{}'", format_time(&time_range.to))),
            "__timeGroup" => self.time_group(query, name, args),
            "__timeGroupAlias" => {
                let group = self.time_group(query, name, args)?;
                Ok(format!(r#"{} AS "time""#, group))
            }
            _ => Err(AppError::Macro(format!("unknown macro {}", name))),
        }
    }

    fn time_group(&self, query: &mut MetricQuery, name: &str, args: &[&str]) -> AppResult<String> {
        if args.len() < 2 {
            return Err(AppError::Macro(format!(
                "macro {} needs time column and interval and optional fill value",
                name
            )));
        }
        let column = args[0];
        let interval = args[1].trim_matches('\'');

        if let Some(format) = oracle_date_format(interval) {
            return Ok(format!("trunc({}, '{}')", column, format));
        }

        let seconds = duration::parse_seconds(interval)
            .filter(|s| *s != 0.0)
            .ok_or_else(|| AppError::Macro(format!("error parsing interval {}", args[1])))?;
        let buckets = DAY_SECONDS / seconds;
        if buckets < 1.0 {
            return Err(AppError::Macro(format!(
                "interval {} is longer than a day, use an Oracle date format instead",
                args[1]
            )));
        }

        if args.len() == 3 {
            query.setup_fill(Duration::from_secs_f64(seconds), args[2])?;
        }

        Ok(format!(
            "trunc( (CAST({col} as DATE) - trunc({col})) * {b} )/ {b} + trunc( {col} )",
            col = column,
            b = buckets
        ))
    }
}

fn split_macro<'a>(caps: &Captures<'a>) -> (&'a str, Vec<&'a str>) {
    let name = caps.get(1).map_or("", |m| m.as_str());
    let args = caps
        .get(2)
        .map_or("", |m| m.as_str())
        .split(',')
        .map(|arg| arg.trim_matches(' '))
        .collect();
    (name, args)
}

fn time_column<'a>(name: &str, args: &[&'a str]) -> AppResult<&'a str> {
    match args.first() {
        Some(&column) if !column.is_empty() => Ok(column),
        _ => Err(AppError::Macro(format!(
            "missing time column argument for macro {}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::models::{FillMode, FillSettings};

    fn range() -> TimeRange {
        TimeRange::new(
            Utc.timestamp_opt(1_500_376_552, 0).unwrap(),
            Utc.timestamp_opt(1_500_376_852, 0).unwrap(),
        )
    }

    fn expand(sql: &str) -> AppResult<String> {
        MacroEngine::default().interpolate(&mut MetricQuery::default(), &range(), sql)
    }

    #[test]
    fn test_time_macro() {
        assert_eq!(
            expand("select $__time(time_column)").unwrap(),
            r#"select time_column AS "time""#
        );
    }

    #[test]
    fn test_time_filter() {
        assert_eq!(
            expand("WHERE $__timeFilter(time_column)").unwrap(),
            "WHERE time_column BETWEEN TO_TIMESTAMP('2017-07-18T11:15:52Z', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') \
             AND TO_TIMESTAMP('2017-07-18T11:20:52Z', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"')"
        );
    }

    #[test]
    fn test_time_from_and_to() {
        assert_eq!(
            expand("$__timeFrom() / $__timeTo()").unwrap(),
            "'2017-07-18T11:15:52Z' / '2017-07-18T11:20:52Z'"
        );
    }

    #[test]
    fn test_time_group_with_oracle_format() {
        assert_eq!(
            expand("GROUP BY $__timeGroup(time_column, 'HH24')").unwrap(),
            "GROUP BY trunc(time_column, 'HH24')"
        );
        assert_eq!(
            expand("$__timeGroup(time_column, 1W)").unwrap(),
            "trunc(time_column, 'IW')"
        );
    }

    #[test]
    fn test_time_group_with_duration() {
        assert_eq!(
            expand("$__timeGroup(time_column, '5m')").unwrap(),
            "trunc( (CAST(time_column as DATE) - trunc(time_column)) * 288 )/ 288 + trunc( time_column )"
        );
    }

    #[test]
    fn test_time_group_alias() {
        assert_eq!(
            expand("$__timeGroupAlias(t, '1h')").unwrap(),
            r#"trunc( (CAST(t as DATE) - trunc(t)) * 24 )/ 24 + trunc( t ) AS "time""#
        );
    }

    #[test]
    fn test_time_group_sets_fill() {
        let mut query = MetricQuery::default();
        MacroEngine::default()
            .interpolate(&mut query, &range(), "$__timeGroup(t, '5m', previous)")
            .unwrap();
        assert_eq!(
            query.fill,
            Some(FillSettings {
                interval_seconds: 300.0,
                mode: FillMode::Previous
            })
        );
    }

    #[test]
    fn test_time_group_fill_needs_exactly_three_args() {
        let mut query = MetricQuery::default();
        let out = MacroEngine::default()
            .interpolate(&mut query, &range(), "$__timeGroup(t, '5m', 0, extra)")
            .unwrap();
        assert!(out.starts_with("trunc( (CAST(t as DATE)"));
        assert_eq!(query.fill, None);

        let mut query = MetricQuery::default();
        MacroEngine::default()
            .interpolate(&mut query, &range(), "$__timeGroup(t, '5m')")
            .unwrap();
        assert_eq!(query.fill, None);
    }

    #[test]
    fn test_time_group_rejects_long_interval() {
        assert!(matches!(
            expand("$__timeGroup(t, '48h')"),
            Err(AppError::Macro(_))
        ));
    }

    #[test]
    fn test_time_group_rejects_bad_input() {
        assert!(expand("$__timeGroup(t)").is_err());
        assert!(expand("$__timeGroup(t, 'soon')").is_err());
        assert!(expand("$__timeGroup(t, '0')").is_err());
        assert!(expand("$__timeGroup(t, '5m', lots)").is_err());
    }

    #[test]
    fn test_missing_column_and_unknown_macro() {
        assert!(expand("$__timeFilter()").is_err());
        let err = expand("select $__bogus(x)").unwrap_err();
        assert_eq!(err.to_string(), "macro error: unknown macro __bogus");
    }

    #[test]
    fn test_text_without_macros_is_unchanged() {
        let sql = "SELECT 1 FROM dual WHERE price > $5";
        assert_eq!(expand(sql).unwrap(), sql);
    }

    #[test]
    fn test_default_annotation_query_expands() {
        let sql = "SELECT\n  extract(epoch from time_column) AS time\nFROM\n  metric_table\nWHERE\n  $__timeFilter(time_column)\n";
        let out = expand(sql).unwrap();
        assert!(out.contains("time_column BETWEEN TO_TIMESTAMP('2017-07-18T11:15:52Z'"));
        assert!(out.ends_with("'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"')\n"));
    }
}
