//! 宿主命令实现
//!
//! Each command plays one step of what the dashboard host does with the
//! plugin module, reading and writing bound objects as JSON files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use common::config::AppConfig;
use common::errors::AppResult;
use common::models::{ColumnInfo, ConnectionConfig, MetricQuery, TimeRange};
use oracle_datasource::{MacroEngine, OracleDatasource, RowTransformer};
use oracle_plugin::{ExportDescriptor, PluginModule};

/// Result of instantiating a component around a bound object.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    /// Export that was instantiated.
    pub export: String,
    /// Canonical implementation name.
    pub implementation: &'static str,
    /// Template resolved against the plugin directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_path: Option<PathBuf>,
    /// Bound object after construction.
    pub bound_state: Value,
    /// Whether the bound object was written back to its file.
    pub written: bool,
}

/// Result of expanding a query's macros.
#[derive(Debug, Serialize)]
pub struct InterpolateOutput {
    /// SQL with every macro expanded.
    pub sql: String,
    /// Query target after expansion (carries fill settings).
    pub query: Value,
}

/// Raw driver result read by [`transform`].
#[derive(Debug, Deserialize)]
pub struct RawResult {
    /// Column metadata as reported by the driver.
    pub columns: Vec<ColumnInfo>,
    /// Rows of driver values, one entry per column.
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// Result of normalizing driver rows.
#[derive(Debug, Serialize)]
pub struct TransformOutput {
    /// Column metadata, unchanged.
    pub columns: Vec<ColumnInfo>,
    /// Rows after conversion.
    pub rows: Vec<Vec<Value>>,
}

/// Lists the module's bindings.
pub fn exports(module: &PluginModule) -> Vec<ExportDescriptor> {
    module.exports().map(ExportDescriptor::from).collect()
}

/// Instantiates `export` around the JSON object stored in `path`.
///
/// With `write`, the bound state after construction replaces the file content.
pub fn init(
    module: &PluginModule,
    config: &AppConfig,
    export: &str,
    path: &Path,
    write: bool,
) -> AppResult<InitOutput> {
    let bound = read_json(path)?;
    let component = module.instantiate(export, bound)?;
    let bound_state = component.bound_state()?;

    if write {
        std::fs::write(path, serde_json::to_string_pretty(&bound_state)?)?;
        tracing::info!(export, path = %path.display(), "Bound state written back");
    }

    Ok(InitOutput {
        export: export.to_string(),
        implementation: component.name(),
        template_path: component.template_url().map(|url| config.template_path(url)),
        bound_state,
        written: write,
    })
}

/// Expands the macros in the query stored in `path` for the given range.
///
/// When `datasource` points at data source settings, their macro engine is
/// used; otherwise a default engine.
pub fn interpolate(
    path: &Path,
    from: &str,
    to: &str,
    datasource: Option<&Path>,
) -> AppResult<InterpolateOutput> {
    let mut query = MetricQuery::from_host_value(read_json(path)?)?;
    let time_range = TimeRange::parse(from, to)?;

    let sql = match datasource {
        Some(settings_path) => {
            let settings = ConnectionConfig::from_host_value(read_json(settings_path)?)?;
            OracleDatasource::new(settings)?.interpolate(&mut query, &time_range)?
        }
        None => {
            let raw_sql = query.raw_sql.clone().unwrap_or_default();
            MacroEngine::default().interpolate(&mut query, &time_range, &raw_sql)?
        }
    };

    Ok(InterpolateOutput {
        sql,
        query: query.to_host_value()?,
    })
}

/// Normalizes the driver rows stored in `path`.
///
/// The first malformed row aborts the command.
pub fn transform(path: &Path) -> AppResult<TransformOutput> {
    let raw: RawResult = serde_json::from_value(read_json(path)?)?;
    let transformer = RowTransformer::new();

    let rows = raw
        .rows
        .into_iter()
        .map(|row| transformer.transform(&raw.columns, row))
        .collect::<AppResult<Vec<_>>>()?;
    tracing::debug!(rows = rows.len(), columns = raw.columns.len(), "Rows transformed");

    Ok(TransformOutput {
        columns: raw.columns,
        rows,
    })
}

fn read_json(path: &Path) -> AppResult<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::errors::AppError;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn plugin() -> &'static PluginModule {
        oracle_plugin::module().unwrap()
    }

    #[test]
    fn test_exports_lists_five_bindings() {
        let listed = exports(plugin());
        assert_eq!(listed.len(), 5);
        assert!(listed
            .iter()
            .any(|e| e.name == "OracleDatasource" && e.implementation == "OracleDatasource"));
    }

    #[test]
    fn test_init_config_without_write() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ds.json", &json!({ "jsonData": {} }));

        let out = init(plugin(), &AppConfig::default(), "ConfigCtrl", &path, false).unwrap();
        assert_eq!(out.implementation, "OracleConfigCtrl");
        assert_eq!(out.bound_state["jsonData"]["sslmode"], "verify-full");
        assert!(out
            .template_path
            .unwrap()
            .ends_with("partials/config.html"));

        let on_disk = read_json(&path).unwrap();
        assert_eq!(on_disk, json!({ "jsonData": {} }));
    }

    #[test]
    fn test_init_annotation_with_write() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "annotation.json", &json!({ "name": "deploys" }));

        let out = init(plugin(), &AppConfig::default(), "AnnotationsQueryCtrl", &path, true).unwrap();
        assert!(out.written);

        let on_disk = read_json(&path).unwrap();
        assert_eq!(on_disk["rawQuery"], oracle_plugin::DEFAULT_QUERY);
        assert_eq!(on_disk["name"], "deploys");
    }

    #[test]
    fn test_init_reports_bad_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            init(plugin(), &AppConfig::default(), "ConfigCtrl", &missing, false),
            Err(AppError::Io(_))
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            init(plugin(), &AppConfig::default(), "ConfigCtrl", &garbage, false),
            Err(AppError::Serialization(_))
        ));
    }

    #[test]
    fn test_interpolate_with_default_engine() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "query.json",
            &json!({ "refId": "A", "rawSql": "SELECT $__timeGroup(ts, '1m', NULL) FROM t" }),
        );

        let out = interpolate(&path, "0", "60000", None).unwrap();
        assert_eq!(
            out.sql,
            "SELECT trunc( (CAST(ts as DATE) - trunc(ts)) * 1440 )/ 1440 + trunc( ts ) FROM t"
        );
        assert_eq!(out.query["fill"]["mode"], "null");
        assert_eq!(out.query["refId"], "A");
    }

    #[test]
    fn test_interpolate_with_datasource_settings() {
        let dir = TempDir::new().unwrap();
        let query = write_file(&dir, "query.json", &json!({ "rawSql": "$__timeFrom()" }));
        let settings = write_file(
            &dir,
            "ds.json",
            &json!({ "url": "db:1521", "database": "ORCL", "jsonData": {} }),
        );

        let out = interpolate(&query, "0", "1000", Some(&settings)).unwrap();
        assert_eq!(out.sql, "'1970-01-01T00:00:00Z'");
    }

    #[test]
    fn test_interpolate_surfaces_macro_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "query.json", &json!({ "rawSql": "$__nope(x)" }));
        assert!(matches!(
            interpolate(&path, "0", "1000", None),
            Err(AppError::Macro(_))
        ));
    }

    #[test]
    fn test_transform_normalizes_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "result.json",
            &json!({
                "columns": [
                    { "name": "value", "data_type": "SQLT_NUM" },
                    { "name": "metric", "data_type": "SQLT_CHR" }
                ],
                "rows": [["1.5", "cpu"], [null, null]]
            }),
        );

        let out = transform(&path).unwrap();
        assert_eq!(out.columns.len(), 2);
        assert_eq!(
            out.rows,
            vec![vec![json!(1.5), json!("cpu")], vec![json!(0.0), json!("")]]
        );
    }

    #[test]
    fn test_transform_rejects_short_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "result.json",
            &json!({
                "columns": [{ "name": "value", "data_type": "SQLT_NUM" }],
                "rows": [["1", "extra"]]
            }),
        );
        assert!(matches!(transform(&path), Err(AppError::RowShape(_))));
    }
}
