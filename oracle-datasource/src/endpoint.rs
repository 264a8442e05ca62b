//! Query endpoint settings for the oci8 driver.
//!
//! Derives what the host's SQL engine needs to run queries for a data source:
//! driver name, connection string and which column types may carry metric
//! names. No connection is opened here.

use std::fmt;

use validator::Validate;

use common::errors::AppResult;
use common::models::{ConnectionConfig, DataSourceSettings, MetricQuery, TimeRange};

use crate::macros::MacroEngine;

/// Database driver name.
pub const DRIVER_NAME: &str = "oci8";

/// Column types that may hold a series name in time-series results.
pub const METRIC_COLUMN_TYPES: [&str; 5] = ["CHAR", "VARCHAR", "VARCHAR2", "TEXT", "NUMBER"];

/// Builds the oci8 connection string `user/password@url/database`.
///
/// The password comes from the decrypted secure settings; absent values
/// render as empty segments.
pub fn generate_connection_string(config: &DataSourceSettings) -> String {
    format!(
        "{}/{}@{}/{}",
        config.user.as_deref().unwrap_or_default(),
        config.password().unwrap_or_default(),
        config.url.as_deref().unwrap_or_default(),
        config.database.as_deref().unwrap_or_default(),
    )
}

fn redacted_connection_string(config: &DataSourceSettings) -> String {
    let password = if config.password().is_some() { "******" } else { "" };
    format!(
        "{}/{}@{}/{}",
        config.user.as_deref().unwrap_or_default(),
        password,
        config.url.as_deref().unwrap_or_default(),
        config.database.as_deref().unwrap_or_default(),
    )
}

/// Settings handed to the host's SQL query engine.
#[derive(Clone, PartialEq, Eq)]
pub struct QueryEndpointConfig {
    /// Driver name.
    pub driver_name: String,
    /// Full connection string, including the password.
    pub connection_string: String,
    /// Column types usable as metric names.
    pub metric_column_types: Vec<String>,
    /// Whether TimescaleDB bucketing is enabled.
    pub timescaledb: bool,
}

impl fmt::Debug for QueryEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEndpointConfig")
            .field("driver_name", &self.driver_name)
            .field("connection_string", &"<redacted>")
            .field("metric_column_types", &self.metric_column_types)
            .field("timescaledb", &self.timescaledb)
            .finish()
    }
}

/// The oci8 data source implementation exported to the host.
#[derive(Debug, Clone)]
pub struct OracleDatasource {
    settings: ConnectionConfig,
    endpoint: QueryEndpointConfig,
    macro_engine: MacroEngine,
}

impl OracleDatasource {
    /// Canonical export name.
    pub const NAME: &'static str = "OracleDatasource";

    /// Creates the data source from host settings.
    ///
    /// # Errors
    /// Returns `AppError::InvalidBoundState` if a known field has the wrong
    /// type and `AppError::Validation` if `url` or `database` is absent.
    pub fn new(settings: ConnectionConfig) -> AppResult<Self> {
        let typed = settings.settings()?;
        typed.validate()?;

        tracing::debug!(
            connection = %redacted_connection_string(&typed),
            "getEngine"
        );

        let timescaledb = typed.timescaledb();
        let endpoint = QueryEndpointConfig {
            driver_name: DRIVER_NAME.to_string(),
            connection_string: generate_connection_string(&typed),
            metric_column_types: METRIC_COLUMN_TYPES.iter().map(|t| t.to_string()).collect(),
            timescaledb,
        };

        Ok(Self {
            settings,
            endpoint,
            macro_engine: MacroEngine::new(timescaledb),
        })
    }

    /// Settings the data source was created from.
    pub fn settings(&self) -> &ConnectionConfig {
        &self.settings
    }

    /// Query engine settings.
    pub fn endpoint(&self) -> &QueryEndpointConfig {
        &self.endpoint
    }

    /// Macro engine for this data source.
    pub fn macro_engine(&self) -> &MacroEngine {
        &self.macro_engine
    }

    /// Expands macros in the query's `rawSql` for the given time range.
    pub fn interpolate(&self, query: &mut MetricQuery, time_range: &TimeRange) -> AppResult<String> {
        let sql = query.raw_sql.clone().unwrap_or_default();
        self.macro_engine.interpolate(query, time_range, &sql)
    }
}
