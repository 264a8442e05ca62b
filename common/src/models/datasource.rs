//! Data source connection models.
//!
//! The host owns and persists these objects. Editors see them as the raw JSON
//! the host handed over and touch only the keys they default; the data source
//! reads a typed view of the same object.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Data source settings as bound to the connection configuration editor.
///
/// Holds the host object verbatim, with `jsonData` kept apart so that its
/// presence is guaranteed by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionConfig {
    fields: Map<String, Value>,
    json_data: Map<String, Value>,
}

impl ConnectionConfig {
    /// Converts a host-supplied JSON object into a config.
    ///
    /// The host is expected to allocate `jsonData` before the editor is shown;
    /// a value without it is rejected here rather than inside the editor.
    /// No other key is inspected.
    ///
    /// # Errors
    /// Returns `AppError::InvalidBoundState` if the value is not an object or
    /// lacks a `jsonData` object.
    pub fn from_host_value(value: Value) -> AppResult<Self> {
        let Value::Object(mut fields) = value else {
            return Err(AppError::InvalidBoundState(
                "data source settings must be an object".into(),
            ));
        };
        match fields.remove("jsonData") {
            Some(Value::Object(json_data)) => Ok(Self { fields, json_data }),
            Some(_) => Err(AppError::InvalidBoundState("jsonData must be an object".into())),
            None => Err(AppError::InvalidBoundState("jsonData is missing".into())),
        }
    }

    /// Returns the object exactly as the host will read it back.
    pub fn to_host_value(&self) -> Value {
        let mut fields = self.fields.clone();
        fields.insert("jsonData".to_string(), Value::Object(self.json_data.clone()));
        Value::Object(fields)
    }

    /// Top-level host fields other than `jsonData`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Connection-mode settings.
    pub fn json_data(&self) -> &Map<String, Value> {
        &self.json_data
    }

    /// Mutable connection-mode settings.
    pub fn json_data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.json_data
    }

    /// Builds the typed settings the data source needs.
    ///
    /// # Errors
    /// Returns `AppError::InvalidBoundState` if a known field has the wrong type.
    pub fn settings(&self) -> AppResult<DataSourceSettings> {
        serde_json::from_value(self.to_host_value())
            .map_err(|e| AppError::InvalidBoundState(e.to_string()))
    }
}

/// Typed `jsonData` keys the data source reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JsonData {
    /// Whether the target schema uses TimescaleDB-style time bucketing.
    #[serde(default)]
    pub timescaledb: Option<bool>,
}

/// Strictly typed view of the settings, used when building the data source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSettings {
    /// Database address (`host:port`).
    #[serde(default)]
    #[validate(required(message = "url is required"), length(min = 1, message = "url is required"))]
    pub url: Option<String>,
    /// Database user.
    #[serde(default)]
    pub user: Option<String>,
    /// Database (service) name.
    #[serde(default)]
    #[validate(
        required(message = "database is required"),
        length(min = 1, message = "database is required")
    )]
    pub database: Option<String>,
    /// Connection-mode settings.
    #[serde(default)]
    pub json_data: JsonData,
    /// Decrypted secrets (e.g. `password`).
    #[serde(default)]
    pub secure_json_data: BTreeMap<String, Option<String>>,
}

impl DataSourceSettings {
    /// Returns the decrypted password, if one is stored.
    pub fn password(&self) -> Option<&str> {
        self.secure_json_data.get("password").and_then(|p| p.as_deref())
    }

    /// Returns whether the target uses TimescaleDB (defaults to `false`).
    pub fn timescaledb(&self) -> bool {
        self.json_data.timescaledb.unwrap_or(false)
    }
}
