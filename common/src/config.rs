//! Plugin configuration.
//!
//! Values come from the process environment, falling back to a `.env` file in
//! the working directory, falling back to built-in defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::AppError;

/// Default plugin identifier registered with the host.
pub const DEFAULT_PLUGIN_ID: &str = "oci8";

/// Default directory that template URLs are resolved against.
pub const DEFAULT_PLUGIN_DIR: &str = "public/app/plugins/datasource/oci8";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unsupported LOG_FORMAT: {}", other))),
        }
    }
}

/// Configuration shared by the plugin crates.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the running service, reported in output metadata.
    pub service_name: String,
    /// Plugin identifier (the datasource type the host registers).
    pub plugin_id: String,
    /// Directory holding the plugin's view partials.
    pub plugin_dir: PathBuf,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_PLUGIN_ID.to_string(),
            plugin_id: DEFAULT_PLUGIN_ID.to_string(),
            plugin_dir: PathBuf::from(DEFAULT_PLUGIN_DIR),
            log_format: LogFormat::Plain,
        }
    }
}

impl AppConfig {
    /// Loads configuration for the named service from the environment and `.env`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a variable holds an unsupported value.
    pub fn load_with_service(service: &str) -> Result<Self, AppError> {
        let dotenv = read_dotenv(Path::new(".env"));
        Self::from_lookup(service, |key| {
            std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        })
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(service: &str, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            service_name: service.to_string(),
            plugin_id: lookup("PLUGIN_ID")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.plugin_id),
            plugin_dir: lookup("PLUGIN_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.plugin_dir),
            log_format,
        })
    }

    /// Resolves a component's template URL against the plugin directory.
    pub fn template_path(&self, template_url: &str) -> PathBuf {
        self.plugin_dir.join(template_url)
    }
}

/// Reads `KEY=VALUE` pairs from a dotenv file (best-effort, empty if missing).
fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    let Ok(content) = std::fs::read_to_string(path) else {
        return vars;
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            vars.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    tracing::debug!(path = %path.display(), count = vars.len(), "Loaded dotenv file");
    vars
}
