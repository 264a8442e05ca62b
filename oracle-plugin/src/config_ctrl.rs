//! Connection configuration editor.

use serde_json::Value;

use common::errors::AppResult;
use common::models::{is_falsy, ConnectionConfig};

use crate::registry::{BoxedComponent, ComponentInfo, PluginComponent};

/// Connection mode used when none has been chosen.
pub const DEFAULT_SSL_MODE: &str = "verify-full";

/// Fills `jsonData.sslmode` with [`DEFAULT_SSL_MODE`] when it is unset.
///
/// A value the user already chose is never replaced, so applying this any
/// number of times gives the same result as applying it once.
pub fn apply_defaults(config: &mut ConnectionConfig) {
    if is_falsy(config.json_data().get("sslmode")) {
        tracing::debug!(sslmode = DEFAULT_SSL_MODE, "Seeding default connection mode");
        config
            .json_data_mut()
            .insert("sslmode".to_string(), Value::String(DEFAULT_SSL_MODE.to_string()));
    }
}

/// Editor bound to the data source settings.
#[derive(Debug, Clone)]
pub struct OracleConfigCtrl {
    current: ConnectionConfig,
}

impl OracleConfigCtrl {
    /// Canonical implementation name.
    pub const NAME: &'static str = "OracleConfigCtrl";

    /// View template.
    pub const TEMPLATE_URL: &'static str = "partials/config.html";

    /// Binds the editor to `current`, seeding defaults.
    pub fn new(mut current: ConnectionConfig) -> Self {
        apply_defaults(&mut current);
        Self { current }
    }

    /// The bound settings.
    pub fn current(&self) -> &ConnectionConfig {
        &self.current
    }

    /// Releases the bound settings back to the host.
    pub fn into_current(self) -> ConnectionConfig {
        self.current
    }

    /// Registry entry for this editor.
    pub fn info() -> ComponentInfo {
        ComponentInfo {
            implementation: Self::NAME,
            template_url: Some(Self::TEMPLATE_URL),
            factory: create,
        }
    }
}

fn create(bound: Value) -> AppResult<BoxedComponent> {
    let current = ConnectionConfig::from_host_value(bound)?;
    Ok(Box::new(OracleConfigCtrl::new(current)))
}

impl PluginComponent for OracleConfigCtrl {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn template_url(&self) -> Option<&'static str> {
        Some(Self::TEMPLATE_URL)
    }

    fn bound_state(&self) -> AppResult<Value> {
        Ok(self.current.to_host_value())
    }
}
