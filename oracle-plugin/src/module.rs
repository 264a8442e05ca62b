//! The plugin module's export surface.
//!
//! | Export | Implementation |
//! |---|---|
//! | `Datasource`, `OracleDatasource` | [`OracleDatasource`] |
//! | `QueryCtrl` | [`OracleQueryCtrl`] |
//! | `ConfigCtrl` | [`OracleConfigCtrl`] |
//! | `AnnotationsQueryCtrl` | [`OracleAnnotationsQueryCtrl`] |

use once_cell::sync::OnceCell;
use serde_json::Value;

use common::errors::AppResult;
use common::models::ConnectionConfig;
use oracle_datasource::OracleDatasource;

use crate::annotations_ctrl::OracleAnnotationsQueryCtrl;
use crate::config_ctrl::OracleConfigCtrl;
use crate::query_ctrl::OracleQueryCtrl;
use crate::registry::{BoxedComponent, ComponentInfo, PluginComponent, PluginModule, PluginRole};

static MODULE: OnceCell<PluginModule> = OnceCell::new();

impl PluginComponent for OracleDatasource {
    fn name(&self) -> &'static str {
        OracleDatasource::NAME
    }

    fn template_url(&self) -> Option<&'static str> {
        None
    }

    fn bound_state(&self) -> AppResult<Value> {
        Ok(self.settings().to_host_value())
    }
}

fn create_datasource(bound: Value) -> AppResult<BoxedComponent> {
    let settings = ConnectionConfig::from_host_value(bound)?;
    Ok(Box::new(OracleDatasource::new(settings)?))
}

/// Registry entry for the data source.
pub fn datasource_info() -> ComponentInfo {
    ComponentInfo {
        implementation: OracleDatasource::NAME,
        template_url: None,
        factory: create_datasource,
    }
}

/// Builds and validates a fresh export surface.
pub fn build_module() -> AppResult<PluginModule> {
    PluginModule::builder()
        .export_as(OracleDatasource::NAME, datasource_info())
        .export_role(PluginRole::Datasource, datasource_info())
        .export_role(PluginRole::QueryCtrl, OracleQueryCtrl::info())
        .export_role(PluginRole::ConfigCtrl, OracleConfigCtrl::info())
        .export_role(PluginRole::AnnotationsQueryCtrl, OracleAnnotationsQueryCtrl::info())
        .build()
}

/// Returns the process-wide export surface, building it on first use.
pub fn module() -> AppResult<&'static PluginModule> {
    MODULE.get_or_try_init(build_module)
}
