//! Entry point of the oci8 data-source plugin.
//!
//! Exposes the editors the host instantiates while a user configures the data
//! source, and the export surface the host's plugin loader reads:
//!
//! - [`OracleConfigCtrl`] seeds `jsonData.sslmode`.
//! - [`OracleQueryCtrl`] edits panel queries.
//! - [`OracleAnnotationsQueryCtrl`] seeds `rawQuery`.
//! - [`module()`] maps role names to all of the above and to the data source.

pub mod annotations_ctrl;
pub mod config_ctrl;
pub mod module;
pub mod query_ctrl;
pub mod registry;

pub use annotations_ctrl::OracleAnnotationsQueryCtrl;
pub use config_ctrl::{OracleConfigCtrl, DEFAULT_SSL_MODE};
pub use module::{build_module, module};
pub use oracle_datasource::OracleDatasource;
pub use query_ctrl::{OracleQueryCtrl, DEFAULT_QUERY};
pub use registry::{
    BoxedComponent, ComponentFactory, ComponentInfo, Export, ExportDescriptor, PluginComponent,
    PluginModule, PluginRole,
};
