//! Oracle (oci8) data source.
//!
//! Everything the plugin knows about its backing database without talking to
//! it: how settings become a driver connection string, how SQL macros expand
//! against a dashboard time range, and how raw driver values are normalized.

pub mod duration;
pub mod endpoint;
pub mod macros;
pub mod row_transformer;

pub use endpoint::{
    generate_connection_string, OracleDatasource, QueryEndpointConfig, DRIVER_NAME,
    METRIC_COLUMN_TYPES,
};
pub use macros::{MacroEngine, TIME_FORMAT};
pub use row_transformer::RowTransformer;
