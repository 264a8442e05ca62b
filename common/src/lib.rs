//! Shared building blocks for the oci8 data-source plugin.
//!
//! Holds the bound-state models the host hands to the editors, the error
//! type, configuration loading and the JSON envelope used for host output.

pub mod config;
pub mod errors;
pub mod models;
pub mod response;
pub mod utils;

pub use errors::{AppError, AppResult};
