//! Error types shared by all plugin crates.

use thiserror::Error;

/// Result alias used throughout the plugin.
pub type AppResult<T> = Result<T, AppError>;

/// Plugin error.
#[derive(Debug, Error)]
pub enum AppError {
    /// A host-supplied bound object does not have the expected shape.
    #[error("invalid bound state: {0}")]
    InvalidBoundState(String),

    /// The export surface is missing a role the host requires.
    #[error("plugin role not bound: {0}")]
    MissingRole(String),

    /// No export is registered under the requested name.
    #[error("unknown export: {0}")]
    UnknownExport(String),

    /// A required field is absent.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// SQL macro expansion failed.
    #[error("macro error: {0}")]
    Macro(String),

    /// A result row does not line up with its column types.
    #[error("row shape mismatch: {0}")]
    RowShape(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a bound-state file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns the stable error code reported to the host.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidBoundState(_) => "INVALID_BOUND_STATE",
            AppError::MissingRole(_) => "MISSING_ROLE",
            AppError::UnknownExport(_) => "UNKNOWN_EXPORT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Macro(_) => "MACRO_ERROR",
            AppError::RowShape(_) => "ROW_SHAPE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }
}
