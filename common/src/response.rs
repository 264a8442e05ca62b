//! Output envelope types.
//!
//! Everything the host harness prints is wrapped in this format.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;

/// Standard output wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the invocation was successful.
    pub success: bool,

    /// Payload (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// Invocation metadata.
    pub meta: ResponseMeta,
}

/// Error details.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error code for host handling (e.g., "INVALID_BOUND_STATE").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// Invocation metadata.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    /// Invocation ID for tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,

    /// Response timestamp.
    pub timestamp: DateTime<Utc>,

    /// Processing time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Service that produced the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            invocation_id: None,
            timestamp: Utc::now(),
            duration_ms: None,
            service: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: ResponseMeta::default(),
        }
    }

    /// Sets the invocation ID on the response.
    pub fn with_invocation_id(mut self, invocation_id: impl Into<String>) -> Self {
        self.meta.invocation_id = Some(invocation_id.into());
        self
    }

    /// Sets the duration on the response.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.meta.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the service name on the response.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.meta.service = Some(service.into());
        self
    }
}

impl ApiResponse<()> {
    /// Creates an error response.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
            meta: ResponseMeta::default(),
        }
    }
}

impl From<&AppError> for ApiResponse<()> {
    fn from(err: &AppError) -> Self {
        ApiResponse::err(err.code(), err.to_string())
    }
}
