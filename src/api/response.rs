//! Response types for the Payslip Engine API.
//!
//! This module defines the successful payslip envelope, the error response
//! structures, and the mapping from [`EngineError`] to HTTP errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{AuditWarning, CalculationResult, InputParameters};

/// Response body for a successful `/calculate` request.
///
/// The calculation itself is deterministic; the identifiers and timing here
/// belong to the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that performed the calculation.
    pub engine_version: String,
    /// Version of the policy applied.
    pub policy_version: String,
    /// Calculation time in microseconds.
    pub duration_us: u64,
    /// The normalized input the calculation ran on.
    pub input: InputParameters,
    /// Raw values that were replaced during normalization.
    pub warnings: Vec<AuditWarning>,
    /// The payslip breakdown and audit trace.
    pub result: CalculationResult,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a health bracket not found error response.
    pub fn health_bracket_not_found(age: u32) -> Self {
        Self::with_details(
            "HEALTH_BRACKET_NOT_FOUND",
            format!("No health allowance bracket covers age {}", age),
            "Send health_allowance_base explicitly or an age covered by the policy",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidPolicy { field, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Invalid policy",
                    format!("{}: {}", field, message),
                ),
            },
            EngineError::HealthBracketNotFound { age } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::health_bracket_not_found(age),
            },
        }
    }
}
