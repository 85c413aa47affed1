//! HTTP request handlers for the Payslip Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_payroll;

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse, PayslipResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/policy", get(policy_handler))
        .with_state(state)
}

fn rejection_to_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::malformed_json(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            warn!(correlation_id = %correlation_id, "Missing JSON content type");
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /calculate endpoint.
///
/// Normalizes the lenient request body, calculates the payslip under the
/// loaded policy and wraps it in a [`PayslipResponse`].
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = rejection_to_error(rejection, correlation_id);
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let config = state.config();
    let normalized = match request.normalize(config) {
        Ok(normalized) => normalized,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Request normalization failed"
            );
            let api_error: ApiErrorResponse = err.into();
            return api_error.into_response();
        }
    };

    if !normalized.warnings.is_empty() {
        warn!(
            correlation_id = %correlation_id,
            warnings = normalized.warnings.len(),
            "Input values replaced during normalization"
        );
    }

    let start_time = Instant::now();
    let result = calculate_payroll(&normalized.input, config.policy());
    let duration_us = u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX);

    info!(
        correlation_id = %correlation_id,
        gross_total = %result.gross_total,
        net_salary = %result.net_salary,
        thirteenth_total = %result.thirteenth_total(),
        audit_steps = result.audit_steps.len(),
        duration_us,
        "Calculation completed successfully"
    );

    let response = PayslipResponse {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        policy_version: config.policy().metadata.version.clone(),
        duration_us,
        input: normalized.input,
        warnings: normalized.warnings,
        result,
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(response),
    )
        .into_response()
}

/// Handler for GET /policy endpoint.
///
/// Returns the policy in force, including the health allowance bands that
/// clients offer as age choices.
async fn policy_handler(State(state): State<AppState>) -> impl IntoResponse {
    let policy = state.config().policy();
    info!(
        code = %policy.metadata.code,
        version = %policy.metadata.version,
        "Serving active policy"
    );
    Json(policy.clone())
}
