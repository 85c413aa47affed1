//! HTTP API module for the Payslip Engine.
//!
//! This module provides the REST API endpoints for calculating a payslip
//! and inspecting the policy in force.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CalculationRequest, NormalizedRequest, parse_decimal_text, parse_leading_integer,
    parse_thirteenth_mode,
};
pub use response::{ApiError, ApiErrorResponse, PayslipResponse};
pub use state::AppState;
