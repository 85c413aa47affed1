//! Core data models for the Payslip Engine.
//!
//! This module contains the input snapshot and the calculation result.

mod calculation_result;
mod input;

pub use calculation_result::{AuditStep, AuditWarning, CalculationResult};
pub use input::{InputParameters, MAX_AMOUNT, MAX_COUNT, MAX_RATE, ThirteenthSalaryMode};
