//! Error types for the Payslip Engine.
//!
//! The calculation core is total and never fails; these errors come from the
//! layers around it: loading and validating the payroll policy, and resolving
//! a health-allowance bracket for a request that supplies an age.

use thiserror::Error;

/// The main error type for the Payslip Engine.
///
/// # Example
///
/// ```
/// use payslip_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The policy parsed but its values are inconsistent.
    #[error("Invalid policy field '{field}': {message}")]
    InvalidPolicy {
        /// The policy field that failed validation.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// No health-allowance age bracket covers the given age.
    #[error("No health allowance bracket covers age {age}")]
    HealthBracketNotFound {
        /// The age that was looked up.
        age: u32,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
