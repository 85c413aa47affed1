//! Configuration loading and management for the Payslip Engine.
//!
//! This module loads the payroll policy (earnings factors, allowance rates,
//! contribution and income tax tables, health allowance age bands) from YAML
//! files. Built-in defaults carry the current year's constants.
//!
//! # Example
//!
//! ```no_run
//! use payslip_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sp_2026").unwrap();
//! println!("Loaded policy: {}", config.policy().metadata.name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceRates, ContributionBracket, ContributionSchedule, EarningsRules,
    HealthAllowanceBracket, IncomeTaxSchedule, PayrollPolicy, PolicyMetadata, SlidingDeduction,
    TaxBracket,
};
