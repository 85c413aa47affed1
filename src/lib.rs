//! Payslip Engine for public-sector servants
//!
//! This crate calculates a monthly payslip: taxable earnings with seniority
//! and loyalty bonuses, the one-third vacation bonus, non-taxable indemnity
//! allowances, 13th-salary installments, the progressive social-security
//! contribution and income tax withholding. Every result carries an audit
//! trace of the rules applied.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
