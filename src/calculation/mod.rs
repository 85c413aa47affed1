//! Calculation logic for the Payslip Engine.
//!
//! This module contains the calculation functions for a monthly payslip:
//! earnings (taxable bonuses, vacation bonus, indemnity allowances and the
//! 13th salary), the progressive social-security contribution, income tax
//! withholding, and the orchestration that combines them.

mod contribution;
mod earnings;
mod income_tax;
mod payroll;

pub use contribution::{
    CONTRIBUTION_REF, ContributionResult, ContributionSlice, calculate_contribution,
};
pub use earnings::{
    EarningsBreakdown, EarningsResult, INDEMNITY_REF, SERVICE_TIME_REF, THIRTEENTH_SALARY_REF,
    VACATION_BONUS_REF, calculate_earnings,
};
pub use income_tax::{INCOME_TAX_REF, IncomeTaxResult, calculate_income_tax, find_bracket};
pub use payroll::{PayrollCalculator, calculate_payroll};
