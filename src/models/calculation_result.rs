//! Calculation result models for the Payslip Engine.
//!
//! This module contains the [`CalculationResult`] type, a flat breakdown of
//! every intermediate and final amount on the payslip, and the audit types
//! recording how each amount was reached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute or policy item behind this rule.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated while normalizing input.
///
/// Warnings never stop a calculation; they tell the client which raw values
/// were replaced before the calculation ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete breakdown of a payslip.
///
/// Produced wholesale by every calculation; nothing in it is ever mutated
/// afterwards. The following identities always hold:
///
/// - `gross_total = taxable_total_with_vacation + indemnity_total
///   + thirteenth_first_installment + thirteenth_second_installment`
/// - `total_deductions = social_security_contribution
///   + social_security_contribution_on_thirteenth + income_tax
///   + income_tax_on_thirteenth`
/// - `net_salary = gross_total - total_deductions`
///
/// # Example
///
/// ```
/// use payslip_engine::calculation::calculate_payroll;
/// use payslip_engine::config::PayrollPolicy;
/// use payslip_engine::models::InputParameters;
/// use rust_decimal::Decimal;
///
/// let input = InputParameters {
///     base_salary: Decimal::from(1000),
///     ..Default::default()
/// };
/// let result = calculate_payroll(&input, &PayrollPolicy::default());
///
/// assert_eq!(result.net_salary, result.gross_total - result.total_deductions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Qualification bonus (adicional de qualificação).
    pub qualification_bonus: Decimal,
    /// Base salary plus qualification bonus; the base for service-time bonuses.
    pub service_base: Decimal,
    /// Seniority bonus (quinquênios).
    pub seniority_bonus: Decimal,
    /// Loyalty bonus (sexta-parte).
    pub loyalty_bonus: Decimal,
    /// Taxable earnings before the vacation bonus.
    pub taxable_total: Decimal,
    /// One-third vacation bonus.
    pub vacation_bonus: Decimal,
    /// Taxable earnings including the vacation bonus.
    pub taxable_total_with_vacation: Decimal,
    /// Meal allowance.
    pub meal_allowance: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Health allowance after the disability surcharge.
    pub health_allowance_final: Decimal,
    /// Regular daycare allowance.
    pub daycare_regular_allowance: Decimal,
    /// Daycare allowance for children with a disability.
    pub daycare_disability_allowance: Decimal,
    /// Sum of all indemnity (non-taxable) allowances.
    pub indemnity_total: Decimal,
    /// First 13th-salary installment.
    pub thirteenth_first_installment: Decimal,
    /// Second 13th-salary installment.
    pub thirteenth_second_installment: Decimal,
    /// Everything paid this month.
    pub gross_total: Decimal,
    /// Social-security contribution on the regular taxable total.
    pub social_security_contribution: Decimal,
    /// Social-security contribution withheld on the 13th salary.
    pub social_security_contribution_on_thirteenth: Decimal,
    /// Income tax on the regular taxable total.
    pub income_tax: Decimal,
    /// Income tax withheld on the 13th salary.
    pub income_tax_on_thirteenth: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Gross total minus deductions.
    pub net_salary: Decimal,
    /// Every rule applied, in order.
    pub audit_steps: Vec<AuditStep>,
}

impl CalculationResult {
    /// Returns the sum of both 13th-salary installments.
    pub fn thirteenth_total(&self) -> Decimal {
        self.thirteenth_first_installment + self.thirteenth_second_installment
    }
}
