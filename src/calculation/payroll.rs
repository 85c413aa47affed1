//! Payroll calculation orchestration.
//!
//! This module ties the earnings, contribution and income tax rules together
//! into a single [`CalculationResult`]. The calculation is pure: the same
//! input and policy always yield the same result, audit trace included.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::{AuditStep, CalculationResult, InputParameters};

use super::contribution::calculate_contribution;
use super::earnings::calculate_earnings;
use super::income_tax::calculate_income_tax;

/// Calculates a complete payslip.
///
/// Audit steps are numbered from 1 in the order the rules are applied:
/// the four earnings steps, the contribution, the income tax, the
/// withholding on the 13th salary when the second installment is paid, and
/// finally the net summary.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_payroll;
/// use payslip_engine::config::PayrollPolicy;
/// use payslip_engine::models::InputParameters;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let input = InputParameters {
///     base_salary: Decimal::from(10000),
///     qualification_rate: Decimal::from_str("0.1").unwrap(),
///     seniority_periods: 4,
///     dependents_count: 1,
///     ..Default::default()
/// };
///
/// let result = calculate_payroll(&input, &PayrollPolicy::default());
/// assert_eq!(result.taxable_total, Decimal::from(16400));
/// assert_eq!(result.net_salary, Decimal::from_str("12092.221305").unwrap());
/// ```
pub fn calculate_payroll(input: &InputParameters, policy: &PayrollPolicy) -> CalculationResult {
    let input = &input.clamped();
    let mut step_number: u32 = 1;

    let earnings = calculate_earnings(input, &policy.earnings, &policy.allowances, step_number);
    step_number += earnings.audit_steps.len() as u32;
    let breakdown = earnings.breakdown;
    let mut audit_steps = earnings.audit_steps;

    let contribution = calculate_contribution(
        breakdown.taxable_total_with_vacation,
        &policy.contribution,
        step_number,
    );
    audit_steps.push(contribution.audit_step);
    step_number += 1;

    let income_tax = calculate_income_tax(
        breakdown.taxable_total_with_vacation,
        contribution.amount,
        input.dependents_count,
        &policy.income_tax,
        step_number,
    );
    audit_steps.push(income_tax.audit_step);
    step_number += 1;

    // The 13th salary is withheld as a separate payment, never folded into
    // the regular monthly base.
    let (contribution_on_thirteenth, tax_on_thirteenth) = match breakdown.thirteenth_taxable_base
    {
        Some(base) => {
            let mut contribution = calculate_contribution(base, &policy.contribution, step_number);
            contribution.audit_step.rule_id = "social_security_contribution_13th".to_string();
            contribution.audit_step.rule_name =
                "Social Security Contribution on 13th Salary".to_string();
            audit_steps.push(contribution.audit_step);
            step_number += 1;

            let mut tax = calculate_income_tax(
                base,
                contribution.amount,
                input.dependents_count,
                &policy.income_tax,
                step_number,
            );
            tax.audit_step.rule_id = "income_tax_13th".to_string();
            tax.audit_step.rule_name = "Income Tax Withholding on 13th Salary".to_string();
            audit_steps.push(tax.audit_step);
            step_number += 1;

            (contribution.amount, tax.amount)
        }
        None => (Decimal::ZERO, Decimal::ZERO),
    };

    let total_deductions =
        contribution.amount + contribution_on_thirteenth + income_tax.amount + tax_on_thirteenth;
    let net_salary = breakdown.gross_total - total_deductions;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        legal_ref: policy.metadata.code.clone(),
        input: serde_json::json!({
            "gross_total": breakdown.gross_total.normalize().to_string(),
            "social_security_contribution": contribution.amount.normalize().to_string(),
            "social_security_contribution_on_thirteenth":
                contribution_on_thirteenth.normalize().to_string(),
            "income_tax": income_tax.amount.normalize().to_string(),
            "income_tax_on_thirteenth": tax_on_thirteenth.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.normalize().to_string(),
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Gross R${} - deductions R${} = net R${}",
            breakdown.gross_total.normalize(),
            total_deductions.normalize(),
            net_salary.normalize()
        ),
    });

    CalculationResult {
        qualification_bonus: breakdown.qualification_bonus,
        service_base: breakdown.service_base,
        seniority_bonus: breakdown.seniority_bonus,
        loyalty_bonus: breakdown.loyalty_bonus,
        taxable_total: breakdown.taxable_total,
        vacation_bonus: breakdown.vacation_bonus,
        taxable_total_with_vacation: breakdown.taxable_total_with_vacation,
        meal_allowance: breakdown.meal_allowance,
        transport_allowance: breakdown.transport_allowance,
        health_allowance_final: breakdown.health_allowance_final,
        daycare_regular_allowance: breakdown.daycare_regular_allowance,
        daycare_disability_allowance: breakdown.daycare_disability_allowance,
        indemnity_total: breakdown.indemnity_total,
        thirteenth_first_installment: breakdown.thirteenth_first_installment,
        thirteenth_second_installment: breakdown.thirteenth_second_installment,
        gross_total: breakdown.gross_total,
        social_security_contribution: contribution.amount,
        social_security_contribution_on_thirteenth: contribution_on_thirteenth,
        income_tax: income_tax.amount,
        income_tax_on_thirteenth: tax_on_thirteenth,
        total_deductions,
        net_salary,
        audit_steps,
    }
}

/// A calculator bound to one policy.
///
/// Cheap to clone and safe to share; each call to
/// [`PayrollCalculator::calculate`] is independent.
#[derive(Debug, Clone, Default)]
pub struct PayrollCalculator {
    policy: PayrollPolicy,
}

impl PayrollCalculator {
    /// Creates a calculator for the given policy.
    pub fn new(policy: PayrollPolicy) -> Self {
        Self { policy }
    }

    /// Returns the policy this calculator applies.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }

    /// Calculates a payslip under this calculator's policy.
    pub fn calculate(&self, input: &InputParameters) -> CalculationResult {
        calculate_payroll(input, &self.policy)
    }
}
