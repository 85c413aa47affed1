//! Income tax (IRPF) withholding calculation functionality.
//!
//! The bracket is chosen by the gross taxable total, while the rate is applied
//! to the tax base (taxable total minus contribution minus dependent
//! deductions). Totals at or below the exemption threshold pay nothing, and
//! totals up to the sliding-deduction threshold get an extra reduction that
//! shrinks linearly with income.

use rust_decimal::Decimal;

use crate::config::{IncomeTaxSchedule, TaxBracket};
use crate::models::AuditStep;

/// Legal reference for the withholding table and the exemption.
pub const INCOME_TAX_REF: &str = "Lei 15.270/2025";

/// The result of calculating income tax, including the audit step.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// The tax to withhold; never negative.
    pub amount: Decimal,
    /// Taxable total minus contribution minus dependent deductions.
    pub tax_base: Decimal,
    /// Total deduction for dependents.
    pub dependent_deduction: Decimal,
    /// Whether the taxable total fell under the exemption threshold.
    pub exempt: bool,
    /// Index of the bracket applied; `None` when exempt.
    pub bracket_index: Option<usize>,
    /// `tax_base * rate - deduction` for the applied bracket, before the
    /// sliding deduction and the zero floor.
    pub bracket_tax: Decimal,
    /// Extra reduction applied; zero outside the sliding range.
    pub sliding_deduction: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Finds the bracket covering a gross taxable total.
///
/// Upper bounds are inclusive. A total above every bound falls into the last
/// bracket even when that bracket is bounded.
pub fn find_bracket(
    brackets: &[TaxBracket],
    taxable_total: Decimal,
) -> Option<(usize, &TaxBracket)> {
    brackets
        .iter()
        .enumerate()
        .find(|(_, b)| b.upper_bound.is_none_or(|upper| taxable_total <= upper))
        .or_else(|| brackets.iter().enumerate().last())
}

/// Calculates the income tax withheld on a taxable total.
///
/// # Arguments
///
/// * `taxable_total` - Gross taxable earnings for the month
/// * `contribution` - Social-security contribution already withheld on `taxable_total`
/// * `dependents_count` - Dependents declared for income tax
/// * `schedule` - The income tax schedule from the policy
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_income_tax;
/// use payslip_engine::config::IncomeTaxSchedule;
/// use rust_decimal::Decimal;
///
/// let schedule = IncomeTaxSchedule::default();
/// let exempt = calculate_income_tax(Decimal::from(4800), Decimal::from(500), 0, &schedule, 1);
/// assert_eq!(exempt.amount, Decimal::ZERO);
/// assert!(exempt.exempt);
/// ```
pub fn calculate_income_tax(
    taxable_total: Decimal,
    contribution: Decimal,
    dependents_count: u32,
    schedule: &IncomeTaxSchedule,
    step_number: u32,
) -> IncomeTaxResult {
    let dependent_deduction = schedule.dependent_deduction * Decimal::from(dependents_count);
    let tax_base = (taxable_total - contribution - dependent_deduction).max(Decimal::ZERO);
    let exempt = taxable_total <= schedule.exemption_threshold;

    let (bracket_index, bracket_tax, sliding_deduction) = if exempt {
        (None, Decimal::ZERO, Decimal::ZERO)
    } else {
        let (index, bracket_tax) = match find_bracket(&schedule.brackets, taxable_total) {
            Some((index, bracket)) => (Some(index), tax_base * bracket.rate - bracket.deduction),
            None => (None, Decimal::ZERO),
        };

        let sliding = &schedule.sliding_deduction;
        let sliding_deduction = if taxable_total <= sliding.threshold {
            (sliding.base - sliding.slope * taxable_total).max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        (index, bracket_tax, sliding_deduction)
    };

    let amount = (bracket_tax - sliding_deduction).max(Decimal::ZERO);

    let reasoning = if exempt {
        format!(
            "Taxable total R${} at or below exemption threshold R${} - no tax",
            taxable_total.normalize(),
            schedule.exemption_threshold.normalize()
        )
    } else {
        let mut reasoning = match bracket_index.and_then(|i| schedule.brackets.get(i)) {
            Some(bracket) => format!(
                "Tax base R${} x {}% - R${} = R${}",
                tax_base.normalize(),
                (bracket.rate * Decimal::ONE_HUNDRED).normalize(),
                bracket.deduction.normalize(),
                bracket_tax.normalize()
            ),
            None => "No tax bracket configured - no tax".to_string(),
        };
        if sliding_deduction > Decimal::ZERO {
            reasoning.push_str(&format!(
                "; sliding deduction R${}",
                sliding_deduction.normalize()
            ));
        }
        if bracket_tax - sliding_deduction < Decimal::ZERO {
            reasoning.push_str("; floored at zero");
        }
        reasoning
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Income Tax Withholding".to_string(),
        legal_ref: INCOME_TAX_REF.to_string(),
        input: serde_json::json!({
            "taxable_total": taxable_total.normalize().to_string(),
            "contribution": contribution.normalize().to_string(),
            "dependents_count": dependents_count
        }),
        output: serde_json::json!({
            "dependent_deduction": dependent_deduction.normalize().to_string(),
            "tax_base": tax_base.normalize().to_string(),
            "exempt": exempt,
            "bracket_index": bracket_index,
            "bracket_tax": bracket_tax.normalize().to_string(),
            "sliding_deduction": sliding_deduction.normalize().to_string(),
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    IncomeTaxResult {
        amount,
        tax_base,
        dependent_deduction,
        exempt,
        bracket_index,
        bracket_tax,
        sliding_deduction,
        audit_step,
    }
}
