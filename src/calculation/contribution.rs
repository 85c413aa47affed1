//! Social-security contribution calculation functionality.
//!
//! This module computes the progressive SPPREV contribution: the taxable
//! base is clamped to the base cap, sliced across the schedule's brackets,
//! each slice taxed at its own rate, and the sum clamped to an absolute
//! ceiling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ContributionSchedule;
use crate::models::AuditStep;

/// Legal reference for the progressive contribution.
pub const CONTRIBUTION_REF: &str = "LC 1.354/2020";

/// The portion of the base that fell inside one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSlice {
    /// Lower bound of the bracket (exclusive of the previous bracket's amount).
    pub lower_bound: Decimal,
    /// Upper bound of the bracket; `None` for the open-ended top bracket.
    pub upper_bound: Option<Decimal>,
    /// Rate for the bracket.
    pub rate: Decimal,
    /// Amount of the base inside the bracket.
    pub portion: Decimal,
    /// Contribution from this bracket (`portion * rate`).
    pub amount: Decimal,
}

/// The result of calculating the contribution, including the audit step.
#[derive(Debug, Clone)]
pub struct ContributionResult {
    /// The contribution to withhold.
    pub amount: Decimal,
    /// The taxable base that was passed in.
    pub taxable_base: Decimal,
    /// The base after clamping to `[0, base_cap]`.
    pub contribution_base: Decimal,
    /// Whether the base cap reduced the base.
    pub base_capped: bool,
    /// Whether the absolute ceiling reduced the contribution.
    pub ceiling_applied: bool,
    /// One entry per bracket, in schedule order.
    pub slices: Vec<ContributionSlice>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

fn slice_base(base: Decimal, schedule: &ContributionSchedule) -> Vec<ContributionSlice> {
    let mut lower_bound = Decimal::ZERO;
    let mut slices = Vec::with_capacity(schedule.brackets.len());

    for bracket in &schedule.brackets {
        let above_lower = (base - lower_bound).max(Decimal::ZERO);
        let portion = match bracket.upper_bound {
            Some(upper) => above_lower.min(upper - lower_bound),
            None => above_lower,
        };

        slices.push(ContributionSlice {
            lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            portion,
            amount: portion * bracket.rate,
        });

        match bracket.upper_bound {
            Some(upper) => lower_bound = upper,
            None => break,
        }
    }

    slices
}

/// Calculates the social-security contribution on a taxable base.
///
/// The base is clamped to `[0, base_cap]` before slicing. With the current
/// policy the cap equals the upper bound of the third bracket, so the
/// open-ended 16% bracket is always reported with a zero portion.
///
/// # Arguments
///
/// * `taxable_base` - The taxable earnings subject to contribution
/// * `schedule` - The contribution schedule from the policy
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_contribution;
/// use payslip_engine::config::ContributionSchedule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = calculate_contribution(Decimal::from(1000), &ContributionSchedule::default(), 1);
/// assert_eq!(result.amount, Decimal::from_str("110.00").unwrap());
/// ```
pub fn calculate_contribution(
    taxable_base: Decimal,
    schedule: &ContributionSchedule,
    step_number: u32,
) -> ContributionResult {
    let floored = taxable_base.max(Decimal::ZERO);
    let base_capped = floored > schedule.base_cap;
    let contribution_base = floored.min(schedule.base_cap);

    let slices = slice_base(contribution_base, schedule);
    let uncapped: Decimal = slices.iter().map(|s| s.amount).sum();

    let ceiling_applied = uncapped > schedule.maximum_contribution;
    let amount = uncapped.min(schedule.maximum_contribution);

    let slice_detail: Vec<String> = slices
        .iter()
        .filter(|s| s.portion > Decimal::ZERO)
        .map(|s| {
            format!(
                "R${} x {}% = R${}",
                s.portion.normalize(),
                (s.rate * Decimal::ONE_HUNDRED).normalize(),
                s.amount.normalize()
            )
        })
        .collect();

    let mut reasoning = if slice_detail.is_empty() {
        "No taxable base - no contribution".to_string()
    } else {
        slice_detail.join(" + ")
    };
    if base_capped {
        reasoning.push_str(&format!(
            " (base R${} capped at R${})",
            floored.normalize(),
            schedule.base_cap.normalize()
        ));
    }
    if ceiling_applied {
        reasoning.push_str(&format!(
            " (limited to ceiling R${})",
            schedule.maximum_contribution.normalize()
        ));
    }

    let slice_json: Vec<serde_json::Value> = slices
        .iter()
        .map(|s| {
            serde_json::json!({
                "rate": s.rate.normalize().to_string(),
                "portion": s.portion.normalize().to_string(),
                "amount": s.amount.normalize().to_string()
            })
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "social_security_contribution".to_string(),
        rule_name: "Social Security Contribution".to_string(),
        legal_ref: CONTRIBUTION_REF.to_string(),
        input: serde_json::json!({
            "taxable_base": taxable_base.normalize().to_string(),
            "base_cap": schedule.base_cap.normalize().to_string(),
            "maximum_contribution": schedule.maximum_contribution.normalize().to_string()
        }),
        output: serde_json::json!({
            "contribution_base": contribution_base.normalize().to_string(),
            "base_capped": base_capped,
            "slices": slice_json,
            "uncapped_amount": uncapped.normalize().to_string(),
            "ceiling_applied": ceiling_applied,
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    ContributionResult {
        amount,
        taxable_base,
        contribution_base,
        base_capped,
        ceiling_applied,
        slices,
        audit_step,
    }
}
