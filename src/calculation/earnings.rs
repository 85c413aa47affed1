//! Earnings calculation functionality.
//!
//! This module builds the earnings side of the payslip: the taxable
//! earnings (base salary, qualification, seniority and loyalty bonuses), the
//! one-third vacation bonus, the indemnity allowances and the 13th-salary
//! installments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AllowanceRates, EarningsRules};
use crate::models::{AuditStep, InputParameters, ThirteenthSalaryMode};

/// Legal reference for the seniority (quinquênio) and loyalty (sexta-parte) bonuses.
pub const SERVICE_TIME_REF: &str = "CE-SP art. 129";

/// Legal reference for the one-third vacation bonus.
pub const VACATION_BONUS_REF: &str = "CF art. 7º, XVII";

/// Legal reference for the 13th salary.
pub const THIRTEENTH_SALARY_REF: &str = "CF art. 7º, VIII";

/// Reference for the indemnity allowances, which are set by policy.
pub const INDEMNITY_REF: &str = "policy.allowances";

/// Every earnings figure on the payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    /// Qualification bonus.
    pub qualification_bonus: Decimal,
    /// Base salary plus qualification bonus.
    pub service_base: Decimal,
    /// Seniority bonus.
    pub seniority_bonus: Decimal,
    /// Loyalty bonus.
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
    /// Sum of the indemnity allowances.
    pub indemnity_total: Decimal,
    /// First 13th-salary installment.
    pub thirteenth_first_installment: Decimal,
    /// Second 13th-salary installment.
    pub thirteenth_second_installment: Decimal,
    /// The base on which contribution and tax are withheld for the 13th
    /// salary. Only set for the second installment.
    pub thirteenth_taxable_base: Option<Decimal>,
    /// Everything paid this month.
    pub gross_total: Decimal,
}

/// The result of calculating earnings, including the audit steps.
#[derive(Debug, Clone)]
pub struct EarningsResult {
    /// The earnings figures.
    pub breakdown: EarningsBreakdown,
    /// One audit step per earnings rule, numbered from the requested first step.
    pub audit_steps: Vec<AuditStep>,
}

struct TaxableEarnings {
    qualification_bonus: Decimal,
    service_base: Decimal,
    seniority_bonus: Decimal,
    loyalty_bonus: Decimal,
    taxable_total: Decimal,
}

struct Indemnities {
    meal: Decimal,
    transport: Decimal,
    health: Decimal,
    daycare_regular: Decimal,
    daycare_disability: Decimal,
}

impl Indemnities {
    fn total(&self) -> Decimal {
        self.meal + self.transport + self.health + self.daycare_regular + self.daycare_disability
    }
}

fn taxable_earnings(input: &InputParameters, rules: &EarningsRules) -> TaxableEarnings {
    let qualification_bonus = input.base_salary * input.qualification_rate;
    let service_base = input.base_salary + qualification_bonus;
    let periods = Decimal::from(input.seniority_periods);
    let seniority_bonus = service_base * rules.seniority_rate_per_period * periods;

    // Flat once the threshold is reached; never prorated per period.
    let loyalty_bonus = if input.seniority_periods >= rules.loyalty_min_periods {
        service_base * rules.loyalty_rate
    } else {
        Decimal::ZERO
    };

    TaxableEarnings {
        qualification_bonus,
        service_base,
        seniority_bonus,
        loyalty_bonus,
        taxable_total: input.base_salary + qualification_bonus + seniority_bonus + loyalty_bonus,
    }
}

fn indemnities(
    input: &InputParameters,
    rules: &EarningsRules,
    rates: &AllowanceRates,
) -> Indemnities {
    let health = if input.has_disability_health_surcharge {
        input.health_allowance_base * rules.disability_health_multiplier
    } else {
        input.health_allowance_base
    };

    Indemnities {
        meal: Decimal::from(input.meal_days) * rates.meal_per_day,
        transport: Decimal::from(input.transport_days) * rates.transport_per_day,
        health,
        daycare_regular: Decimal::from(input.regular_daycare_count)
            * rates.daycare_regular_per_child,
        daycare_disability: Decimal::from(input.disability_daycare_count)
            * rates.daycare_disability_per_child,
    }
}

/// Calculates every earnings figure for a payslip.
///
/// Negative amounts in `input` are clamped to zero first, so every figure in
/// the breakdown is non-negative.
///
/// # Arguments
///
/// * `input` - The input snapshot
/// * `rules` - Earnings factors from the policy
/// * `rates` - Indemnity allowance rates from the policy
/// * `first_step` - The step number of the first audit step produced
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_earnings;
/// use payslip_engine::config::{AllowanceRates, EarningsRules};
/// use payslip_engine::models::InputParameters;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let input = InputParameters {
///     base_salary: Decimal::from(10000),
///     qualification_rate: Decimal::from_str("0.1").unwrap(),
///     seniority_periods: 4,
///     ..Default::default()
/// };
///
/// let rules = EarningsRules::default();
/// let result = calculate_earnings(&input, &rules, &AllowanceRates::default(), 1);
/// assert_eq!(result.breakdown.taxable_total, Decimal::from(16400));
/// ```
pub fn calculate_earnings(
    input: &InputParameters,
    rules: &EarningsRules,
    rates: &AllowanceRates,
    first_step: u32,
) -> EarningsResult {
    let input = input.clamped();
    let mut audit_steps = Vec::with_capacity(4);

    // Taxable earnings
    let taxable = taxable_earnings(&input, rules);
    audit_steps.push(AuditStep {
        step_number: first_step,
        rule_id: "taxable_earnings".to_string(),
        rule_name: "Taxable Earnings".to_string(),
        legal_ref: SERVICE_TIME_REF.to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.normalize().to_string(),
            "qualification_rate": input.qualification_rate.normalize().to_string(),
            "seniority_periods": input.seniority_periods,
            "loyalty_min_periods": rules.loyalty_min_periods
        }),
        output: serde_json::json!({
            "qualification_bonus": taxable.qualification_bonus.normalize().to_string(),
            "service_base": taxable.service_base.normalize().to_string(),
            "seniority_bonus": taxable.seniority_bonus.normalize().to_string(),
            "loyalty_bonus": taxable.loyalty_bonus.normalize().to_string(),
            "taxable_total": taxable.taxable_total.normalize().to_string()
        }),
        reasoning: format!(
            "Service base R${} with {} period(s): seniority R${}, loyalty R${}; taxable total R${}",
            taxable.service_base.normalize(),
            input.seniority_periods,
            taxable.seniority_bonus.normalize(),
            taxable.loyalty_bonus.normalize(),
            taxable.taxable_total.normalize()
        ),
    });

    // Vacation bonus, on the pre-vacation taxable total only
    let vacation_bonus = if input.has_vacation_bonus {
        taxable
            .taxable_total
            .checked_div(rules.vacation_divisor)
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    let taxable_total_with_vacation = taxable.taxable_total + vacation_bonus;
    audit_steps.push(AuditStep {
        step_number: first_step + 1,
        rule_id: "vacation_bonus".to_string(),
        rule_name: "Vacation Bonus".to_string(),
        legal_ref: VACATION_BONUS_REF.to_string(),
        input: serde_json::json!({
            "has_vacation_bonus": input.has_vacation_bonus,
            "taxable_total": taxable.taxable_total.normalize().to_string()
        }),
        output: serde_json::json!({
            "vacation_bonus": vacation_bonus.normalize().to_string(),
            "taxable_total_with_vacation": taxable_total_with_vacation.normalize().to_string()
        }),
        reasoning: if input.has_vacation_bonus {
            format!(
                "R${} / {} = R${}",
                taxable.taxable_total.normalize(),
                rules.vacation_divisor.normalize(),
                vacation_bonus.normalize()
            )
        } else {
            "No vacation this month - no bonus".to_string()
        },
    });

    // Indemnity allowances
    let allowances = indemnities(&input, rules, rates);
    let indemnity_total = allowances.total();
    audit_steps.push(AuditStep {
        step_number: first_step + 2,
        rule_id: "indemnity_allowances".to_string(),
        rule_name: "Indemnity Allowances".to_string(),
        legal_ref: INDEMNITY_REF.to_string(),
        input: serde_json::json!({
            "meal_days": input.meal_days,
            "transport_days": input.transport_days,
            "health_allowance_base": input.health_allowance_base.normalize().to_string(),
            "has_disability_health_surcharge": input.has_disability_health_surcharge,
            "regular_daycare_count": input.regular_daycare_count,
            "disability_daycare_count": input.disability_daycare_count
        }),
        output: serde_json::json!({
            "meal": allowances.meal.normalize().to_string(),
            "transport": allowances.transport.normalize().to_string(),
            "health": allowances.health.normalize().to_string(),
            "daycare_regular": allowances.daycare_regular.normalize().to_string(),
            "daycare_disability": allowances.daycare_disability.normalize().to_string(),
            "total": indemnity_total.normalize().to_string()
        }),
        reasoning: format!(
            "Non-taxable allowances total R${}",
            indemnity_total.normalize()
        ),
    });

    // 13th salary, on the pre-vacation taxable total
    let installment = taxable.taxable_total * rules.thirteenth_installment_fraction;
    let (first, second, thirteenth_taxable_base) = match input.thirteenth_salary_mode {
        ThirteenthSalaryMode::None => (Decimal::ZERO, Decimal::ZERO, None),
        ThirteenthSalaryMode::FirstInstallment => (installment, Decimal::ZERO, None),
        ThirteenthSalaryMode::SecondInstallment => {
            (Decimal::ZERO, installment, Some(taxable.taxable_total))
        }
    };
    audit_steps.push(AuditStep {
        step_number: first_step + 3,
        rule_id: "thirteenth_salary".to_string(),
        rule_name: "13th Salary".to_string(),
        legal_ref: THIRTEENTH_SALARY_REF.to_string(),
        input: serde_json::json!({
            "mode": input.thirteenth_salary_mode.as_str(),
            "taxable_total": taxable.taxable_total.normalize().to_string()
        }),
        output: serde_json::json!({
            "first_installment": first.normalize().to_string(),
            "second_installment": second.normalize().to_string(),
            "withholding_base": thirteenth_taxable_base.map(|b| b.normalize().to_string())
        }),
        reasoning: match input.thirteenth_salary_mode {
            ThirteenthSalaryMode::None => "No 13th-salary installment this month".to_string(),
            ThirteenthSalaryMode::FirstInstallment => format!(
                "First installment R${}; withholding deferred to the second installment",
                first.normalize()
            ),
            ThirteenthSalaryMode::SecondInstallment => format!(
                "Second installment R${}; contribution and tax withheld on R${}",
                second.normalize(),
                taxable.taxable_total.normalize()
            ),
        },
    });

    let gross_total = taxable_total_with_vacation + indemnity_total + first + second;

    EarningsResult {
        breakdown: EarningsBreakdown {
            qualification_bonus: taxable.qualification_bonus,
            service_base: taxable.service_base,
            seniority_bonus: taxable.seniority_bonus,
            loyalty_bonus: taxable.loyalty_bonus,
            taxable_total: taxable.taxable_total,
            vacation_bonus,
            taxable_total_with_vacation,
            meal_allowance: allowances.meal,
            transport_allowance: allowances.transport,
            health_allowance_final: allowances.health,
            daycare_regular_allowance: allowances.daycare_regular,
            daycare_disability_allowance: allowances.daycare_disability,
            indemnity_total,
            thirteenth_first_installment: first,
            thirteenth_second_installment: second,
            thirteenth_taxable_base,
            gross_total,
        },
        audit_steps,
    }
}
