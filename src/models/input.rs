//! Input parameters for a payroll calculation.
//!
//! This module defines the [`InputParameters`] snapshot the calculator
//! consumes and the [`ThirteenthSalaryMode`] selector.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest accepted monetary amount: one trillion reais.
///
/// Keeps every product the calculator forms well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest accepted rate (a factor of 100, i.e. 10 000%).
pub const MAX_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Largest accepted count (periods, days, dependents, children).
pub const MAX_COUNT: u32 = 10_000;

/// Which 13th-salary installment, if any, is paid with this payslip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThirteenthSalaryMode {
    /// No 13th-salary installment this month.
    #[default]
    None,
    /// First installment: half the taxable total, nothing withheld.
    FirstInstallment,
    /// Second installment: half the taxable total, with contribution and
    /// income tax computed on the full taxable total as separate lines.
    SecondInstallment,
}

impl ThirteenthSalaryMode {
    /// Returns the snake_case name used in JSON and audit output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThirteenthSalaryMode::None => "none",
            ThirteenthSalaryMode::FirstInstallment => "first_installment",
            ThirteenthSalaryMode::SecondInstallment => "second_installment",
        }
    }
}

/// An immutable snapshot of everything the calculator needs.
///
/// Amounts are in reais. The calculator clamps every value into its accepted
/// range before use (see [`InputParameters::clamped`]), so no input can make
/// it fail.
///
/// # Example
///
/// ```
/// use payslip_engine::models::{InputParameters, ThirteenthSalaryMode};
/// use rust_decimal::Decimal;
///
/// let input = InputParameters {
///     base_salary: Decimal::from(3000),
///     seniority_periods: 2,
///     thirteenth_salary_mode: ThirteenthSalaryMode::None,
///     ..Default::default()
/// };
/// assert_eq!(input.dependents_count, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParameters {
    /// Monthly base salary (vencimentos).
    pub base_salary: Decimal,
    /// Qualification bonus rate as a fraction of the base salary.
    pub qualification_rate: Decimal,
    /// Completed five-year service periods.
    pub seniority_periods: u32,
    /// Dependents declared for income tax.
    pub dependents_count: u32,
    /// Days of transport allowance.
    pub transport_days: u32,
    /// Days of meal allowance.
    pub meal_days: u32,
    /// Health allowance for the servant's age band.
    pub health_allowance_base: Decimal,
    /// Whether the disability surcharge applies to the health allowance.
    pub has_disability_health_surcharge: bool,
    /// Children receiving the regular daycare allowance.
    pub regular_daycare_count: u32,
    /// Children with a disability receiving the daycare allowance.
    pub disability_daycare_count: u32,
    /// Whether the one-third vacation bonus is paid this month.
    pub has_vacation_bonus: bool,
    /// Which 13th-salary installment is paid this month.
    pub thirteenth_salary_mode: ThirteenthSalaryMode,
}

impl InputParameters {
    /// Returns a copy with amounts clamped to `[0, MAX_AMOUNT]`, the
    /// qualification rate to `[0, MAX_RATE]` and counts to `MAX_COUNT`.
    pub fn clamped(&self) -> Self {
        let amount = |v: Decimal| v.max(Decimal::ZERO).min(MAX_AMOUNT);
        Self {
            base_salary: amount(self.base_salary),
            qualification_rate: self.qualification_rate.max(Decimal::ZERO).min(MAX_RATE),
            seniority_periods: self.seniority_periods.min(MAX_COUNT),
            dependents_count: self.dependents_count.min(MAX_COUNT),
            transport_days: self.transport_days.min(MAX_COUNT),
            meal_days: self.meal_days.min(MAX_COUNT),
            health_allowance_base: amount(self.health_allowance_base),
            regular_daycare_count: self.regular_daycare_count.min(MAX_COUNT),
            disability_daycare_count: self.disability_daycare_count.min(MAX_COUNT),
            ..self.clone()
        }
    }
}
