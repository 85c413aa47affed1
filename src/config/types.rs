//! Configuration types for payroll policy.
//!
//! This module contains the strongly-typed policy structures that are
//! deserialized from YAML configuration files. Every type has a `Default`
//! carrying the current year's constants, so the engine also runs without
//! any configuration directory.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metadata about the policy in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Short identifier for the policy (e.g., "SP-2026").
    pub code: String,
    /// The human-readable name of the policy.
    pub name: String,
    /// The version label shown on calculation responses.
    pub version: String,
    /// The date from which these constants apply.
    pub effective_date: NaiveDate,
}

impl Default for PolicyMetadata {
    fn default() -> Self {
        Self {
            code: "SP-2026".to_string(),
            name: "Servidor Público Estadual de São Paulo".to_string(),
            version: "2026".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
        }
    }
}

/// Factors used when building taxable earnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRules {
    /// Seniority bonus per completed five-year period (quinquênio), as a fraction
    /// of the service base.
    pub seniority_rate_per_period: Decimal,
    /// Loyalty bonus (sexta-parte) as a fraction of the service base.
    pub loyalty_rate: Decimal,
    /// Completed periods needed before the loyalty bonus is paid.
    pub loyalty_min_periods: u32,
    /// The vacation bonus is the taxable total divided by this value.
    pub vacation_divisor: Decimal,
    /// Fraction of the taxable total paid in each 13th-salary installment.
    pub thirteenth_installment_fraction: Decimal,
    /// Multiplier applied to the health allowance when the disability
    /// surcharge is granted.
    pub disability_health_multiplier: Decimal,
}

impl Default for EarningsRules {
    fn default() -> Self {
        Self {
            seniority_rate_per_period: Decimal::new(5, 2),
            loyalty_rate: Decimal::new(20, 2),
            loyalty_min_periods: 4,
            vacation_divisor: Decimal::from(3),
            thirteenth_installment_fraction: Decimal::new(5, 1),
            disability_health_multiplier: Decimal::new(15, 1),
        }
    }
}

/// Per-unit rates for the indemnity allowances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceRates {
    /// Meal allowance per working day.
    pub meal_per_day: Decimal,
    /// Transport allowance per working day.
    pub transport_per_day: Decimal,
    /// Daycare allowance per child.
    pub daycare_regular_per_child: Decimal,
    /// Daycare allowance per child with a disability.
    pub daycare_disability_per_child: Decimal,
}

impl Default for AllowanceRates {
    fn default() -> Self {
        Self {
            meal_per_day: Decimal::new(8000, 2),
            transport_per_day: Decimal::new(1400, 2),
            daycare_regular_per_child: Decimal::new(80500, 2),
            daycare_disability_per_child: Decimal::new(120750, 2),
        }
    }
}

/// One slice of the progressive contribution schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBracket {
    /// Inclusive upper bound of the slice; `None` for the open-ended top slice.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate applied to the portion of the base inside this slice.
    pub rate: Decimal,
}

/// The social-security (SPPREV) contribution schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    /// Slices in ascending order; only the last may be open-ended.
    pub brackets: Vec<ContributionBracket>,
    /// The contribution base is clamped to this value before slicing.
    pub base_cap: Decimal,
    /// Absolute ceiling on the contribution, applied after summing slices.
    pub maximum_contribution: Decimal,
}

impl Default for ContributionSchedule {
    fn default() -> Self {
        let first = Decimal::new(151800, 2);
        let second = Decimal::new(402246, 2);
        let third = Decimal::new(815741, 2);

        Self {
            brackets: vec![
                ContributionBracket {
                    upper_bound: Some(first),
                    rate: Decimal::new(11, 2),
                },
                ContributionBracket {
                    upper_bound: Some(second),
                    rate: Decimal::new(12, 2),
                },
                ContributionBracket {
                    upper_bound: Some(third),
                    rate: Decimal::new(14, 2),
                },
                ContributionBracket {
                    upper_bound: None,
                    rate: Decimal::new(16, 2),
                },
            ],
            base_cap: third,
            maximum_contribution: Decimal::new(104641, 2),
        }
    }
}

/// One bracket of the income tax (IRPF) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound on the gross taxable total; `None` for the top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate applied to the tax base.
    pub rate: Decimal,
    /// Amount subtracted after applying the rate (parcela a deduzir).
    pub deduction: Decimal,
}

/// The linearly decreasing extra reduction granted to lower incomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingDeduction {
    /// The reduction only applies when the gross taxable total is at or below this.
    pub threshold: Decimal,
    /// Intercept of the reduction line.
    pub base: Decimal,
    /// Slope of the reduction line, per unit of gross taxable total.
    pub slope: Decimal,
}

/// The income tax schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxSchedule {
    /// Deduction per declared dependent.
    pub dependent_deduction: Decimal,
    /// Gross taxable totals at or below this are fully exempt.
    pub exemption_threshold: Decimal,
    /// Brackets in ascending order; only the last may be open-ended.
    pub brackets: Vec<TaxBracket>,
    /// Extra reduction for incomes just above the exemption.
    pub sliding_deduction: SlidingDeduction,
}

impl Default for IncomeTaxSchedule {
    fn default() -> Self {
        Self {
            dependent_deduction: Decimal::new(18959, 2),
            exemption_threshold: Decimal::new(500000, 2),
            brackets: vec![
                TaxBracket {
                    upper_bound: Some(Decimal::new(303600, 2)),
                    rate: Decimal::ZERO,
                    deduction: Decimal::ZERO,
                },
                TaxBracket {
                    upper_bound: Some(Decimal::new(353331, 2)),
                    rate: Decimal::new(75, 3),
                    deduction: Decimal::new(18216, 2),
                },
                TaxBracket {
                    upper_bound: Some(Decimal::new(468885, 2)),
                    rate: Decimal::new(15, 2),
                    deduction: Decimal::new(39416, 2),
                },
                TaxBracket {
                    upper_bound: Some(Decimal::new(583085, 2)),
                    rate: Decimal::new(225, 3),
                    deduction: Decimal::new(67549, 2),
                },
                TaxBracket {
                    upper_bound: None,
                    rate: Decimal::new(275, 3),
                    deduction: Decimal::new(90873, 2),
                },
            ],
            sliding_deduction: SlidingDeduction {
                threshold: Decimal::new(735000, 2),
                base: Decimal::new(97862, 2),
                slope: Decimal::new(133145, 6),
            },
        }
    }
}

/// An age band of the health allowance (auxílio saúde).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthAllowanceBracket {
    /// Label shown to the user (e.g., "19 a 23 anos").
    pub label: String,
    /// First age covered by the band.
    pub min_age: u32,
    /// Last age covered by the band; `None` for the final band.
    #[serde(default)]
    pub max_age: Option<u32>,
    /// Monthly allowance for the band.
    pub amount: Decimal,
}

impl HealthAllowanceBracket {
    /// Returns true if `age` falls inside this band.
    pub fn covers(&self, age: u32) -> bool {
        age >= self.min_age && self.max_age.is_none_or(|max| age <= max)
    }
}

/// Health allowance configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HealthAllowanceConfig {
    /// Age bands in ascending order.
    pub brackets: Vec<HealthAllowanceBracket>,
}

fn default_health_brackets() -> Vec<HealthAllowanceBracket> {
    let bands: [(&str, u32, Option<u32>, i64); 10] = [
        ("Até 18 anos", 0, Some(18), 19800),
        ("19 a 23 anos", 19, Some(23), 23100),
        ("24 a 28 anos", 24, Some(28), 26400),
        ("29 a 33 anos", 29, Some(33), 29700),
        ("34 a 38 anos", 34, Some(38), 33000),
        ("39 a 43 anos", 39, Some(43), 36300),
        ("44 a 48 anos", 44, Some(48), 41800),
        ("49 a 53 anos", 49, Some(53), 47300),
        ("54 a 58 anos", 54, Some(58), 55000),
        ("59 anos ou mais", 59, None, 66000),
    ];

    bands
        .into_iter()
        .map(|(label, min_age, max_age, cents)| HealthAllowanceBracket {
            label: label.to_string(),
            min_age,
            max_age,
            amount: Decimal::new(cents, 2),
        })
        .collect()
}

/// Policy file structure (`policy.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PolicyFile {
    /// Policy metadata.
    pub metadata: PolicyMetadata,
    /// Earnings factors.
    pub earnings: EarningsRules,
    /// Indemnity allowance rates.
    pub allowances: AllowanceRates,
    /// Contribution schedule.
    pub contribution: ContributionSchedule,
    /// Income tax schedule.
    pub income_tax: IncomeTaxSchedule,
}

/// The complete payroll policy used by a calculation.
///
/// Aggregates everything loaded from a policy directory. Only one policy is
/// in force at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPolicy {
    /// Policy metadata.
    pub metadata: PolicyMetadata,
    /// Earnings factors.
    pub earnings: EarningsRules,
    /// Indemnity allowance rates.
    pub allowances: AllowanceRates,
    /// Contribution schedule.
    pub contribution: ContributionSchedule,
    /// Income tax schedule.
    pub income_tax: IncomeTaxSchedule,
    /// Health allowance age bands.
    pub health_allowance: Vec<HealthAllowanceBracket>,
}

impl PayrollPolicy {
    /// Creates a policy from a parsed policy file and its health allowance bands.
    pub(crate) fn new(file: PolicyFile, health_allowance: Vec<HealthAllowanceBracket>) -> Self {
        let mut health_allowance = health_allowance;
        health_allowance.sort_by_key(|b| b.min_age);
        Self {
            metadata: file.metadata,
            earnings: file.earnings,
            allowances: file.allowances,
            contribution: file.contribution,
            income_tax: file.income_tax,
            health_allowance,
        }
    }
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            metadata: PolicyMetadata::default(),
            earnings: EarningsRules::default(),
            allowances: AllowanceRates::default(),
            contribution: ContributionSchedule::default(),
            income_tax: IncomeTaxSchedule::default(),
            health_allowance: default_health_brackets(),
        }
    }
}
