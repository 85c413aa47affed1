//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a payroll
//! policy from YAML files and checking that it is internally consistent.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{MAX_AMOUNT, MAX_RATE};

use super::types::{
    ContributionBracket, HealthAllowanceBracket, HealthAllowanceConfig, PayrollPolicy, PolicyFile,
    TaxBracket,
};

/// Loads and provides access to the payroll policy.
///
/// # Directory Structure
///
/// ```text
/// config/sp_2026/
/// ├── policy.yaml            # Metadata, earnings, allowances, contribution and tax tables
/// └── health_allowance.yaml  # Health allowance age bands
/// ```
///
/// # Example
///
/// ```no_run
/// use payslip_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sp_2026").unwrap();
/// let amount = loader.get_health_allowance(35).unwrap();
/// println!("Health allowance at 35: R$ {}", amount);
/// ```
///
/// `ConfigLoader::default()` carries the built-in constants without touching
/// the filesystem.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    policy: PayrollPolicy,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The policy values are inconsistent (`InvalidPolicy`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy_file = Self::load_yaml::<PolicyFile>(&path.join("policy.yaml"))?;
        let health =
            Self::load_yaml::<HealthAllowanceConfig>(&path.join("health_allowance.yaml"))?;

        let policy = PayrollPolicy::new(policy_file, health.brackets);
        debug!(
            path = %path.display(),
            version = %policy.metadata.version,
            "Loaded payroll policy"
        );

        Self::from_policy(policy)
    }

    /// Wraps an already-built policy after validating it.
    pub fn from_policy(policy: PayrollPolicy) -> EngineResult<Self> {
        validate_policy(&policy)?;
        Ok(Self { policy })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the policy in force.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }

    /// Resolves the health allowance amount for an age.
    ///
    /// Returns `HealthBracketNotFound` if no band covers the age.
    pub fn get_health_allowance(&self, age: u32) -> EngineResult<Decimal> {
        self.policy
            .health_allowance
            .iter()
            .find(|b| b.covers(age))
            .map(|b| b.amount)
            .ok_or(EngineError::HealthBracketNotFound { age })
    }
}

fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidPolicy {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}

fn check_range(field: &str, value: Decimal, max: Decimal) -> EngineResult<()> {
    check_non_negative(field, value)?;
    if value > max {
        return Err(invalid(field, format!("must not exceed {}, got {}", max, value)));
    }
    Ok(())
}

fn check_rate(field: &str, value: Decimal) -> EngineResult<()> {
    check_range(field, value, MAX_RATE)
}

fn check_amount(field: &str, value: Decimal) -> EngineResult<()> {
    check_range(field, value, MAX_AMOUNT)
}

/// Checks that upper bounds ascend strictly and only the last is open-ended.
fn check_bounds(field: &str, bounds: &[Option<Decimal>]) -> EngineResult<()> {
    let (last, rest) = bounds
        .split_last()
        .ok_or_else(|| invalid(field, "at least one bracket is required"))?;
    if last.is_some() {
        return Err(invalid(field, "the last bracket must be open-ended"));
    }

    let mut previous = Decimal::ZERO;
    for (i, bound) in rest.iter().enumerate() {
        let bound = bound.ok_or_else(|| {
            invalid(field, format!("bracket {} is open-ended but is not the last", i))
        })?;
        if bound <= previous {
            return Err(invalid(field, "upper bounds must be positive and strictly ascending"));
        }
        check_amount(field, bound)?;
        previous = bound;
    }
    Ok(())
}

fn validate_contribution(brackets: &[ContributionBracket]) -> EngineResult<()> {
    let bounds: Vec<Option<Decimal>> = brackets.iter().map(|b| b.upper_bound).collect();
    check_bounds("contribution.brackets", &bounds)?;
    for bracket in brackets {
        check_rate("contribution.brackets.rate", bracket.rate)?;
    }
    Ok(())
}

fn validate_tax(brackets: &[TaxBracket]) -> EngineResult<()> {
    let bounds: Vec<Option<Decimal>> = brackets.iter().map(|b| b.upper_bound).collect();
    check_bounds("income_tax.brackets", &bounds)?;
    for bracket in brackets {
        check_rate("income_tax.brackets.rate", bracket.rate)?;
        check_amount("income_tax.brackets.deduction", bracket.deduction)?;
    }
    Ok(())
}

fn validate_health(brackets: &[HealthAllowanceBracket]) -> EngineResult<()> {
    let mut next_age = 0;
    for (i, bracket) in brackets.iter().enumerate() {
        check_amount("health_allowance.amount", bracket.amount)?;
        if bracket.min_age != next_age {
            return Err(invalid(
                "health_allowance",
                format!("band '{}' must start at age {}", bracket.label, next_age),
            ));
        }
        match bracket.max_age {
            Some(max) if max < bracket.min_age => {
                return Err(invalid(
                    "health_allowance",
                    format!("band '{}' ends before it starts", bracket.label),
                ));
            }
            Some(max) => {
                next_age = max.checked_add(1).ok_or_else(|| {
                    invalid(
                        "health_allowance",
                        format!(
                            "band '{}' ending at age {} must be open-ended",
                            bracket.label, max
                        ),
                    )
                })?;
            }
            None if i + 1 != brackets.len() => {
                return Err(invalid(
                    "health_allowance",
                    format!("band '{}' is open-ended but is not the last", bracket.label),
                ));
            }
            None => {}
        }
    }
    Ok(())
}

/// Validates the internal consistency of a policy.
pub(crate) fn validate_policy(policy: &PayrollPolicy) -> EngineResult<()> {
    let earnings = &policy.earnings;
    check_rate("earnings.seniority_rate_per_period", earnings.seniority_rate_per_period)?;
    check_rate("earnings.loyalty_rate", earnings.loyalty_rate)?;
    check_rate(
        "earnings.thirteenth_installment_fraction",
        earnings.thirteenth_installment_fraction,
    )?;
    check_rate(
        "earnings.disability_health_multiplier",
        earnings.disability_health_multiplier,
    )?;
    check_rate("earnings.vacation_divisor", earnings.vacation_divisor)?;
    if earnings.vacation_divisor < Decimal::ONE {
        return Err(invalid("earnings.vacation_divisor", "must be at least 1"));
    }

    let allowances = &policy.allowances;
    check_amount("allowances.meal_per_day", allowances.meal_per_day)?;
    check_amount("allowances.transport_per_day", allowances.transport_per_day)?;
    check_amount(
        "allowances.daycare_regular_per_child",
        allowances.daycare_regular_per_child,
    )?;
    check_amount(
        "allowances.daycare_disability_per_child",
        allowances.daycare_disability_per_child,
    )?;

    validate_contribution(&policy.contribution.brackets)?;
    check_amount("contribution.base_cap", policy.contribution.base_cap)?;
    check_amount(
        "contribution.maximum_contribution",
        policy.contribution.maximum_contribution,
    )?;

    let tax = &policy.income_tax;
    validate_tax(&tax.brackets)?;
    check_amount("income_tax.dependent_deduction", tax.dependent_deduction)?;
    check_amount("income_tax.exemption_threshold", tax.exemption_threshold)?;
    check_amount("income_tax.sliding_deduction.base", tax.sliding_deduction.base)?;
    check_amount("income_tax.sliding_deduction.threshold", tax.sliding_deduction.threshold)?;
    check_rate("income_tax.sliding_deduction.slope", tax.sliding_deduction.slope)?;

    validate_health(&policy.health_allowance)
}
