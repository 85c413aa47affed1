//! Request types for the Payslip Engine API.
//!
//! This module defines the JSON request structure for the `/calculate`
//! endpoint and its normalization into [`InputParameters`]. Form clients
//! send numbers, numeric strings (with a decimal comma) or nothing at all,
//! so every field is accepted leniently and replaced by a safe value when it
//! cannot be used. Each replacement is reported as an [`AuditWarning`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{
    AuditWarning, InputParameters, MAX_AMOUNT, MAX_COUNT, MAX_RATE, ThirteenthSalaryMode,
};

/// Request body for the `/calculate` endpoint.
///
/// Every field is optional and may be a JSON number, string, boolean or
/// `null`; see [`CalculationRequest::normalize`] for the rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationRequest {
    /// Monthly base salary.
    pub base_salary: Option<Value>,
    /// Qualification bonus rate as a fraction (e.g. `0.1`).
    pub qualification_rate: Option<Value>,
    /// Completed five-year service periods.
    pub seniority_periods: Option<Value>,
    /// Dependents declared for income tax.
    pub dependents_count: Option<Value>,
    /// Days of transport allowance.
    pub transport_days: Option<Value>,
    /// Days of meal allowance.
    pub meal_days: Option<Value>,
    /// Explicit health allowance; takes precedence over `age`.
    pub health_allowance_base: Option<Value>,
    /// Servant's age, resolved through the policy's health allowance bands.
    pub age: Option<Value>,
    /// Whether the disability surcharge applies to the health allowance.
    pub has_disability_health_surcharge: Option<Value>,
    /// Children receiving the regular daycare allowance.
    pub regular_daycare_count: Option<Value>,
    /// Children with a disability receiving the daycare allowance.
    pub disability_daycare_count: Option<Value>,
    /// Whether the vacation bonus is paid this month.
    pub has_vacation_bonus: Option<Value>,
    /// Which 13th-salary installment is paid this month.
    pub thirteenth_salary_mode: Option<Value>,
}

/// A request after normalization.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    /// The input snapshot handed to the calculator.
    pub input: InputParameters,
    /// One warning per raw value that was replaced.
    pub warnings: Vec<AuditWarning>,
}

fn warning(code: &str, message: String) -> AuditWarning {
    AuditWarning {
        code: code.to_string(),
        message,
        severity: "low".to_string(),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parses a decimal written with either a decimal point or a decimal comma.
///
/// When a comma is present, dots are taken as thousands separators
/// (`"1.234,56"` is `1234.56`).
pub fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let text = if text.contains(',') {
        text.replace('.', "").replace(',', ".")
    } else {
        text.to_string()
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parses the leading integer of a string the way a browser's `parseInt`
/// does: optional whitespace and sign, then as many digits as are present.
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits: &str = &digits[..digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Normalizes a raw monetary amount or rate. Missing values are zero and
/// values above `max` are capped at `max`.
fn normalize_amount(
    field: &str,
    value: Option<&Value>,
    max: Decimal,
    warnings: &mut Vec<AuditWarning>,
) -> Decimal {
    if is_blank(value) {
        return Decimal::ZERO;
    }
    let parsed = match value {
        Some(Value::Number(n)) => parse_decimal_text(&n.to_string()),
        Some(Value::String(s)) => parse_decimal_text(s),
        _ => None,
    };

    match parsed {
        Some(amount) if amount < Decimal::ZERO => {
            warnings.push(warning(
                "NEGATIVE_AMOUNT",
                format!("{} {} is negative and was treated as 0", field, amount),
            ));
            Decimal::ZERO
        }
        Some(amount) if amount > max => {
            warnings.push(warning(
                "AMOUNT_OUT_OF_RANGE",
                format!("{} {} exceeds {} and was capped", field, amount, max),
            ));
            max
        }
        Some(amount) => amount,
        None => {
            warnings.push(warning(
                "UNPARSEABLE_AMOUNT",
                format!("{} {} is not a number and was treated as 0", field, raw(value)),
            ));
            Decimal::ZERO
        }
    }
}

/// Normalizes a raw count, truncating toward zero and capping at [`MAX_COUNT`].
fn normalize_count(field: &str, value: Option<&Value>, warnings: &mut Vec<AuditWarning>) -> u32 {
    if is_blank(value) {
        return 0;
    }
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => parse_leading_integer(s),
        _ => None,
    };

    match parsed {
        Some(count) if count < 0 => {
            warnings.push(warning(
                "NEGATIVE_COUNT",
                format!("{} {} is negative and was treated as 0", field, count),
            ));
            0
        }
        Some(count) if count > i64::from(MAX_COUNT) => {
            warnings.push(warning(
                "COUNT_OUT_OF_RANGE",
                format!("{} {} exceeds {} and was capped", field, count, MAX_COUNT),
            ));
            MAX_COUNT
        }
        Some(count) => u32::try_from(count).unwrap_or(MAX_COUNT),
        None => {
            warnings.push(warning(
                "UNPARSEABLE_COUNT",
                format!("{} {} is not a whole number and was treated as 0", field, raw(value)),
            ));
            0
        }
    }
}

/// Normalizes a raw checkbox value. Anything unrecognized is `false`.
fn normalize_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ),
        _ => false,
    }
}

/// Maps a raw 13th-salary selector to a mode. Anything unrecognized is `None`.
pub fn parse_thirteenth_mode(value: Option<&Value>) -> Option<ThirteenthSalaryMode> {
    let text = match value? {
        Value::String(s) => s.trim().to_ascii_lowercase(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    match text.as_str() {
        "none" | "0" => Some(ThirteenthSalaryMode::None),
        "first" | "first_installment" | "1" => Some(ThirteenthSalaryMode::FirstInstallment),
        "second" | "second_installment" | "2" => Some(ThirteenthSalaryMode::SecondInstallment),
        _ => None,
    }
}

fn raw(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}

impl CalculationRequest {
    /// Normalizes the raw request into calculator input.
    ///
    /// The health allowance is taken from `health_allowance_base` when it is
    /// present; otherwise `age` is resolved through the policy's bands.
    ///
    /// # Errors
    ///
    /// Returns `HealthBracketNotFound` if `age` is used and no band covers it.
    pub fn normalize(&self, config: &ConfigLoader) -> EngineResult<NormalizedRequest> {
        let mut warnings = Vec::new();

        let health_allowance_base = if !is_blank(self.health_allowance_base.as_ref()) {
            normalize_amount(
                "health_allowance_base",
                self.health_allowance_base.as_ref(),
                MAX_AMOUNT,
                &mut warnings,
            )
        } else if !is_blank(self.age.as_ref()) {
            let age = normalize_count("age", self.age.as_ref(), &mut warnings);
            config.get_health_allowance(age)?
        } else {
            Decimal::ZERO
        };

        let thirteenth_salary_mode = match parse_thirteenth_mode(
            self.thirteenth_salary_mode.as_ref(),
        ) {
            Some(mode) => mode,
            None => {
                if !is_blank(self.thirteenth_salary_mode.as_ref()) {
                    warnings.push(warning(
                        "UNKNOWN_THIRTEENTH_MODE",
                        format!(
                            "thirteenth_salary_mode {} is not recognized and was treated as none",
                            raw(self.thirteenth_salary_mode.as_ref())
                        ),
                    ));
                }
                ThirteenthSalaryMode::None
            }
        };

        let input = InputParameters {
            base_salary: normalize_amount(
                "base_salary",
                self.base_salary.as_ref(),
                MAX_AMOUNT,
                &mut warnings,
            ),
            qualification_rate: normalize_amount(
                "qualification_rate",
                self.qualification_rate.as_ref(),
                MAX_RATE,
                &mut warnings,
            ),
            seniority_periods: normalize_count(
                "seniority_periods",
                self.seniority_periods.as_ref(),
                &mut warnings,
            ),
            dependents_count: normalize_count(
                "dependents_count",
                self.dependents_count.as_ref(),
                &mut warnings,
            ),
            transport_days: normalize_count(
                "transport_days",
                self.transport_days.as_ref(),
                &mut warnings,
            ),
            meal_days: normalize_count("meal_days", self.meal_days.as_ref(), &mut warnings),
            health_allowance_base,
            has_disability_health_surcharge: normalize_flag(
                self.has_disability_health_surcharge.as_ref(),
            ),
            regular_daycare_count: normalize_count(
                "regular_daycare_count",
                self.regular_daycare_count.as_ref(),
                &mut warnings,
            ),
            disability_daycare_count: normalize_count(
                "disability_daycare_count",
                self.disability_daycare_count.as_ref(),
                &mut warnings,
            ),
            has_vacation_bonus: normalize_flag(self.has_vacation_bonus.as_ref()),
            thirteenth_salary_mode,
        };

        Ok(NormalizedRequest { input, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayrollPolicy;
    use crate::error::EngineError;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn normalize(body: Value) -> NormalizedRequest {
        let request: CalculationRequest = serde_json::from_value(body).unwrap();
        request.normalize(&ConfigLoader::default()).unwrap()
    }

    #[test]
    fn test_deserialize_empty_request() {
        let normalized = normalize(json!({}));

        assert_eq!(normalized.input, InputParameters::default());
        assert!(normalized.warnings.is_empty());
    }

    #[test]
    fn test_amounts_accept_numbers_and_strings() {
        let normalized = normalize(json!({
            "base_salary": "10000,50",
            "qualification_rate": 0.1,
            "health_allowance_base": "1.234,56"
        }));

        assert_eq!(normalized.input.base_salary, dec("10000.50"));
        assert_eq!(normalized.input.qualification_rate, dec("0.1"));
        assert_eq!(normalized.input.health_allowance_base, dec("1234.56"));
        assert!(normalized.warnings.is_empty());
    }

    #[test]
    fn test_unparseable_and_negative_amounts_become_zero() {
        let normalized = normalize(json!({
            "base_salary": "abc",
            "qualification_rate": -0.2,
            "health_allowance_base": null
        }));

        assert_eq!(normalized.input.base_salary, Decimal::ZERO);
        assert_eq!(normalized.input.qualification_rate, Decimal::ZERO);
        let codes: Vec<&str> = normalized.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, vec!["UNPARSEABLE_AMOUNT", "NEGATIVE_AMOUNT"]);
    }

    #[test]
    fn test_counts_truncate_like_parse_int() {
        let normalized = normalize(json!({
            "seniority_periods": "4.9",
            "dependents_count": 2.7,
            "meal_days": " 22 days",
            "transport_days": "-3",
            "regular_daycare_count": "x"
        }));

        assert_eq!(normalized.input.seniority_periods, 4);
        assert_eq!(normalized.input.dependents_count, 2);
        assert_eq!(normalized.input.meal_days, 22);
        assert_eq!(normalized.input.transport_days, 0);
        assert_eq!(normalized.input.regular_daycare_count, 0);
        let codes: Vec<&str> = normalized.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, vec!["NEGATIVE_COUNT", "UNPARSEABLE_COUNT"]);
    }

    #[test]
    fn test_oversized_values_are_capped_with_warnings() {
        let normalized = normalize(json!({
            "base_salary": 7e28,
            "qualification_rate": "2,5",
            "health_allowance_base": "79228162514264337593543950335",
            "seniority_periods": "99999999999999999999",
            "dependents_count": 4294967295u64
        }));

        assert_eq!(normalized.input.base_salary, MAX_AMOUNT);
        assert_eq!(normalized.input.qualification_rate, dec("2.5"));
        assert_eq!(normalized.input.health_allowance_base, MAX_AMOUNT);
        assert_eq!(normalized.input.seniority_periods, MAX_COUNT);
        assert_eq!(normalized.input.dependents_count, MAX_COUNT);
        let codes: Vec<&str> = normalized.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "AMOUNT_OUT_OF_RANGE",
                "AMOUNT_OUT_OF_RANGE",
                "COUNT_OUT_OF_RANGE",
                "COUNT_OUT_OF_RANGE",
            ]
        );
        assert!(normalized.warnings[1].message.starts_with("base_salary"));
    }

    #[test]
    fn test_qualification_rate_capped_at_max_rate() {
        let normalized = normalize(json!({"qualification_rate": 1000}));

        assert_eq!(normalized.input.qualification_rate, MAX_RATE);
        assert_eq!(normalized.warnings[0].code, "AMOUNT_OUT_OF_RANGE");
    }

    #[test]
    fn test_flags_are_lenient() {
        assert!(normalize(json!({"has_vacation_bonus": "on"})).input.has_vacation_bonus);
        assert!(normalize(json!({"has_vacation_bonus": "TRUE"})).input.has_vacation_bonus);
        assert!(normalize(json!({"has_vacation_bonus": 1})).input.has_vacation_bonus);
        assert!(!normalize(json!({"has_vacation_bonus": "off"})).input.has_vacation_bonus);
        assert!(!normalize(json!({"has_vacation_bonus": null})).input.has_vacation_bonus);
    }

    #[test]
    fn test_thirteenth_mode_aliases() {
        let mode = |v: Value| parse_thirteenth_mode(Some(&v));

        assert_eq!(mode(json!("first")), Some(ThirteenthSalaryMode::FirstInstallment));
        assert_eq!(
            mode(json!("Second_Installment")),
            Some(ThirteenthSalaryMode::SecondInstallment)
        );
        assert_eq!(mode(json!(2)), Some(ThirteenthSalaryMode::SecondInstallment));
        assert_eq!(mode(json!("0")), Some(ThirteenthSalaryMode::None));
        assert_eq!(mode(json!("third")), None);
        assert_eq!(parse_thirteenth_mode(None), None);
    }

    #[test]
    fn test_unknown_thirteenth_mode_warns_and_pays_nothing() {
        let normalized = normalize(json!({"thirteenth_salary_mode": "third"}));

        assert_eq!(normalized.input.thirteenth_salary_mode, ThirteenthSalaryMode::None);
        assert_eq!(normalized.warnings[0].code, "UNKNOWN_THIRTEENTH_MODE");
    }

    #[test]
    fn test_age_resolves_health_allowance() {
        let normalized = normalize(json!({"age": "35"}));

        assert_eq!(normalized.input.health_allowance_base, dec("330.00"));
    }

    #[test]
    fn test_explicit_health_allowance_wins_over_age() {
        let normalized = normalize(json!({"age": 35, "health_allowance_base": "100"}));

        assert_eq!(normalized.input.health_allowance_base, dec("100"));
    }

    #[test]
    fn test_uncovered_age_is_an_error() {
        let mut policy = PayrollPolicy::default();
        policy.health_allowance.truncate(1);
        policy.health_allowance[0].max_age = Some(18);
        let config = ConfigLoader::from_policy(policy).unwrap();

        let request: CalculationRequest = serde_json::from_value(json!({"age": 40})).unwrap();
        let err = request.normalize(&config).unwrap_err();
        assert!(matches!(err, EngineError::HealthBracketNotFound { age: 40 }));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_decimal_text(" 3000.5 "), Some(dec("3000.5")));
        assert_eq!(parse_decimal_text("1e3"), Some(dec("1000")));
        assert_eq!(parse_decimal_text(""), None);
        assert_eq!(parse_leading_integer("+12abc"), Some(12));
        assert_eq!(parse_leading_integer("-7"), Some(-7));
        assert_eq!(parse_leading_integer("abc"), None);
    }
}
