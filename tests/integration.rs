//! Integration tests for the Payslip Engine HTTP API.
//!
//! This test suite drives the router end to end:
//! - Regular payslips across the contribution and tax brackets
//! - Vacation bonus and 13th-salary installments
//! - Indemnity allowances and age-based health allowance lookup
//! - Lenient input normalization and warnings
//! - Policy loading and the policy endpoint
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payslip_engine::api::{AppState, create_router};
use payslip_engine::config::{ConfigLoader, PayrollPolicy};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/sp_2026").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_raw(router: Router, body: String) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri("/calculate")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    post_raw(router, body.to_string()).await
}

fn amount(response: &Value, field: &str) -> Decimal {
    let value = &response["result"][field];
    decimal(
        value
            .as_str()
            .unwrap_or_else(|| panic!("{} is not a string: {}", field, value)),
    )
}

fn assert_amount(response: &Value, field: &str, expected: &str) {
    assert_eq!(
        amount(response, field),
        decimal(expected),
        "unexpected {}",
        field
    );
}

fn assert_identities(response: &Value) {
    assert_eq!(
        amount(response, "gross_total"),
        amount(response, "taxable_total_with_vacation")
            + amount(response, "indemnity_total")
            + amount(response, "thirteenth_first_installment")
            + amount(response, "thirteenth_second_installment")
    );
    assert_eq!(
        amount(response, "net_salary"),
        amount(response, "gross_total") - amount(response, "total_deductions")
    );
}

fn rule_ids(response: &Value) -> Vec<String> {
    response["result"]["audit_steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["rule_id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Regular payslips
// =============================================================================

#[tokio::test]
async fn test_senior_servant_with_dependent() {
    let (status, response) = post_calculate(
        create_router_for_test(),
        json!({
            "base_salary": "10000",
            "qualification_rate": "0.1",
            "seniority_periods": 4,
            "dependents_count": 1
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_amount(&response, "qualification_bonus", "1000");
    assert_amount(&response, "seniority_bonus", "2200");
    assert_amount(&response, "loyalty_bonus", "2200");
    assert_amount(&response, "taxable_total", "16400");
    assert_amount(&response, "social_security_contribution", "1046.4082");
    assert_amount(&response, "income_tax", "3261.370495");
    assert_amount(&response, "net_salary", "12092.221305");
    assert_identities(&response);
}

#[tokio::test]
async fn test_low_salary_pays_contribution_but_no_tax() {
    let (status, response) =
        post_calculate(create_router_for_test(), json!({"base_salary": 3000})).await;

    assert_eq!(status, StatusCode::OK);
    assert_amount(&response, "social_security_contribution", "344.82");
    assert_amount(&response, "income_tax", "0");
    assert_amount(&response, "net_salary", "2655.18");
}

#[tokio::test]
async fn test_sliding_deduction_range() {
    let (_, response) =
        post_calculate(create_router_for_test(), json!({"base_salary": "5500"})).await;

    assert_amount(&response, "social_security_contribution", "674.3708");
    assert_amount(&response, "income_tax", "163.95407");
    assert_identities(&response);
}

#[tokio::test]
async fn test_loyalty_bonus_starts_at_fourth_period() {
    let router = create_router_for_test();
    let (_, three) = post_calculate(
        router.clone(),
        json!({"base_salary": "5000", "seniority_periods": 3}),
    )
    .await;
    let (_, four) =
        post_calculate(router, json!({"base_salary": "5000", "seniority_periods": 4})).await;

    assert_amount(&three, "loyalty_bonus", "0");
    assert_amount(&four, "loyalty_bonus", "1000");
}

// =============================================================================
// Vacation and 13th salary
// =============================================================================

#[tokio::test]
async fn test_vacation_bonus_is_taxed_with_salary() {
    let (_, response) = post_calculate(
        create_router_for_test(),
        json!({"base_salary": "4500", "has_vacation_bonus": "on"}),
    )
    .await;

    assert_amount(&response, "vacation_bonus", "1500");
    assert_amount(&response, "taxable_total_with_vacation", "6000");
    assert_amount(&response, "social_security_contribution", "744.3708");
    assert_amount(&response, "income_tax", "356.81803");
    assert_identities(&response);
}

#[tokio::test]
async fn test_first_installment_has_no_withholding() {
    let (_, response) = post_calculate(
        create_router_for_test(),
        json!({"base_salary": "6000", "thirteenth_salary_mode": "first"}),
    )
    .await;

    assert_amount(&response, "thirteenth_first_installment", "3000");
    assert_amount(&response, "social_security_contribution_on_thirteenth", "0");
    assert_amount(&response, "income_tax_on_thirteenth", "0");
    assert!(!rule_ids(&response).contains(&"income_tax_13th".to_string()));
    assert_identities(&response);
}

#[tokio::test]
async fn test_second_installment_withholds_on_full_taxable_total() {
    let (_, response) = post_calculate(
        create_router_for_test(),
        json!({"base_salary": "6000", "thirteenth_salary_mode": 2}),
    )
    .await;

    assert_amount(&response, "thirteenth_second_installment", "3000");
    assert_amount(&response, "social_security_contribution_on_thirteenth", "744.3708");
    assert_amount(&response, "income_tax_on_thirteenth", "356.81803");
    assert_eq!(
        rule_ids(&response)[6..],
        ["social_security_contribution_13th", "income_tax_13th", "net_salary"]
    );
    assert_identities(&response);
}

// =============================================================================
// Indemnity allowances
// =============================================================================

#[tokio::test]
async fn test_indemnities_add_to_gross_untaxed() {
    let (_, response) = post_calculate(
        create_router_for_test(),
        json!({
            "base_salary": "3000",
            "meal_days": "22",
            "transport_days": 20,
            "age": 35,
            "has_disability_health_surcharge": true,
            "regular_daycare_count": 1,
            "disability_daycare_count": "1"
        }),
    )
    .await;

    assert_amount(&response, "meal_allowance", "1760");
    assert_amount(&response, "transport_allowance", "280");
    assert_amount(&response, "health_allowance_final", "495");
    assert_amount(&response, "daycare_regular_allowance", "805");
    assert_amount(&response, "daycare_disability_allowance", "1207.50");
    assert_amount(&response, "indemnity_total", "4547.50");
    assert_amount(&response, "social_security_contribution", "344.82");
    assert_amount(&response, "income_tax", "0");
    assert_identities(&response);
}

// =============================================================================
// Normalization
// =============================================================================

#[tokio::test]
async fn test_lenient_values_are_normalized_with_warnings() {
    let (status, response) = post_calculate(
        create_router_for_test(),
        json!({
            "base_salary": "3.000,00",
            "qualification_rate": "abc",
            "seniority_periods": "-2",
            "thirteenth_salary_mode": "sometimes"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["input"]["base_salary"], "3000.00");
    assert_eq!(response["input"]["qualification_rate"], "0");
    assert_eq!(response["input"]["seniority_periods"], 0);
    assert_eq!(response["input"]["thirteenth_salary_mode"], "none");

    let codes: Vec<&str> = response["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec!["UNKNOWN_THIRTEENTH_MODE", "UNPARSEABLE_AMOUNT", "NEGATIVE_COUNT"]
    );
}

#[tokio::test]
async fn test_empty_body_yields_zero_payslip() {
    let (status, response) = post_calculate(create_router_for_test(), json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_amount(&response, "gross_total", "0");
    assert_amount(&response, "net_salary", "0");
    assert_eq!(response["warnings"], json!([]));
}

#[tokio::test]
async fn test_decimal_scale_amounts_are_capped() {
    let body = r#"{
        "base_salary": 70000000000000000000000000000,
        "qualification_rate": 2,
        "seniority_periods": "4294967296",
        "dependents_count": 1,
        "has_vacation_bonus": true,
        "thirteenth_salary_mode": "second"
    }"#;
    let (status, response) = post_raw(create_router_for_test(), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["input"]["base_salary"], "1000000000000");
    assert_eq!(response["input"]["seniority_periods"], 10000);
    assert_amount(&response, "social_security_contribution", "1046.4082");
    assert_identities(&response);

    let codes: Vec<&str> = response["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["AMOUNT_OUT_OF_RANGE", "COUNT_OUT_OF_RANGE"]);
}

#[tokio::test]
async fn test_response_envelope() {
    let (_, response) =
        post_calculate(create_router_for_test(), json!({"base_salary": 3000})).await;

    assert!(uuid::Uuid::parse_str(response["calculation_id"].as_str().unwrap()).is_ok());
    assert!(response["timestamp"].is_string());
    assert_eq!(response["engine_version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(response["policy_version"], "2026");
    assert!(response["duration_us"].is_u64());

    let steps = response["result"]["audit_steps"].as_array().unwrap();
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step["step_number"], i as u64 + 1);
        assert!(step["legal_ref"].is_string());
        assert!(step["reasoning"].is_string());
    }
}

#[tokio::test]
async fn test_results_are_deterministic() {
    let body = json!({
        "base_salary": "7321.45",
        "qualification_rate": "0.15",
        "seniority_periods": 5,
        "dependents_count": 2,
        "has_vacation_bonus": true,
        "thirteenth_salary_mode": "second_installment"
    });

    let router = create_router_for_test();
    let (_, first) = post_calculate(router.clone(), body.clone()).await;
    let (_, second) = post_calculate(router, body).await;

    assert_eq!(first["result"], second["result"]);
    assert_ne!(first["calculation_id"], second["calculation_id"]);
}

// =============================================================================
// Policy
// =============================================================================

#[tokio::test]
async fn test_policy_endpoint_returns_active_policy() {
    let (status, response) = send(
        create_router_for_test(),
        Request::builder()
            .method("GET")
            .uri("/policy")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["metadata"]["code"], "SP-2026");
    assert_eq!(response["health_allowance"].as_array().unwrap().len(), 10);
    assert_eq!(response["contribution"]["maximum_contribution"], "1046.41");
}

#[test]
fn test_loaded_policy_matches_built_in_policy() {
    let loaded = ConfigLoader::load("./config/sp_2026").unwrap();
    assert_eq!(loaded.policy(), &PayrollPolicy::default());
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json() {
    let (status, response) =
        post_raw(create_router_for_test(), "{\"base_salary\": ".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_non_object_body_is_malformed() {
    let (status, response) = post_raw(create_router_for_test(), "\"payslip\"".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_content_type() {
    let (status, response) = send(
        create_router_for_test(),
        Request::builder()
            .method("POST")
            .uri("/calculate")
            .body(Body::from("{}"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "MISSING_CONTENT_TYPE");
}

#[tokio::test]
async fn test_uncovered_age_is_rejected() {
    let mut policy = PayrollPolicy::default();
    policy.health_allowance.truncate(1);
    let config = ConfigLoader::from_policy(policy).unwrap();
    let router = create_router(AppState::new(config));

    let (status, response) = post_calculate(router, json!({"age": 60})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "HEALTH_BRACKET_NOT_FOUND");
}
