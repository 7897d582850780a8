use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    CostOfWaiting, DEFAULT_SIMULATIONS, HEALTHY_END_AGE, HealthyWeeks, RetirementWeeks,
    SimulationError, SimulationInputs, SimulationResult, SpendingSmileInputs,
    calculate_spending_smile, cost_of_waiting, format_currency, healthy_weeks, retirement_weeks,
    risk_profile, run_monte_carlo,
};

const MAX_SIMULATIONS: u32 = 100_000;
const MAX_AGE: u32 = 120;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Simulation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_client_error() {
            warn!(error = %self, "rejected request");
        }
        error_response(self.status(), &self.to_string())
    }
}

fn bad_request(msg: impl Into<String>) -> ApiError {
    ApiError::BadRequest(msg.into())
}

#[derive(Parser, Debug)]
#[command(
    name = "roadmap",
    about = "Monte Carlo retirement success estimator with spending-smile analysis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one simulation and print a summary.
    Simulate {
        #[command(flatten)]
        args: SimulateArgs,
        #[arg(long, help = "Print the full result as JSON")]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(long)]
    current_age: u32,
    #[arg(long)]
    retirement_age: u32,
    #[arg(long, default_value_t = 92, help = "Age the plan must fund through")]
    life_expectancy: u32,
    #[arg(long)]
    total_savings: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Monthly contribution while still working"
    )]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 60, help = "Stock allocation in percent")]
    stocks_percent: u32,
    #[arg(long, default_value_t = 30, help = "Bond allocation in percent")]
    bonds_percent: u32,
    #[arg(long, default_value_t = 10, help = "Cash allocation in percent")]
    cash_percent: u32,
    #[arg(long, help = "Annual retirement spending in today's money")]
    annual_spending: f64,
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Apply Go-Go / Slow-Go / No-Go spending multipliers"
    )]
    spending_smile: bool,
    #[arg(long, default_value_t = 67)]
    social_security_age: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Monthly Social Security benefit at claiming age"
    )]
    social_security_monthly: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Other monthly retirement income in today's money"
    )]
    other_monthly_income: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
    simulations: u32,
    #[arg(long, help = "Seed for reproducible runs; random when omitted")]
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    total_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    stocks_percent: Option<u32>,
    bonds_percent: Option<u32>,
    cash_percent: Option<u32>,
    annual_spending: Option<f64>,
    spending_smile: Option<bool>,
    social_security_age: Option<u32>,
    social_security_monthly: Option<f64>,
    other_monthly_income: Option<f64>,
    inflation_rate: Option<f64>,
    num_simulations: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SpendingSmilePayload {
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    annual_spending: Option<f64>,
    inflation_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HealthyWeeksPayload {
    current_age: Option<f64>,
    healthy_end_age: Option<u32>,
    retire_age: Option<u32>,
    retire_age_later: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    risk_profile: &'static str,
    #[serde(flatten)]
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthyWeeksResponse {
    healthy_end_age: u32,
    #[serde(flatten)]
    weeks: HealthyWeeks,
    retirement: Option<RetirementWeeks>,
    comparison: Option<CostOfWaiting>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_inputs(args: SimulateArgs) -> Result<SimulationInputs, ApiError> {
    for (name, age) in [
        ("--current-age", args.current_age),
        ("--retirement-age", args.retirement_age),
        ("--life-expectancy", args.life_expectancy),
    ] {
        if age > MAX_AGE {
            return Err(bad_request(format!("{name} must be <= {MAX_AGE}")));
        }
    }

    if args.retirement_age < args.current_age {
        return Err(bad_request("--retirement-age must be >= --current-age"));
    }

    if args.life_expectancy <= args.retirement_age {
        return Err(bad_request("--life-expectancy must be > --retirement-age"));
    }

    if args.simulations == 0 || args.simulations > MAX_SIMULATIONS {
        return Err(bad_request(format!(
            "--simulations must be between 1 and {MAX_SIMULATIONS}"
        )));
    }

    let allocation_total =
        args.stocks_percent as u64 + args.bonds_percent as u64 + args.cash_percent as u64;
    if allocation_total != 100 {
        return Err(bad_request(
            "--stocks-percent, --bonds-percent and --cash-percent must sum to 100",
        ));
    }

    for (name, value) in [
        ("--total-savings", args.total_savings),
        ("--monthly-contribution", args.monthly_contribution),
        ("--social-security-monthly", args.social_security_monthly),
        ("--other-monthly-income", args.other_monthly_income),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(bad_request(format!("{name} must be >= 0")));
        }
    }

    if !args.annual_spending.is_finite() || args.annual_spending <= 0.0 {
        return Err(bad_request("--annual-spending must be > 0"));
    }

    if !args.inflation_rate.is_finite() || args.inflation_rate <= -100.0 {
        return Err(bad_request("--inflation-rate must be > -100"));
    }

    Ok(SimulationInputs {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        life_expectancy: args.life_expectancy,
        total_savings: args.total_savings,
        monthly_contribution: args.monthly_contribution,
        stocks_percent: args.stocks_percent,
        bonds_percent: args.bonds_percent,
        cash_percent: args.cash_percent,
        annual_spending: args.annual_spending,
        spending_smile_enabled: args.spending_smile,
        social_security_claim_age: args.social_security_age,
        social_security_monthly_amount: args.social_security_monthly,
        other_monthly_income: args.other_monthly_income,
        inflation_rate: args.inflation_rate / 100.0,
        num_simulations: args.simulations,
        seed: args.seed,
    })
}

/// Runs one simulation for the command line and renders it as text or JSON.
pub fn simulate_report(args: SimulateArgs, json: bool) -> Result<String, ApiError> {
    let inputs = build_inputs(args)?;
    let result = run_monte_carlo(&inputs)?;
    let response = SimulateResponse {
        risk_profile: risk_profile(inputs.stocks_percent),
        result,
    };

    if json {
        return serde_json::to_string_pretty(&response)
            .map_err(|e| ApiError::Internal(e.to_string()));
    }

    let result = &response.result;
    let comparison = &result.comparison;
    let mut lines = vec![
        format!(
            "Simulations: {} ({} allocation)",
            result.simulation_count, response.risk_profile
        ),
        format!("Success rate: {:.1}%", result.success_rate),
        format!(
            "Median ending wealth: {}",
            format_currency(result.median_ending_wealth, false)
        ),
        format!(
            "At 85: worst {} / median {} / best {}",
            format_currency(result.worst_case_at_85, true),
            format_currency(result.median_at_85, true),
            format_currency(result.best_case_at_85, true)
        ),
    ];
    if comparison.delay_years > 0 {
        lines.push(format!(
            "Retiring at {} instead of {}: success {:.1}% -> {:.1}%, median at 85 {} -> {}",
            comparison.delayed.retirement_age,
            comparison.current.retirement_age,
            comparison.current.success_rate,
            comparison.delayed.success_rate,
            format_currency(comparison.current.median_at_85, true),
            format_currency(comparison.delayed.median_at_85, true)
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/spending-smile",
            get(spending_smile_get_handler).post(spending_smile_post_handler),
        )
        .route("/api/healthy-weeks", get(healthy_weeks_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement roadmap API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    match simulate_payload(payload).await {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => err.into_response(),
    }
}

async fn simulate_payload(payload: SimulatePayload) -> Result<SimulateResponse, ApiError> {
    let inputs = inputs_from_payload(payload)?;
    let risk_profile = risk_profile(inputs.stocks_percent);
    // The run is CPU-bound and can take a while for large batches.
    let result = tokio::task::spawn_blocking(move || run_monte_carlo(&inputs))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(SimulateResponse {
        risk_profile,
        result,
    })
}

async fn spending_smile_get_handler(Query(payload): Query<SpendingSmilePayload>) -> Response {
    spending_smile_handler_impl(payload)
}

async fn spending_smile_post_handler(Json(payload): Json<SpendingSmilePayload>) -> Response {
    spending_smile_handler_impl(payload)
}

fn spending_smile_handler_impl(payload: SpendingSmilePayload) -> Response {
    match smile_inputs_from_payload(payload) {
        Ok(inputs) => json_response(StatusCode::OK, calculate_spending_smile(&inputs)),
        Err(err) => err.into_response(),
    }
}

async fn healthy_weeks_handler(Query(payload): Query<HealthyWeeksPayload>) -> Response {
    match healthy_weeks_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => err.into_response(),
    }
}

fn with_cache_control(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<SimulationInputs, ApiError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| bad_request(format!("Invalid API JSON payload: {e}")))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: SimulatePayload) -> Result<SimulationInputs, ApiError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        args.life_expectancy = v;
    }
    if let Some(v) = payload.total_savings {
        args.total_savings = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.stocks_percent {
        args.stocks_percent = v;
    }
    if let Some(v) = payload.bonds_percent {
        args.bonds_percent = v;
    }
    if let Some(v) = payload.cash_percent {
        args.cash_percent = v;
    }
    if let Some(v) = payload.annual_spending {
        args.annual_spending = v;
    }
    if let Some(v) = payload.spending_smile {
        args.spending_smile = v;
    }
    if let Some(v) = payload.social_security_age {
        args.social_security_age = v;
    }
    if let Some(v) = payload.social_security_monthly {
        args.social_security_monthly = v;
    }
    if let Some(v) = payload.other_monthly_income {
        args.other_monthly_income = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.num_simulations {
        args.simulations = v;
    }
    if payload.seed.is_some() {
        args.seed = payload.seed;
    }

    build_inputs(args)
}

fn smile_inputs_from_payload(
    payload: SpendingSmilePayload,
) -> Result<SpendingSmileInputs, ApiError> {
    let inputs = SpendingSmileInputs {
        retirement_age: payload.retirement_age.unwrap_or(65),
        life_expectancy: payload.life_expectancy.unwrap_or(95),
        initial_annual_spending: payload.annual_spending.unwrap_or(60_000.0),
        inflation_rate: payload.inflation_rate.unwrap_or(3.0) / 100.0,
    };

    if inputs.retirement_age > MAX_AGE || inputs.life_expectancy > MAX_AGE {
        return Err(bad_request(format!(
            "retirementAge and lifeExpectancy must be <= {MAX_AGE}"
        )));
    }
    if inputs.life_expectancy < inputs.retirement_age {
        return Err(bad_request("lifeExpectancy must be >= retirementAge"));
    }
    if !inputs.initial_annual_spending.is_finite() || inputs.initial_annual_spending < 0.0 {
        return Err(bad_request("annualSpending must be >= 0"));
    }
    if !inputs.inflation_rate.is_finite() || inputs.inflation_rate <= -1.0 {
        return Err(bad_request("inflationRate must be > -100"));
    }

    Ok(inputs)
}

fn healthy_weeks_from_payload(
    payload: HealthyWeeksPayload,
) -> Result<HealthyWeeksResponse, ApiError> {
    let Some(current_age) = payload.current_age else {
        return Err(bad_request("currentAge is required"));
    };
    if !current_age.is_finite() || !(0.0..=MAX_AGE as f64).contains(&current_age) {
        return Err(bad_request(format!("currentAge must be between 0 and {MAX_AGE}")));
    }

    let healthy_end_age = payload.healthy_end_age.unwrap_or(HEALTHY_END_AGE);
    let ages = [Some(healthy_end_age), payload.retire_age, payload.retire_age_later];
    if ages.into_iter().flatten().any(|age| age > MAX_AGE) {
        return Err(bad_request(format!(
            "healthyEndAge, retireAge and retireAgeLater must be <= {MAX_AGE}"
        )));
    }

    let retirement = payload
        .retire_age
        .map(|age| retirement_weeks(current_age, age, healthy_end_age));
    let comparison = match (payload.retire_age, payload.retire_age_later) {
        (Some(early), Some(late)) if late < early => {
            return Err(bad_request("retireAgeLater must be >= retireAge"));
        }
        (Some(early), Some(late)) => Some(cost_of_waiting(early, late)),
        _ => None,
    };

    Ok(HealthyWeeksResponse {
        healthy_end_age,
        weeks: healthy_weeks(current_age, healthy_end_age),
        retirement,
        comparison,
    })
}

fn default_args_for_api() -> SimulateArgs {
    SimulateArgs {
        current_age: 55,
        retirement_age: 62,
        life_expectancy: 92,
        total_savings: 800_000.0,
        monthly_contribution: 2_000.0,
        stocks_percent: 60,
        bonds_percent: 30,
        cash_percent: 10,
        annual_spending: 72_000.0,
        spending_smile: true,
        social_security_age: 67,
        social_security_monthly: 2_800.0,
        other_monthly_income: 0.0,
        inflation_rate: 3.0,
        simulations: DEFAULT_SIMULATIONS,
        seed: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_args() -> SimulateArgs {
        default_args_for_api()
    }

    fn expect_bad_request(result: Result<SimulationInputs, ApiError>, needle: &str) {
        match result {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("expected bad request mentioning {needle}, got {other:?}"),
        }
    }

    #[test]
    fn build_inputs_converts_inflation_percent_to_decimal() {
        let inputs = build_inputs(sample_args()).expect("valid inputs");
        assert_approx(inputs.inflation_rate, 0.03);
        assert_eq!(inputs.num_simulations, 1_000);
        assert_eq!(inputs.horizon_years(), 37);
    }

    #[test]
    fn build_inputs_rejects_allocation_not_summing_to_100() {
        let mut args = sample_args();
        args.cash_percent = 20;
        expect_bad_request(build_inputs(args), "sum to 100");
    }

    #[test]
    fn build_inputs_rejects_retirement_before_current_age() {
        let mut args = sample_args();
        args.retirement_age = 50;
        expect_bad_request(build_inputs(args), "--retirement-age");
    }

    #[test]
    fn build_inputs_allows_immediate_retirement() {
        let mut args = sample_args();
        args.retirement_age = args.current_age;
        assert!(build_inputs(args).is_ok());
    }

    #[test]
    fn build_inputs_rejects_life_expectancy_at_retirement() {
        let mut args = sample_args();
        args.life_expectancy = args.retirement_age;
        expect_bad_request(build_inputs(args), "--life-expectancy");
    }

    #[test]
    fn build_inputs_rejects_ages_past_the_maximum() {
        let mut args = sample_args();
        args.life_expectancy = 4_000_000_000;
        expect_bad_request(build_inputs(args), "--life-expectancy must be <= 120");

        let mut args = sample_args();
        args.current_age = 121;
        args.retirement_age = 121;
        args.life_expectancy = 122;
        expect_bad_request(build_inputs(args), "--current-age");

        let mut args = sample_args();
        args.life_expectancy = MAX_AGE;
        assert!(build_inputs(args).is_ok());
    }

    #[test]
    fn build_inputs_rejects_zero_simulations() {
        let mut args = sample_args();
        args.simulations = 0;
        expect_bad_request(build_inputs(args), "--simulations");
    }

    #[test]
    fn build_inputs_rejects_negative_savings() {
        let mut args = sample_args();
        args.total_savings = -1.0;
        expect_bad_request(build_inputs(args), "--total-savings");
    }

    #[test]
    fn build_inputs_rejects_non_positive_spending() {
        let mut args = sample_args();
        args.annual_spending = 0.0;
        expect_bad_request(build_inputs(args), "--annual-spending");
    }

    #[test]
    fn inputs_from_json_parses_web_keys() {
        let json = r#"{
          "currentAge": 50,
          "retirementAge": 60,
          "lifeExpectancy": 95,
          "totalSavings": 500000,
          "monthlyContribution": 1500,
          "stocksPercent": 70,
          "bondsPercent": 25,
          "cashPercent": 5,
          "annualSpending": 65000,
          "spendingSmile": false,
          "socialSecurityAge": 70,
          "socialSecurityMonthly": 3100,
          "otherMonthlyIncome": 400,
          "inflationRate": 2.5,
          "numSimulations": 250,
          "seed": 9
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_eq!(inputs.current_age, 50);
        assert_eq!(inputs.retirement_age, 60);
        assert_eq!(inputs.life_expectancy, 95);
        assert_approx(inputs.total_savings, 500_000.0);
        assert_approx(inputs.monthly_contribution, 1_500.0);
        assert_eq!(
            (inputs.stocks_percent, inputs.bonds_percent, inputs.cash_percent),
            (70, 25, 5)
        );
        assert_approx(inputs.annual_spending, 65_000.0);
        assert!(!inputs.spending_smile_enabled);
        assert_eq!(inputs.social_security_claim_age, 70);
        assert_approx(inputs.social_security_monthly_amount, 3_100.0);
        assert_approx(inputs.other_monthly_income, 400.0);
        assert_approx(inputs.inflation_rate, 0.025);
        assert_eq!(inputs.num_simulations, 250);
        assert_eq!(inputs.seed, Some(9));
    }

    #[test]
    fn inputs_from_empty_json_uses_simple_defaults() {
        let inputs = inputs_from_json("{}").expect("defaults are valid");
        assert_eq!(
            (inputs.stocks_percent, inputs.bonds_percent, inputs.cash_percent),
            (60, 30, 10)
        );
        assert!(inputs.spending_smile_enabled);
        assert_approx(inputs.other_monthly_income, 0.0);
        assert_eq!(inputs.num_simulations, DEFAULT_SIMULATIONS);
        assert_eq!(inputs.seed, None);
    }

    #[test]
    fn smile_payload_defaults_and_validation() {
        let inputs =
            smile_inputs_from_payload(SpendingSmilePayload::default()).expect("defaults are valid");
        assert_eq!(inputs.retirement_age, 65);
        assert_approx(inputs.inflation_rate, 0.03);

        let err = smile_inputs_from_payload(SpendingSmilePayload {
            retirement_age: Some(70),
            life_expectancy: Some(60),
            ..SpendingSmilePayload::default()
        })
        .expect_err("must reject inverted ages");
        assert!(err.to_string().contains("lifeExpectancy"));
    }

    #[test]
    fn smile_payload_rejects_extreme_ages() {
        let err = smile_inputs_from_payload(SpendingSmilePayload {
            retirement_age: Some(u32::MAX - 3),
            life_expectancy: Some(u32::MAX),
            ..SpendingSmilePayload::default()
        })
        .expect_err("must reject ages past the maximum");
        assert!(err.to_string().contains("<= 120"));
    }

    #[test]
    fn healthy_weeks_payload_builds_breakdown_and_comparison() {
        let response = healthy_weeks_from_payload(HealthyWeeksPayload {
            current_age: Some(60.0),
            healthy_end_age: None,
            retire_age: Some(62),
            retire_age_later: Some(67),
        })
        .expect("valid payload");
        assert_eq!(response.weeks.weeks_remaining, 1_300);
        assert_eq!(response.weeks.percent_lived, 62);
        assert_eq!(response.retirement.map(|r| r.weeks_until_retirement), Some(104));
        assert_eq!(response.comparison.map(|c| c.weeks_lost), Some(260));
        assert_eq!(response.comparison.map(|c| c.equivalent_saturdays), Some(260));

        let json = serde_json::to_string(&response).expect("serializable");
        assert!(json.contains("\"totalAdultWeeks\":3380"));
        assert!(json.contains("\"weeksLived\":2080"));

        let missing = healthy_weeks_from_payload(HealthyWeeksPayload::default());
        assert!(matches!(missing, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn healthy_weeks_payload_keeps_fractional_age() {
        let response = healthy_weeks_from_payload(HealthyWeeksPayload {
            current_age: Some(60.5),
            healthy_end_age: None,
            retire_age: Some(62),
            retire_age_later: None,
        })
        .expect("valid payload");
        assert_eq!(response.retirement.map(|r| r.weeks_until_retirement), Some(78));
        assert_eq!(response.weeks.weeks_lived, 2_106);
        assert!(response.comparison.is_none());
    }

    #[test]
    fn healthy_weeks_payload_rejects_extreme_ages() {
        let rejected = healthy_weeks_from_payload(HealthyWeeksPayload {
            current_age: Some(60.0),
            healthy_end_age: Some(u32::MAX),
            retire_age: None,
            retire_age_later: None,
        });
        assert!(matches!(rejected, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn api_errors_map_to_status_codes() {
        let response = bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );

        let internal = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn simulate_report_renders_text_summary() {
        let mut args = sample_args();
        args.simulations = 50;
        args.seed = Some(3);
        let report = simulate_report(args, false).expect("valid run");
        assert!(report.contains("Simulations: 50 (Growth allocation)"));
        assert!(report.contains("Success rate:"));
        assert!(report.contains("Retiring at 67 instead of 62"));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let mut args = sample_args();
        args.simulations = 20;
        args.seed = Some(11);
        let json = simulate_report(args, true).expect("valid run");
        assert!(json.contains("\"riskProfile\""));
        assert!(json.contains("\"percentiles\""));
        assert!(json.contains("\"successRate\""));
        assert!(json.contains("\"medianEndingWealth\""));
        assert!(json.contains("\"worstCaseAt85\""));
        assert!(json.contains("\"bestCaseAt85\""));
        assert!(json.contains("\"delayYears\""));
        assert!(json.contains("\"simulationCount\""));
        assert!(json.contains("\"generatedAt\""));
    }

    #[tokio::test]
    async fn simulate_handler_offloads_and_returns_ok() {
        let payload = SimulatePayload {
            num_simulations: Some(30),
            seed: Some(5),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::OK);

        let rejected = simulate_handler_impl(SimulatePayload {
            stocks_percent: Some(90),
            ..SimulatePayload::default()
        })
        .await;
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    }
}
