use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{Inputs, Projection, run_projection};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const MAX_YEARS: u32 = 1_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    start_amount: Option<f64>,
    inflation_rate: Option<f64>,
    interest_rate: Option<f64>,
    years: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "kaufkraft project",
    about = "Purchasing-power projection (inflation vs. a constant nominal interest rate)"
)]
pub struct Cli {
    #[arg(long, default_value_t = 1000.0, help = "Nominal amount at year zero")]
    start_amount: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual inflation rate in percent, e.g. 2"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 0.5,
        help = "Annual nominal interest rate in percent, e.g. 0.5"
    )]
    interest_rate: f64,
    #[arg(long, default_value_t = 10, help = "Projection horizon in whole years")]
    years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    start_amount: f64,
    inflation_rate: f64,
    interest_rate: f64,
    years: u32,
    end_amount_no_interest: f64,
    end_amount_with_interest: f64,
    loss_no_interest: f64,
    loss_with_interest: f64,
    series_no_interest: Vec<f64>,
    series_with_interest: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<Inputs, String> {
    for (name, value) in [
        ("--start-amount", cli.start_amount),
        ("--inflation-rate", cli.inflation_rate),
        ("--interest-rate", cli.interest_rate),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
        if value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if cli.inflation_rate > 100.0 {
        return Err("--inflation-rate must be between 0 and 100".to_string());
    }

    if cli.years == 0 {
        return Err("--years must be >= 1".to_string());
    }

    if cli.years > MAX_YEARS {
        return Err(format!("--years must be <= {MAX_YEARS}"));
    }

    Ok(Inputs {
        start_amount: cli.start_amount,
        inflation_rate_pct: cli.inflation_rate,
        interest_rate_pct: cli.interest_rate,
        years: cli.years,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "purchasing-power calculator listening");
    println!("Purchasing-power calculator listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

pub fn run_cli(args: &[String]) -> Result<(), String> {
    let cli = Cli::parse_from(args);
    let inputs = build_inputs(cli)?;
    let projection = run_projection(&inputs).map_err(|e| e.to_string())?;

    println!(
        "Purchasing power of {:.2} over {} years ({}% inflation, {}% interest)",
        projection.start_amount,
        projection.years,
        inputs.inflation_rate_pct,
        inputs.interest_rate_pct
    );
    println!(
        "  end amount without interest: {:>12.2}",
        projection.end_amount_no_interest
    );
    println!(
        "  end amount with interest:    {:>12.2}",
        projection.end_amount_with_interest
    );
    println!(
        "  loss without interest:       {:>12.2}",
        projection.loss_no_interest
    );
    println!(
        "  loss despite interest:       {:>12.2}",
        projection.loss_with_interest
    );
    println!();
    println!("  year  without interest  with interest");
    for (year, (without, with)) in projection
        .series_no_interest
        .iter()
        .zip(projection.series_with_interest.iter())
        .enumerate()
    {
        println!("  {year:>4}  {without:>16.2}  {with:>13.2}");
    }

    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            warn!(error = %msg, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let projection = match run_projection(&inputs) {
        Ok(projection) => projection,
        Err(e) => {
            warn!(error = %e, "projection failed");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    json_response(StatusCode::OK, build_project_response(&inputs, projection))
}

fn inputs_from_payload(payload: ProjectPayload) -> Result<Inputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.start_amount {
        cli.start_amount = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        start_amount: 1000.0,
        inflation_rate: 2.0,
        interest_rate: 0.5,
        years: 10,
    }
}

fn build_project_response(inputs: &Inputs, projection: Projection) -> ProjectResponse {
    ProjectResponse {
        start_amount: projection.start_amount,
        inflation_rate: inputs.inflation_rate_pct,
        interest_rate: inputs.interest_rate_pct,
        years: projection.years,
        end_amount_no_interest: projection.end_amount_no_interest,
        end_amount_with_interest: projection.end_amount_with_interest,
        loss_no_interest: projection.loss_no_interest,
        loss_with_interest: projection.loss_with_interest,
        series_no_interest: projection.series_no_interest,
        series_with_interest: projection.series_with_interest,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
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
fn inputs_from_json(json: &str) -> Result<Inputs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_inputs_accepts_the_defaults() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        assert_approx(inputs.start_amount, 1000.0);
        assert_approx(inputs.inflation_rate_pct, 2.0);
        assert_approx(inputs.interest_rate_pct, 0.5);
        assert_eq!(inputs.years, 10);
    }

    #[test]
    fn build_inputs_rejects_negative_start_amount() {
        let mut cli = sample_cli();
        cli.start_amount = -1.0;

        let err = build_inputs(cli).expect_err("must reject negative amount");
        assert!(err.contains("--start-amount"));
    }

    #[test]
    fn build_inputs_rejects_non_finite_rate() {
        let mut cli = sample_cli();
        cli.inflation_rate = f64::NAN;

        let err = build_inputs(cli).expect_err("must reject NaN rate");
        assert!(err.contains("--inflation-rate"));
    }

    #[test]
    fn build_inputs_rejects_inflation_above_one_hundred_percent() {
        let mut cli = sample_cli();
        cli.inflation_rate = 101.0;

        let err = build_inputs(cli).expect_err("must reject > 100% inflation");
        assert!(err.contains("--inflation-rate"));
    }

    #[test]
    fn build_inputs_rejects_zero_years_and_oversized_horizons() {
        let mut cli = sample_cli();
        cli.years = 0;
        let err = build_inputs(cli).expect_err("must reject zero years");
        assert!(err.contains("--years"));

        let mut cli = sample_cli();
        cli.years = MAX_YEARS + 1;
        let err = build_inputs(cli).expect_err("must reject oversized horizon");
        assert!(err.contains("--years"));
    }

    #[test]
    fn inputs_from_json_parses_web_keys() {
        let json = r#"{
          "startAmount": 2500,
          "inflationRate": 3.1,
          "interestRate": 1.25,
          "years": 25
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.start_amount, 2500.0);
        assert_approx(inputs.inflation_rate_pct, 3.1);
        assert_approx(inputs.interest_rate_pct, 1.25);
        assert_eq!(inputs.years, 25);
    }

    #[test]
    fn inputs_from_json_falls_back_to_defaults_for_missing_keys() {
        let inputs = inputs_from_json(r#"{"startAmount": 500}"#).expect("json should parse");

        assert_approx(inputs.start_amount, 500.0);
        assert_approx(inputs.inflation_rate_pct, 2.0);
        assert_approx(inputs.interest_rate_pct, 0.5);
        assert_eq!(inputs.years, 10);
    }

    #[test]
    fn inputs_from_json_surfaces_validation_errors() {
        let err = inputs_from_json(r#"{"years": 0}"#).expect_err("must reject zero years");
        assert!(err.contains("--years"));
    }

    #[test]
    fn project_response_serialization_contains_expected_fields() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        let projection = run_projection(&inputs).expect("valid inputs");
        let response = build_project_response(&inputs, projection);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"startAmount\""));
        assert!(json.contains("\"inflationRate\""));
        assert!(json.contains("\"interestRate\""));
        assert!(json.contains("\"endAmountNoInterest\""));
        assert!(json.contains("\"endAmountWithInterest\""));
        assert!(json.contains("\"lossNoInterest\""));
        assert!(json.contains("\"lossWithInterest\""));
        assert!(json.contains("\"seriesNoInterest\""));
        assert!(json.contains("\"seriesWithInterest\""));
    }

    #[test]
    fn project_response_carries_the_reference_scenario_values() {
        let inputs = build_inputs(sample_cli()).expect("valid inputs");
        let projection = run_projection(&inputs).expect("valid inputs");
        let response = build_project_response(&inputs, projection);

        assert_approx(response.end_amount_no_interest, 817.0728068875467);
        assert_approx(response.end_amount_with_interest, 858.8580181187145);
        assert_eq!(response.series_no_interest.len(), 11);
        assert_eq!(response.series_with_interest.len(), 11);
        assert_approx(response.series_no_interest[0], 1000.0);
        assert_approx(response.series_with_interest[0], 1000.0);
    }
}
