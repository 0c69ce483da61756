mod error;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::format::{coerce_number, format_countdown, format_daily_budget, group_thousands};
use crate::core::{DepletionPolicy, InputState, ProjectionResult, TrajectoryPoint, project_with};

pub use error::ApiError;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliDepletionPolicy {
    CarryDeficit,
    FloorAtZero,
}

impl From<CliDepletionPolicy> for DepletionPolicy {
    fn from(value: CliDepletionPolicy) -> Self {
        match value {
            CliDepletionPolicy::CarryDeficit => DepletionPolicy::CarryDeficit,
            CliDepletionPolicy::FloorAtZero => DepletionPolicy::FloorAtZero,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDepletionPolicy {
    #[serde(alias = "carryDeficit", alias = "carry_deficit", alias = "carry")]
    CarryDeficit,
    #[serde(alias = "floorAtZero", alias = "floor_at_zero", alias = "floor")]
    FloorAtZero,
}

impl From<ApiDepletionPolicy> for CliDepletionPolicy {
    fn from(value: ApiDepletionPolicy) -> Self {
        match value {
            ApiDepletionPolicy::CarryDeficit => CliDepletionPolicy::CarryDeficit,
            ApiDepletionPolicy::FloorAtZero => CliDepletionPolicy::FloorAtZero,
        }
    }
}

/// A form field as it arrives over the wire: JSON numbers pass through,
/// text goes through the same coercion as the page inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn coerce(&self) -> f64 {
        match self {
            NumericField::Number(v) => *v,
            NumericField::Text(text) => coerce_number(text),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    age: Option<NumericField>,
    life_expectancy: Option<NumericField>,
    assets: Option<NumericField>,
    #[serde(alias = "income")]
    monthly_income: Option<NumericField>,
    #[serde(alias = "expenses")]
    monthly_expenses: Option<NumericField>,
    #[serde(alias = "rate", alias = "annualRatePercent")]
    annual_rate: Option<NumericField>,
    depletion_policy: Option<ApiDepletionPolicy>,
}

fn parse_form_number(text: &str) -> Result<f64, Infallible> {
    Ok(coerce_number(text))
}

#[derive(Parser, Debug)]
#[command(
    name = "runway",
    about = "Life countdown: project assets out to life expectancy and derive a daily budget",
    allow_negative_numbers = true
)]
pub struct Cli {
    #[arg(long, default_value_t = 30.0, value_parser = parse_form_number, help = "Current age in years")]
    age: f64,
    #[arg(
        long,
        default_value_t = 85.0,
        value_parser = parse_form_number,
        help = "Expected age at end of life"
    )]
    life_expectancy: f64,
    #[arg(
        long,
        default_value_t = 5_000_000.0,
        value_parser = parse_form_number,
        help = "Current net assets"
    )]
    assets: f64,
    #[arg(long, default_value_t = 300_000.0, value_parser = parse_form_number)]
    monthly_income: f64,
    #[arg(long, default_value_t = 250_000.0, value_parser = parse_form_number)]
    monthly_expenses: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        value_parser = parse_form_number,
        help = "Annual growth rate applied to assets in percent, e.g. 3"
    )]
    annual_rate: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliDepletionPolicy::CarryDeficit,
        help = "Whether a depleted balance keeps compounding below zero or is floored"
    )]
    depletion_policy: CliDepletionPolicy,
    #[arg(long, help = "Print the JSON response body instead of the cards")]
    json: bool,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: InputState,
    policy: DepletionPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplayResponse {
    countdown: String,
    daily_budget: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    inputs: InputState,
    depletion_policy: DepletionPolicy,
    remaining_years: f64,
    remaining_days: f64,
    final_assets: f64,
    daily_budget: f64,
    trajectory: Vec<TrajectoryPoint>,
    truncated: bool,
    display: DisplayResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> InputState {
    InputState {
        age: cli.age,
        life_expectancy: cli.life_expectancy,
        assets: cli.assets,
        monthly_income: cli.monthly_income,
        monthly_expenses: cli.monthly_expenses,
        annual_rate_percent: cli.annual_rate,
    }
}

/// Evaluates one projection from command-line flags and prints it.
pub fn run_cli() -> Result<(), ApiError> {
    let cli = Cli::parse();
    let inputs = build_inputs(&cli);
    let policy: DepletionPolicy = cli.depletion_policy.into();
    let result = project_with(&inputs, policy);
    debug!(
        age = inputs.age,
        life_expectancy = inputs.life_expectancy,
        points = result.trajectory.len(),
        "projection evaluated"
    );

    if cli.json {
        let response = build_project_response(inputs, policy, result);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_cards(&result));
    }
    Ok(())
}

fn render_cards(result: &ProjectionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} days left\n",
        format_countdown(result.remaining_days)
    ));
    out.push_str(&format!("{}\n", format_daily_budget(result.daily_budget)));
    if result.trajectory.is_empty() {
        return out;
    }
    out.push_str("\nAge      Assets\n");
    for point in &result.trajectory {
        out.push_str(&format!(
            "{:<8} {}\n",
            group_thousands(point.year),
            group_thousands(point.assets)
        ));
    }
    if result.truncated {
        out.push_str(&format!(
            "(trajectory cut at {} years)\n",
            group_thousands(result.trajectory.len() as f64)
        ));
    }
    out
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "life runway server listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
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
    ApiError::NotFound.into_response()
}

async fn project_get_handler(
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(payload) = payload.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    Ok(project_handler_impl(payload))
}

async fn project_post_handler(
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    Ok(project_handler_impl(payload))
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = api_request_from_payload(payload);
    let result = project_with(&request.inputs, request.policy);
    debug!(
        age = request.inputs.age,
        life_expectancy = request.inputs.life_expectancy,
        policy = ?request.policy,
        points = result.trajectory.len(),
        daily_budget = result.daily_budget,
        "projection evaluated"
    );
    let response = build_project_response(request.inputs, request.policy, result);
    json_response(StatusCode::OK, response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, ApiError> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| ApiError::InvalidJson(e.to_string()))?;
    Ok(api_request_from_payload(payload))
}

fn api_request_from_payload(payload: ProjectPayload) -> ApiRequest {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.age {
        cli.age = v.coerce();
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v.coerce();
    }
    if let Some(v) = payload.assets {
        cli.assets = v.coerce();
    }
    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v.coerce();
    }
    if let Some(v) = payload.monthly_expenses {
        cli.monthly_expenses = v.coerce();
    }
    if let Some(v) = payload.annual_rate {
        cli.annual_rate = v.coerce();
    }
    if let Some(v) = payload.depletion_policy {
        cli.depletion_policy = v.into();
    }

    ApiRequest {
        inputs: build_inputs(&cli),
        policy: cli.depletion_policy.into(),
    }
}

fn default_cli_for_api() -> Cli {
    let defaults = InputState::default();
    Cli {
        age: defaults.age,
        life_expectancy: defaults.life_expectancy,
        assets: defaults.assets,
        monthly_income: defaults.monthly_income,
        monthly_expenses: defaults.monthly_expenses,
        annual_rate: defaults.annual_rate_percent,
        depletion_policy: CliDepletionPolicy::CarryDeficit,
        json: true,
    }
}

fn build_project_response(
    inputs: InputState,
    policy: DepletionPolicy,
    result: ProjectionResult,
) -> ProjectResponse {
    ProjectResponse {
        inputs,
        depletion_policy: policy,
        remaining_years: result.remaining_years,
        remaining_days: result.remaining_days,
        final_assets: result.final_assets,
        daily_budget: result.daily_budget,
        display: DisplayResponse {
            countdown: format_countdown(result.remaining_days),
            daily_budget: format_daily_budget(result.daily_budget),
        },
        trajectory: result.trajectory,
        truncated: result.truncated,
    }
}
