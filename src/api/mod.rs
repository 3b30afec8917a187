mod table;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{InputError, Inputs, ProjectionResult, project, validate_inputs};

pub use table::{AmountStyle, render_summary, render_table};

const DEFAULT_CURRENT_AGE: u32 = 34;
const DEFAULT_RETIREMENT_AGE: u32 = 40;
const DEFAULT_LIFE_EXPECTANCY_AGE: u32 = 85;
const DEFAULT_CURRENT_SAVINGS: f64 = 13_000_000.0;
const DEFAULT_MONTHLY_INVESTMENT: f64 = 180_000.0;
const DEFAULT_STEP_UP_RATE: f64 = 10.0;
const DEFAULT_MONTHLY_EXPENSE: f64 = 90_000.0;
const DEFAULT_INFLATION_RATE: f64 = 5.0;
const DEFAULT_PRE_RETIREMENT_RETURN: f64 = 9.5;
const DEFAULT_POST_RETIREMENT_RETURN: f64 = 8.5;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error("invalid inputs: {0}")]
    Input(#[from] InputError),
    #[error("failed to encode projection: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    #[serde(alias = "expensesUntilAge")]
    life_expectancy_age: Option<u32>,
    current_savings: Option<f64>,
    monthly_investment: Option<f64>,
    step_up_rate: Option<f64>,
    post_retirement_monthly_expense: Option<f64>,
    inflation_rate: Option<f64>,
    pre_retirement_return: Option<f64>,
    post_retirement_return: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "corpus",
    about = "Deterministic retirement corpus projection (accumulation + drawdown)"
)]
struct Cli {
    #[arg(long, default_value_t = DEFAULT_CURRENT_AGE)]
    current_age: u32,
    #[arg(long, default_value_t = DEFAULT_RETIREMENT_AGE)]
    retirement_age: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_LIFE_EXPECTANCY_AGE,
        help = "Age until which post-retirement expenses must be covered"
    )]
    life_expectancy_age: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_CURRENT_SAVINGS,
        help = "Current net worth invested at current age"
    )]
    current_savings: f64,
    #[arg(long, default_value_t = DEFAULT_MONTHLY_INVESTMENT)]
    monthly_investment: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_STEP_UP_RATE,
        help = "Yearly increase in monthly investment in percent"
    )]
    step_up_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_MONTHLY_EXPENSE,
        help = "Monthly expense after retirement in today's money"
    )]
    post_retirement_monthly_expense: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_INFLATION_RATE,
        help = "Annual inflation applied to retirement expenses in percent"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_PRE_RETIREMENT_RETURN,
        help = "Expected annual return before retirement in percent"
    )]
    pre_retirement_return: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_POST_RETIREMENT_RETURN,
        help = "Expected annual return after retirement in percent"
    )]
    post_retirement_return: f64,
    #[arg(long, help = "Print the projection as JSON instead of a table")]
    json: bool,
    #[arg(long, help = "Only print the summary line")]
    no_table: bool,
    #[arg(long, help = "Abbreviate summary amounts as K/M/B")]
    compact: bool,
}

/// Resolved inputs echoed back to clients, in the same keys and units
/// `ProjectPayload` accepts (rates in percent).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputsEcho {
    current_age: u32,
    retirement_age: u32,
    life_expectancy_age: u32,
    current_savings: f64,
    monthly_investment: f64,
    step_up_rate: f64,
    post_retirement_monthly_expense: f64,
    inflation_rate: f64,
    pre_retirement_return: f64,
    post_retirement_return: f64,
}

impl From<&Cli> for InputsEcho {
    fn from(cli: &Cli) -> Self {
        Self {
            current_age: cli.current_age,
            retirement_age: cli.retirement_age,
            life_expectancy_age: cli.life_expectancy_age,
            current_savings: cli.current_savings,
            monthly_investment: cli.monthly_investment,
            step_up_rate: cli.step_up_rate,
            post_retirement_monthly_expense: cli.post_retirement_monthly_expense,
            inflation_rate: cli.inflation_rate,
            pre_retirement_return: cli.pre_retirement_return,
            post_retirement_return: cli.post_retirement_return,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse<'a> {
    inputs: InputsEcho,
    #[serde(flatten)]
    result: &'a ProjectionResult,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_inputs(cli: &Cli) -> Result<Inputs, InputError> {
    let inputs = Inputs {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        life_expectancy_age: cli.life_expectancy_age,
        current_savings: cli.current_savings,
        monthly_investment: cli.monthly_investment,
        annual_step_up_rate: cli.step_up_rate / 100.0,
        post_retirement_monthly_expense: cli.post_retirement_monthly_expense,
        inflation_rate: cli.inflation_rate / 100.0,
        pre_retirement_return_rate: cli.pre_retirement_return / 100.0,
        post_retirement_return_rate: cli.post_retirement_return / 100.0,
    };
    validate_inputs(&inputs)?;
    Ok(inputs)
}

/// Parses command line arguments (program name first), runs one projection
/// and returns the text to print.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let inputs = build_inputs(&cli)?;
    debug!(
        current_age = inputs.current_age,
        retirement_age = inputs.retirement_age,
        life_expectancy_age = inputs.life_expectancy_age,
        "running projection"
    );
    let result = project(&inputs);
    log_outcome(&result);

    if cli.json {
        let response = ProjectResponse {
            inputs: InputsEcho::from(&cli),
            result: &result,
        };
        return Ok(serde_json::to_string_pretty(&response)?);
    }

    let style = if cli.compact {
        AmountStyle::Compact
    } else {
        AmountStyle::Indian
    };
    let summary = render_summary(&result, style);
    if cli.no_table {
        return Ok(summary);
    }
    Ok(format!(
        "{summary}\n\n{}",
        render_table(&result.yearly_schedule)
    ))
}

fn log_outcome(result: &ProjectionResult) {
    info!(
        solvent = result.solvent,
        depletion_age = ?result.depletion_age,
        terminal_balance = result.terminal_balance,
        years = result.yearly_schedule.len(),
        "projection complete"
    );
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "projection HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => rejected_payload(rejection.status(), &rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => rejected_payload(rejection.status(), &rejection.body_text()),
    }
}

fn rejected_payload(status: StatusCode, msg: &str) -> Response {
    warn!(%status, error = msg, "malformed projection payload");
    error_response(status, msg)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let cli = cli_from_payload(payload);
    let inputs = match build_inputs(&cli) {
        Ok(inputs) => inputs,
        Err(err) => {
            warn!(error = %err, "rejected projection inputs");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    debug!(
        current_age = inputs.current_age,
        retirement_age = inputs.retirement_age,
        life_expectancy_age = inputs.life_expectancy_age,
        "projection requested"
    );
    let result = project(&inputs);
    log_outcome(&result);

    json_response(
        StatusCode::OK,
        ProjectResponse {
            inputs: InputsEcho::from(&cli),
            result: &result,
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
    build_inputs(&cli_from_payload(payload)).map_err(|e| e.to_string())
}

fn cli_from_payload(payload: ProjectPayload) -> Cli {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy_age {
        cli.life_expectancy_age = v;
    }
    if let Some(v) = payload.current_savings {
        cli.current_savings = v;
    }
    if let Some(v) = payload.monthly_investment {
        cli.monthly_investment = v;
    }
    if let Some(v) = payload.step_up_rate {
        cli.step_up_rate = v;
    }
    if let Some(v) = payload.post_retirement_monthly_expense {
        cli.post_retirement_monthly_expense = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.pre_retirement_return {
        cli.pre_retirement_return = v;
    }
    if let Some(v) = payload.post_retirement_return {
        cli.post_retirement_return = v;
    }

    cli
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: DEFAULT_CURRENT_AGE,
        retirement_age: DEFAULT_RETIREMENT_AGE,
        life_expectancy_age: DEFAULT_LIFE_EXPECTANCY_AGE,
        current_savings: DEFAULT_CURRENT_SAVINGS,
        monthly_investment: DEFAULT_MONTHLY_INVESTMENT,
        step_up_rate: DEFAULT_STEP_UP_RATE,
        post_retirement_monthly_expense: DEFAULT_MONTHLY_EXPENSE,
        inflation_rate: DEFAULT_INFLATION_RATE,
        pre_retirement_return: DEFAULT_PRE_RETIREMENT_RETURN,
        post_retirement_return: DEFAULT_POST_RETIREMENT_RETURN,
        json: false,
        no_table: false,
        compact: false,
    }
}
