// Customer Churn Advisor - Web Server
// HTML form + JSON prediction API with Axum

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use churn_advisor::display::{GAUGE_MARKER, GAUGE_REFERENCE};
use churn_advisor::{
    config::AppConfig, logger, model, Assessment, ChurnError, FieldSpec, Predictor, ProfileInput,
    RiskLevel, FIELDS, VERSION,
};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Parser, Debug)]
#[command(name = "churn-server", version, about = "Serve the churn form and prediction API")]
struct ServerCli {
    /// TOML config file (defaults to ./churn-advisor.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model artifact path, overrides config and environment
    #[arg(long)]
    model: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(long)]
    bind: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

impl ServerCli {
    /// Defaults, then file, then environment, then these flags
    fn resolve_config(&self) -> Result<AppConfig> {
        Ok(AppConfig::load(self.config.as_deref())?
            .with_model_path(self.model.clone())
            .with_bind_addr(self.bind.clone()))
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    predictor: Predictor,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

#[derive(Serialize)]
struct FieldError {
    field: String,
    message: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fields: Vec::new(),
        }
    }

    fn err(error: &ChurnError) -> Self {
        let fields = match error {
            ChurnError::Validation(errors) => errors
                .errors()
                .iter()
                .map(|e| FieldError {
                    field: e.field.clone(),
                    message: e.message.clone(),
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            fields,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_kind: &'static str,
    model_fingerprint: String,
}

fn status_for(error: &ChurnError) -> StatusCode {
    match error {
        ChurnError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: VERSION,
        model_kind: state.predictor.model_kind(),
        model_fingerprint: state.predictor.fingerprint().to_string(),
    }))
}

/// GET /api/schema - Field domains and bounds
async fn get_schema() -> impl IntoResponse {
    Json(ApiResponse::ok(FIELDS))
}

/// POST /api/predict - Score one profile
async fn predict_json(State(state): State<AppState>, Json(input): Json<ProfileInput>) -> Response {
    match state.predictor.assess(&input) {
        Ok(assessment) => (StatusCode::OK, Json(ApiResponse::ok(assessment))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "prediction request failed");
            (status_for(&e), Json(ApiResponse::<Assessment>::err(&e))).into_response()
        }
    }
}

/// POST /predict - Form submission, answers with the page re-rendered
async fn predict_form(State(state): State<AppState>, Form(input): Form<ProfileInput>) -> Response {
    match state.predictor.assess(&input) {
        Ok(assessment) => Html(render_page(&input, Some(&assessment), None)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "form prediction failed");
            let page = render_page(&input, None, Some(&e.to_string()));
            (status_for(&e), Html(page)).into_response()
        }
    }
}

/// GET / - Empty form
async fn serve_index() -> impl IntoResponse {
    Html(render_page(&ProfileInput::default(), None, None))
}

// ============================================================================
// HTML
// ============================================================================

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Current form value for a field, as the widget shows it
fn input_value(input: &ProfileInput, name: &str) -> String {
    let json = serde_json::to_value(input).unwrap_or_default();
    match json.get(name) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn render_field(def: &FieldSpec, input: &ProfileInput) -> String {
    let current = input_value(input, def.name());
    let widget = match def {
        FieldSpec::Categorical { name, labels, .. } => {
            let options: String = labels
                .iter()
                .map(|label| {
                    let selected = if *label == current { " selected" } else { "" };
                    format!("<option value=\"{0}\"{1}>{0}</option>", escape_html(label), selected)
                })
                .collect();
            format!("<select name=\"{}\">{}</select>", name, options)
        }
        FieldSpec::Numeric { name, bounds, .. } => format!(
            "<input type=\"number\" name=\"{}\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{}\">",
            name,
            bounds.min,
            bounds.max,
            if bounds.integer { 1.0 } else { 0.01 },
            escape_html(&current)
        ),
    };
    format!(
        "<label title=\"{desc}\"><span>{name}<small class=\"hint\">{desc}</small></span>{widget}</label>\n",
        desc = escape_html(def.description()),
        name = def.name(),
        widget = widget
    )
}

fn band_css(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "lightgreen",
        RiskLevel::Medium => "lightyellow",
        RiskLevel::High => "lightcoral",
    }
}

fn render_result(assessment: &Assessment) -> String {
    let recommendations: String = assessment
        .recommendations
        .iter()
        .map(|r| format!("<li>{}</li>", escape_html(r)))
        .collect();

    format!(
        r#"<section class="result">
<div class="banner" style="background:{color}">{title}<br>{detail}</div>
<div class="gauge"><div class="fill" style="width:{width:.2}%;background:{band}"></div><div class="marker" style="left:{marker}%"></div></div>
<p class="probability">Churn probability: <strong>{probability}</strong> ({delta:+.2} vs {reference}, {risk} risk)</p>
<h3>Recommendations</h3>
<ul>{recommendations}</ul>
</section>"#,
        color = assessment.banner.color.css(),
        title = escape_html(&assessment.banner.title),
        detail = escape_html(&assessment.banner.detail),
        width = assessment.gauge_value,
        band = band_css(assessment.risk_level),
        marker = GAUGE_MARKER,
        delta = assessment.gauge_delta,
        reference = GAUGE_REFERENCE,
        probability = assessment.probability_display,
        risk = assessment.risk_level.name(),
        recommendations = recommendations,
    )
}

fn render_page(input: &ProfileInput, assessment: Option<&Assessment>, error: Option<&str>) -> String {
    let fields: String = FIELDS.iter().map(|def| render_field(def, input)).collect();
    let result = assessment.map(render_result).unwrap_or_default();
    let error = error
        .map(|e| format!("<div class=\"error\">{}</div>", escape_html(e)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Customer Churn Advisor</title>
<style>
body {{ font-family: sans-serif; max-width: 960px; margin: 2em auto; }}
form {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: .5em 2em; }}
label {{ display: flex; justify-content: space-between; }}
.banner {{ color: #fff; padding: .75em; font-weight: bold; margin-top: 1.5em; }}
.hint {{ display: block; color: #888; font-size: .8em; }}
.gauge {{ position: relative; background: #eee; height: 1.5em; margin: .75em 0; }}
.gauge .fill {{ height: 100%; }}
.gauge .marker {{ position: absolute; top: 0; height: 100%; border-left: 4px solid red; }}
.error {{ color: #c0392b; border: 1px solid #c0392b; padding: .75em; margin-top: 1.5em; }}
</style>
</head>
<body>
<h1>Customer Churn Advisor</h1>
<form method="post" action="/predict">
{fields}<button type="submit">Predict</button>
</form>
{error}{result}
</body>
</html>
"#,
        fields = fields,
        error = error,
        result = result,
    )
}

// ============================================================================
// Main Server
// ============================================================================

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/schema", get(get_schema))
        .route("/predict", post(predict_json))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_index))
        .route("/predict", post(predict_form))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();
    let config = cli.resolve_config()?;
    if let Err(e) = logger::init_logger(&config.logging.level, cli.verbose) {
        eprintln!("⚠️  Logging not initialized: {}", e);
    }

    let predictor = match model::load_model(&config.model_path).and_then(model::init_global) {
        Ok(model) => Predictor::from_loaded(model),
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let app = router(AppState { predictor });

    let addr = config.server.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(addr = %addr, "server listening");
    println!("\n🚀 Churn Advisor running on http://{}", addr);
    println!("   Form: http://{}/", addr);
    println!("   API:  POST http://{}/api/predict", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
