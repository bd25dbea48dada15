//! HTTP API gateway for Aula.
//!
//! Exposes the chat endpoint plus health, statistics, feedback, and
//! cache-refresh routes. The gateway is the orchestrator's caller: it owns
//! input validation, the user-facing failure message, and the rule that
//! failed AI turns are never written to the consultation log.
//!
//! Built on Axum.

pub mod knowledge;
pub mod logbook;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use aula_agent::{ResponseOrchestrator, classify};
use aula_config::AppConfig;
use aula_core::logbook::{ConsultationLog, Feedback, LogStatistics, NewConsultation};
use aula_core::knowledge::ContextSource;
use aula_core::{Topic, Turn};

pub use knowledge::{DirectorySource, StaticSource};
pub use logbook::InMemoryLog;

/// Shown to the user when both provider chains come up empty.
const FAILURE_MESSAGE: &str = "Lo siento, estoy teniendo dificultades técnicas para procesar \
     tu consulta en este momento. Por favor, intenta nuevamente en unos segundos.";

/// Shared application state for the gateway.
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: ResponseOrchestrator,
    pub documents: Arc<dyn ContextSource>,
    pub website: Arc<dyn ContextSource>,
    pub log: Arc<dyn ConsultationLog>,
}

type SharedState = Arc<AppState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origins);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/statistics", get(statistics_handler))
        .route("/api/feedback", post(feedback_handler))
        .route("/api/refresh-cache", post(refresh_cache_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured frontend origins, GET/POST only.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = ResponseOrchestrator::build_from_config(&config);

    let refresh = Duration::from_secs(config.knowledge.refresh_secs);
    let documents = Arc::new(DirectorySource::new(
        "documents",
        &config.knowledge.documents_dir,
        refresh,
    ));
    let website = Arc::new(DirectorySource::new(
        "website",
        &config.knowledge.website_dir,
        refresh,
    ));

    // Warm the caches so the first consultation doesn't pay for the load
    if let Err(e) = documents.snapshot().await {
        warn!(error = %e, "Could not preload document context");
    }
    if let Err(e) = website.snapshot().await {
        warn!(error = %e, "Could not preload website context");
    }

    let state = Arc::new(AppState {
        config,
        orchestrator,
        documents,
        website,
        log: Arc::new(InMemoryLog::new()),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Strip control characters (keeping newlines and tabs) and trim.
pub fn sanitize_message(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

// --- Error envelope ---

/// A JSON error response in the envelope the frontend expects.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "success": false, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,

    /// Prior turns, oldest first
    #[serde(default)]
    history: Vec<Turn>,

    /// When re-asking, the row to update instead of appending
    #[serde(default)]
    row_number: u64,
}

#[derive(Serialize)]
struct ChatResponse {
    success: bool,
    response: String,
    query_type: Topic,
    row_number: u64,
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = sanitize_message(&payload.message);

    if message.is_empty() {
        return Err(ApiError::bad_request("El mensaje está vacío"));
    }

    let max_chars = state.config.gateway.max_message_chars;
    if message.chars().count() > max_chars {
        return Err(ApiError::bad_request(format!(
            "El mensaje excede el límite de {max_chars} caracteres"
        )));
    }

    let topic = classify(&message);
    info!(%topic, message_chars = message.chars().count(), "Chat message received");

    let documents = context_or_empty(state.documents.as_ref()).await;
    if documents.is_empty() {
        warn!("No document context available for this consultation");
    }
    let website = context_or_empty(state.website.as_ref()).await;

    let response = state
        .orchestrator
        .generate_response(&message, &documents, &website, &payload.history)
        .await;

    match response {
        Some(text) => {
            let consultation = NewConsultation {
                query: message,
                response: text.clone(),
                topic,
                status: "completado".into(),
                answered_at: Utc::now(),
            };

            let row_number = if payload.row_number > 0 {
                match state.log.update(payload.row_number, consultation).await {
                    Ok(()) => payload.row_number,
                    Err(e) => {
                        warn!(row = payload.row_number, error = %e, "Could not update consultation row");
                        0
                    }
                }
            } else {
                match state.log.record(consultation).await {
                    Ok(row) => row,
                    Err(e) => {
                        warn!(error = %e, "Could not record consultation");
                        0
                    }
                }
            };

            Ok(Json(ChatResponse {
                success: true,
                response: text,
                query_type: topic,
                row_number,
            }))
        }
        None => {
            // Failed AI turns are never written to the log
            warn!("All providers exhausted, consultation not recorded");
            Ok(Json(ChatResponse {
                success: true,
                response: FAILURE_MESSAGE.into(),
                query_type: topic,
                row_number: payload.row_number,
            }))
        }
    }
}

async fn context_or_empty(source: &dyn ContextSource) -> String {
    match source.snapshot().await {
        Ok(text) => text,
        Err(e) => {
            warn!(source = source.name(), error = %e, "Context source failed, proceeding without it");
            String::new()
        }
    }
}

#[derive(Serialize)]
struct StatisticsResponse {
    success: bool,
    statistics: LogStatistics,
}

async fn statistics_handler(
    State(state): State<SharedState>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let statistics = state
        .log
        .statistics()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(StatisticsResponse {
        success: true,
        statistics,
    }))
}

#[derive(Deserialize)]
struct FeedbackRequest {
    row_number: u64,

    /// "like", "dislike", or "none" to clear
    feedback_type: String,

    #[serde(default)]
    comment: Option<String>,
}

#[derive(Serialize)]
struct AckResponse {
    success: bool,
    message: &'static str,
}

async fn feedback_handler(
    State(state): State<SharedState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let feedback = match payload.feedback_type.as_str() {
        "like" => Some(Feedback::Like),
        "dislike" => Some(Feedback::Dislike),
        "none" => None,
        other => {
            return Err(ApiError::bad_request(format!(
                "Tipo de feedback inválido: {other}"
            )));
        }
    };

    info!(row = payload.row_number, feedback_type = %payload.feedback_type, "Feedback received");

    state
        .log
        .set_feedback(payload.row_number, feedback, payload.comment)
        .await
        .map_err(|e| ApiError::not_found(e.to_string()))?;

    Ok(Json(AckResponse {
        success: true,
        message: "Feedback registrado correctamente",
    }))
}

async fn refresh_cache_handler(
    State(state): State<SharedState>,
) -> Result<Json<AckResponse>, ApiError> {
    state
        .documents
        .refresh()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    state
        .website
        .refresh()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!("Knowledge caches refreshed");
    Ok(Json(AckResponse {
        success: true,
        message: "Cache actualizado correctamente",
    }))
}
