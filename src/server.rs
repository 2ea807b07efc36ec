use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::constants::{AGENT_NAME, ALLOWED_ORIGINS, DEFAULT_SESSION_ID, GEMINI_MODEL};
use crate::gateway::{GatewayError, ModelGateway};
use crate::prompt;
use crate::session::{Exchange, SessionStore};

// Shared application state, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ModelGateway>,
    pub sessions: SessionStore,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub product_name: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
    pub agent_name: String,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(default = "default_session_id")]
    session_id: String,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    product_name: String,
}

/// Error payload in the FastAPI shape the front end already expects:
/// `{"detail": "..."}` with a 503 or 500 status.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn from_gateway(err: GatewayError, context: &str) -> Self {
        match err {
            GatewayError::Unavailable => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: err.to_string(),
            },
            GatewayError::Generation(message) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: format!("{context}: {message}"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed ({}): {}", self.status, self.detail);
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "BrandPulse Chat API",
        "status": "running"
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "agent": "BrandPulse_Assistant",
        "model": GEMINI_MODEL.as_str(),
        "agent_available": state.gateway.is_available(),
        "auth_method": state.gateway.auth_method(),
    }))
}

// Diagnostic endpoint for frontend troubleshooting.
async fn debug_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "server_time": Utc::now().to_rfc3339(),
        "cors_enabled": true,
        "allowed_origins": ALLOWED_ORIGINS,
        "agent_status": if state.gateway.is_available() { "available" } else { "unavailable" },
        "endpoints": {
            "health": "/health",
            "chat": "/api/chat",
            "product_analysis": "/api/analyze/product",
            "chat_history": "/api/chat/history"
        },
        "message": "Backend is running and ready for frontend connections!"
    }))
}

/// Chat with the agent. On success the exchange is recorded in the default
/// session; a failed model call leaves the session untouched.
async fn chat(
    State(state): State<AppState>,
    Json(message): Json<ChatMessage>,
) -> Result<Json<ChatResponse>, ApiError> {
    let prompt = prompt::chat_prompt(
        &message.text,
        message.product_name.as_deref(),
        message.context.as_deref(),
    );

    let response = state
        .gateway
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::from_gateway(e, "Error processing message"))?;

    state
        .sessions
        .append(
            DEFAULT_SESSION_ID,
            Exchange {
                user_message: message.text,
                agent_response: response.clone(),
                timestamp: Utc::now().to_rfc3339(),
                product_name: message.product_name,
            },
        )
        .await;

    Ok(Json(ChatResponse {
        response,
        timestamp: Utc::now().to_rfc3339(),
        agent_name: AGENT_NAME.to_string(),
    }))
}

async fn chat_history(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<Value> {
    let messages = state.sessions.get(&query.session_id).await;
    Json(json!({ "messages": messages }))
}

async fn clear_chat_history(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<Value> {
    state.sessions.clear(&query.session_id).await;
    Json(json!({ "message": "Chat history cleared" }))
}

/// One-shot perception analysis. Not recorded in any session.
async fn analyze_product(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, ApiError> {
    let prompt = prompt::product_analysis_prompt(&query.product_name);

    let analysis = state
        .gateway
        .generate(&prompt)
        .await
        .map_err(|e| ApiError::from_gateway(e, "Error analyzing product"))?;

    Ok(Json(json!({
        "product_name": query.product_name,
        "analysis": analysis,
        "timestamp": Utc::now().to_rfc3339(),
        "analysis_type": "comprehensive_perception_analysis",
    })))
}

fn cors_layer() -> CorsLayer {
    let origins = ALLOWED_ORIGINS.map(HeaderValue::from_static);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

/// Builds the application router. Split from `start_server` so tests can
/// drive it in-process.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/debug", get(debug_info))
        .route("/api/chat", post(chat))
        .route(
            "/api/chat/history",
            get(chat_history).delete(clear_chat_history),
        )
        .route("/api/analyze/product", post(analyze_product))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = router(state);

    info!("BrandPulse API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
