use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use rag_chat::{ChatRequest, ChatResponse, ChatService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

pub fn build_router(chat_service: Arc<ChatService>, allowed_origin: &str) -> Result<Router> {
    Ok(Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/health", get(health))
        .layer(cors_layer(allowed_origin)?)
        .with_state(chat_service))
}

/// One allowed origin with credentials. Wildcards are not valid together
/// with credentials, so methods and headers are mirrored from the request.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("CORS_ALLOWED_ORIGIN is not a valid origin: {}", allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

async fn handle_chat(
    State(chat_service): State<Arc<ChatService>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    log::debug!("Prompt from frontend: {}", request.prompt);
    Json(chat_service.respond(&request.prompt).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "api" }))
}
