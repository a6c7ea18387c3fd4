use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::chat::{ChatError, ChatService, Reply};
use crate::constants::ALIVE_TEXT;
use crate::prediction::PredictionError;

// Shared application state
#[derive(Clone)]
struct AppState {
    chat: Arc<ChatService>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChatError::BadRequest => StatusCode::BAD_REQUEST,
            ChatError::Prediction(PredictionError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Prediction(PredictionError::Remote { .. }) => StatusCode::BAD_GATEWAY,
            ChatError::Prediction(PredictionError::Failed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Prediction(PredictionError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        };
        if status.is_server_error() {
            error!(kind = self.kind(), "Chat request failed: {}", self);
        }

        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let ChatError::Prediction(e) = &self {
            if let Some(detail) = e.detail() {
                body["detail"] = detail;
            }
        }
        (status, Json(body)).into_response()
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Reply>, ChatError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected chat body: {}", rejection.body_text());
            return Err(ChatError::BadRequest);
        }
    };

    let reply = state.chat.answer(request.message.as_deref()).await?;
    Ok(Json(reply))
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Only POST requests allowed" })),
    )
}

async fn alive_handler() -> &'static str {
    ALIVE_TEXT
}

/// Build the application router around a chat service.
pub fn router(chat: Arc<ChatService>) -> Router {
    let state = AppState { chat };

    Router::new()
        .route("/", get(alive_handler))
        .route("/api/chat", post(chat_handler).fallback(method_not_allowed))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(addr: &str, chat: Arc<ChatService>) -> Result<()> {
    let app = router(chat);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;
    info!("Web server listening on http://{}", listener.local_addr()?);

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
