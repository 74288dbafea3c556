//! POST /webhooks/{dialect} — fans out to the dialect-specific handler.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::GatewayState;

pub async fn webhook_handler(
    State(state): State<Arc<GatewayState>>,
    Path(dialect): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match dialect.as_str() {
        "discord" => crate::discord::handle_interaction(&state, headers, body).await.into_response(),
        "whatsapp" => crate::whatsapp::handle_message(&state, body).await.into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "unknown dialect"}))).into_response(),
    }
}
