use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use syrus_core::types::ChatSource;

use crate::app::GatewayState;

/// GET /health — liveness probe plus a cheap store reachability check.
/// The in-process queue stand-in has no real reachability to probe (it's
/// never out of process), so it's reported reachable unconditionally.
pub async fn health_handler(State(state): State<Arc<GatewayState>>) -> Json<Value> {
    let store_reachable = state.hosts.lookup("__health_check__", ChatSource::Discord).is_ok();

    Json(json!({
        "status": "ok",
        "stage": state.config.stage,
        "store_reachable": store_reachable,
        "queue_reachable": true,
    }))
}
