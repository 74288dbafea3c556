use std::sync::Arc;

use axum::{routing::get, Router};

use syrus_core::config::SyrusConfig;
use syrus_queue::Queue;
use syrus_store::{HostStore, SecretStore};
use syrus_workers::messages::{ConfiguringMessage, PlayMessage};

/// Shared collaborators for every gateway handler, mirroring the
/// `AppState` bundling pattern: one struct constructed at startup, handed
/// to Axum as `Arc<GatewayState>`.
pub struct GatewayState {
    pub config: SyrusConfig,
    pub hosts: Arc<dyn HostStore>,
    pub secrets: Arc<dyn SecretStore>,
    pub configuring_queue: Arc<dyn Queue<ConfiguringMessage>>,
    pub play_queue: Arc<dyn Queue<PlayMessage>>,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/webhooks/{dialect}",
            get(crate::whatsapp::verify_handler).post(crate::dispatch::webhook_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
