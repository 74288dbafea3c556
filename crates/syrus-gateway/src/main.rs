use std::net::SocketAddr;
use std::sync::Arc;

use rusqlite::Connection;
use tracing::info;

use syrus_core::config::SyrusConfig;
use syrus_gateway::app::{build_router, GatewayState};
use syrus_queue::InProcessQueue;
use syrus_store::{db::init_db, EnvSecretStore, SqliteHostStore};
use syrus_workers::messages::{ConfiguringMessage, PlayMessage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syrus_gateway=info,tower_http=debug".into()),
        )
        .init();

    let config_path = std::env::var("SYRUS_CONFIG").ok();
    let config = SyrusConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("config load failed ({}), using defaults", e);
        SyrusConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let conn = Connection::open(&config.store.db_path)?;
    init_db(&conn)?;
    let hosts = Arc::new(SqliteHostStore::new(conn)?);

    let secrets = Arc::new(EnvSecretStore);

    // `InProcessQueue` is an in-memory stand-in for the out-of-scope durable
    // queue substrate (spec §5); a real deployment hands the gateway a
    // durable queue client built from `config.queues` instead, shared with
    // the stage workers across process boundaries.
    let configuring_queue: Arc<dyn syrus_queue::Queue<ConfiguringMessage>> = Arc::new(InProcessQueue::new());
    let play_queue: Arc<dyn syrus_queue::Queue<PlayMessage>> = Arc::new(InProcessQueue::new());

    let state = Arc::new(GatewayState {
        config,
        hosts,
        secrets,
        configuring_queue,
        play_queue,
    });
    let router = build_router(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("Syrus gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
