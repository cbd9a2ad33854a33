//! The entry point that assembles the application: config, database,
//! services, router.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use configs::AppConfig;
use domains::WhisperStore;
use services::{CatalogService, IdentityHasher, ModerationService, VoteService, WhisperService};
use storage_adapters::{connect, ensure_schema, SqliteWhisperStore};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let pool = connect(&config.database_url)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    ensure_schema(&pool).await.context("creating schema")?;

    let store: Arc<dyn WhisperStore> = Arc::new(SqliteWhisperStore::new(pool));
    let hasher = Arc::new(IdentityHasher::new(config.identity_salt()));

    let catalog = CatalogService::new(store.clone());
    catalog.seed_default_tags().await?;

    let state = AppState {
        whispers: WhisperService::new(store.clone(), hasher.clone()),
        votes: VoteService::new(store.clone(), hasher.clone()),
        moderation: ModerationService::new(store, hasher),
        catalog,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "whisperwall listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
