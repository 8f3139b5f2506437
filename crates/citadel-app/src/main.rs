use std::time::Duration;

use citadel_app::app::state::AppState;
use citadel_core::config::{ServerConfig, load_config};
use salvo::conn::TcpListener;
use salvo::cors::{Cors, CorsHandler};
use salvo::http::{Method, header};
use salvo::logging::Logger;
use salvo::{Listener, Server};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Citadel admin API");

    let config = load_config()?;

    tracing::info!(config = ?config.server, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let cors = cors_handler(&config.server);
    let bind_addr = config.server.bind_addr();
    let state = AppState::bootstrap(config).await?;

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.purge_expired().await;
        }
    });

    let service = state.service().hoop(cors).hoop(Logger::new());

    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;
    let server = Server::new(acceptor);
    let handle = server.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            handle.stop_graceful(None);
        }
    });

    tracing::info!("Server listening on {bind_addr}");

    server.serve(service).await;

    Ok(())
}

/// Allows only `server.cors_origin` when set, any origin otherwise.
fn cors_handler(server: &ServerConfig) -> CorsHandler {
    let Some(origin) = &server.cors_origin else {
        tracing::debug!("No CORS origin configured, allowing any origin");
        return Cors::permissive().into_handler();
    };

    Cors::new()
        .allow_origin(origin.as_str())
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .into_handler()
}
