use std::{net::SocketAddr, time::Duration};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {e}", cfg.host, cfg.port)))
}

/// Assemble the application around an already connected database.
pub fn app(db: DatabaseConnection, cfg: &ServerConfig) -> Router {
    let state = ServerState::new(db);
    routes::build_router(state, build_cors(), Duration::from_secs(cfg.request_timeout_secs))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutting down");
}

/// Public entry: load config, prepare the database and serve until a
/// shutdown signal arrives. In-flight requests are drained before the pool
/// is closed.
pub async fn run() -> Result<(), StartupError> {
    let cfg = AppConfig::load_or_env()?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Runtime(format!("database connect: {e}")))?;
    models::db::init_schema(&db)
        .await
        .map_err(|e| StartupError::Runtime(format!("schema init: {e}")))?;

    let app = app(db.clone(), &cfg.server);

    let addr = bind_addr(&cfg.server)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Runtime(format!("bind {addr}: {e}")))?;
    info!(%addr, "starting catalog server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Runtime(format!("serve: {e}")))?;

    if let Err(e) = db.close().await {
        warn!(error = %e, "closing database pool failed");
    }
    info!("server stopped");
    Ok(())
}
