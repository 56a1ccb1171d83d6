//! Live query surface.
//!
//! Serves `GET /api/articles?page&perPage&q` from the content index file and
//! the generated static tree at `/`. The index is re-read on every request,
//! so a concurrent ingestion run becomes visible without a restart.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use gazette_shared::{GazetteError, Result};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

mod handlers;

/// Page number used when the request omits or mangles `page`.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the request omits or mangles `perPage`.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Where the server reads from and listens on.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub listen_addr: String,
    pub index_path: PathBuf,
    pub build_dir: PathBuf,
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub index_path: Arc<PathBuf>,
}

/// Build the router: the articles API plus static files as the fallback.
pub fn create_router(index_path: PathBuf, build_dir: PathBuf) -> Router {
    let state = AppState {
        index_path: Arc::new(index_path),
    };

    Router::new()
        .route("/api/articles", get(handlers::articles))
        .fallback_service(ServeDir::new(build_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `config.listen_addr` and serve until Ctrl-C.
pub async fn serve(config: &ServeConfig) -> Result<()> {
    let addr: SocketAddr = config.listen_addr.parse().map_err(|e| {
        GazetteError::config(format!("invalid listen address '{}': {e}", config.listen_addr))
    })?;

    let app = create_router(config.index_path.clone(), config.build_dir.clone());

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| GazetteError::Server {
            addr: addr.to_string(),
            source,
        })?;

    info!(%addr, build_dir = %config.build_dir.display(), "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("server shutting down");
        })
        .await
        .map_err(|source| GazetteError::Server {
            addr: addr.to_string(),
            source,
        })?;

    Ok(())
}
