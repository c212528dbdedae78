use std::{future::Future, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{runtime, storage::JsonFileStorage};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

/// Prepare the store file and build the router over the flat-file backend.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db_path = PathBuf::from(&cfg.storage.path);
    runtime::ensure_store_file(&db_path, cfg.storage.create_if_missing)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let state = AppState::new(Arc::new(JsonFileStorage::new(&db_path)));
    info!(path = %db_path.display(), "book store ready");
    Ok(routes::build_router(state, build_cors()))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Public entry: build the app and run the HTTP server until `shutdown`.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    serve(listener, app, shutdown).await
}
