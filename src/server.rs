//! Preview server: the built site plus the `/api` routes.

use crate::config::CounterConfig;
use crate::counter::http::{self, CounterState};
use crate::counter::{SledCounterStore, VisitCounter};
use crate::error::ApiError;
use axum::http::HeaderName;
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const API_PREFIX: &str = "/api";

/// Build counter state from configuration. A store that fails to open
/// disables counting; the endpoint then serves the placeholder.
pub fn counter_state(config: &CounterConfig, site_root: &Path) -> Result<CounterState, ApiError> {
    let header = HeaderName::from_bytes(config.client_header.as_bytes()).map_err(|e| {
        ApiError::ConfigError(format!(
            "Invalid counter client header {:?}: {}",
            config.client_header, e
        ))
    })?;

    if !config.enabled {
        info!("Visit counter disabled");
        return Ok(CounterState::new(None, header));
    }

    let store_path = site_root.join(&config.store_path);
    let counter = match SledCounterStore::open(&store_path) {
        Ok(store) => Some(Arc::new(VisitCounter::new(
            Arc::new(store),
            Duration::from_secs(config.window_secs),
        ))),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };
    Ok(CounterState::new(counter, header))
}

/// Router serving `output_dir` with the API nested under `/api`.
pub fn app(output_dir: PathBuf, state: CounterState) -> Router {
    Router::new()
        .nest(API_PREFIX, http::router(state))
        .fallback_service(ServeDir::new(output_dir))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `addr` until ctrl-c.
pub async fn run(addr: &str, app: Router) -> Result<(), ApiError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ApiError::ConfigError(format!("Invalid listen address {:?}: {}", addr, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::Server(format!("Failed to bind {}: {}", addr, e)))?;
    info!(addr = %addr, "Preview server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .map_err(|e| ApiError::Server(e.to_string()))
}
