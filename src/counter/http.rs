//! Counter HTTP endpoint: `GET /api/counter`

use crate::counter::{format_count, VisitCounter, PLACEHOLDER};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// Shared state of the counter routes
#[derive(Clone)]
pub struct CounterState {
    counter: Option<Arc<VisitCounter>>,
    client_header: HeaderName,
}

impl CounterState {
    /// `counter` is None when no store could be opened; the endpoint then
    /// serves the placeholder.
    pub fn new(counter: Option<Arc<VisitCounter>>, client_header: HeaderName) -> Self {
        Self {
            counter,
            client_header,
        }
    }
}

/// Routes mounted under `/api`.
pub fn router(state: CounterState) -> Router {
    Router::new()
        .route("/counter", get(counter_handler).fallback(api_not_found))
        .fallback(api_not_found)
        .with_state(state)
}

async fn counter_handler(State(state): State<CounterState>, headers: HeaderMap) -> String {
    let Some(counter) = &state.counter else {
        return PLACEHOLDER.to_string();
    };

    let origin = headers
        .get(&state.client_header)
        .and_then(|value| value.to_str().ok());

    match counter.hit(origin, Utc::now()).await {
        Ok(count) => format_count(count),
        Err(e) => {
            warn!("Counter unavailable: {}", e);
            PLACEHOLDER.to_string()
        }
    }
}

async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
