pub mod forward;
pub mod health;

use axum::{
    routing::{any, get},
    Router,
};

use crate::state::AppState;

/// Both catch-all proxies share one route: `/api/v1/...` is split off inside
/// the handler so the two prefixes never compete in the router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/*path", any(forward::handle_forward))
        .with_state(state)
}
