use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::cors::apply_cors_headers;
use crate::state::AppState;

/// Liveness check. Names the upstream origin so a misrouted deployment is
/// visible without sending a proxied request.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut response = Json(json!({
        "status": "ok",
        "service": "admin-proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.config.backend_url,
    }))
    .into_response();
    apply_cors_headers(response.headers_mut());
    response
}
