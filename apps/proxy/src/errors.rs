use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cors::apply_cors_headers;

/// Anything that can go wrong while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream declared JSON but sent an invalid body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unsupported method: {0}")]
    Method(String),

    #[error("upstream returned an invalid status: {0}")]
    Status(#[from] axum::http::status::InvalidStatusCode),

    #[error("invalid upstream header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),

    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

/// A forwarding failure together with the upstream path that was attempted.
/// Always rendered as the fixed 500 body; there is no retry.
#[derive(Debug)]
pub struct ProxyFailure {
    pub path: String,
    pub error: ProxyError,
}

impl ProxyFailure {
    pub fn new(path: impl Into<String>, error: impl Into<ProxyError>) -> Self {
        Self {
            path: path.into(),
            error: error.into(),
        }
    }
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        tracing::error!("Proxy error on {}: {}", self.path, self.error);

        let body = Json(json!({
            "error": "Proxy error",
            "message": self.error.to_string(),
            "path": self.path,
        }));

        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        apply_cors_headers(response.headers_mut());
        response
    }
}
