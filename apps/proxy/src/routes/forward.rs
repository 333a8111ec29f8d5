//! Catch-all request forwarding to the fixed backend origin.
//!
//! `/api/<segments>` is forwarded to `<BACKEND_URL>/api/<segments>` and
//! `/api/v1/<segments>` to `<BACKEND_URL>/api/v1/<segments>`. The query string
//! is preserved. Only the v1 proxy answers CORS preflight itself.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::cors::apply_cors_headers;
use crate::errors::{ProxyError, ProxyFailure};
use crate::state::AppState;

const API_PREFIX: &str = "/api/";

/// Which of the two proxy functions a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyRoute {
    /// `/api/*` forwarded as-is.
    Api,
    /// `/api/v1/*`, which also handles OPTIONS preflight locally.
    V1,
}

impl ProxyRoute {
    /// Splits the path after `/api/` into the route kind and its segments.
    pub fn split(rest: &str) -> (Self, Vec<&str>) {
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        match segments.split_first() {
            Some((&"v1", tail)) => (ProxyRoute::V1, tail.to_vec()),
            _ => (ProxyRoute::Api, segments),
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            ProxyRoute::Api => "/api",
            ProxyRoute::V1 => "/api/v1",
        }
    }
}

/// Builds the upstream URL by concatenating the backend origin, the route
/// prefix, the inbound segments, and the raw query string.
pub fn upstream_url(backend: &str, route: ProxyRoute, segments: &[&str], query: Option<&str>) -> String {
    let mut url = format!(
        "{}{}/{}",
        backend.trim_end_matches('/'),
        route.prefix(),
        segments.join("/")
    );
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(q);
    }
    url
}

/// ANY /api/*path
pub async fn handle_forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let rest = uri.path().strip_prefix(API_PREFIX).unwrap_or_default();
    let (route, segments) = ProxyRoute::split(rest);

    if route == ProxyRoute::V1 && method == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let url = upstream_url(&state.config.backend_url, route, &segments, uri.query());
    info!("Forwarding {} {} -> {}", method, uri.path(), url);

    match forward(&state, &method, &headers, body, &url).await {
        Ok(response) => response,
        Err(error) => ProxyFailure::new(uri.path(), error).into_response(),
    }
}

async fn forward(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: Bytes,
    url: &str,
) -> Result<Response, ProxyError> {
    let outbound_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ProxyError::Method(e.to_string()))?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");

    let mut request = state
        .http
        .request(outbound_method, url)
        .header(reqwest::header::CONTENT_TYPE, content_type);

    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        request = request.header(reqwest::header::AUTHORIZATION, auth);
    }

    if carries_body(method) && !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request.send().await?;
    let status = StatusCode::from_u16(upstream.status().as_u16())?;
    let declared = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    debug!("Upstream answered {} ({:?})", status, declared);

    let (content_type, payload) = match declared.as_deref() {
        Some(ct) if ct.contains("application/json") => {
            let bytes = upstream.bytes().await?;
            let value: serde_json::Value = if bytes.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_slice(&bytes)?
            };
            ("application/json".to_string(), serde_json::to_vec(&value)?)
        }
        other => {
            let text = upstream.text().await?;
            (
                other.unwrap_or("text/plain; charset=utf-8").to_string(),
                text.into_bytes(),
            )
        }
    };

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, HeaderValue::from_str(&content_type)?)
        .body(Body::from(payload))?;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;
    use axum::{body::to_bytes, http::Request, Json, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state_for(backend_url: &str) -> AppState {
        AppState {
            http: reqwest::Client::new(),
            config: Config {
                backend_url: backend_url.to_string(),
                port: 0,
                rust_log: "debug".to_string(),
            },
        }
    }

    /// Upstream stand-in that echoes what it received.
    async fn spawn_echo_backend() -> String {
        async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
            if uri.path() == "/api/plain" {
                return (
                    [(header::CONTENT_TYPE, "text/plain")],
                    "plain upstream text",
                )
                    .into_response();
            }
            let status = if uri.path().ends_with("/missing") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            let auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            (
                status,
                Json(json!({
                    "method": method.as_str(),
                    "path": uri.path(),
                    "query": uri.query(),
                    "authorization": auth,
                    "contentType": content_type,
                    "body": String::from_utf8_lossy(&body),
                })),
            )
                .into_response()
        }

        let app = Router::new().fallback(echo);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_upstream_url_generic_route() {
        let url = upstream_url("https://backend.test", ProxyRoute::Api, &["users", "5"], None);
        assert_eq!(url, "https://backend.test/api/users/5");
    }

    #[test]
    fn test_upstream_url_v1_route_preserves_query() {
        let url = upstream_url(
            "https://backend.test/",
            ProxyRoute::V1,
            &["users", "5"],
            Some("page=2&limit=10"),
        );
        assert_eq!(url, "https://backend.test/api/v1/users/5?page=2&limit=10");
    }

    #[test]
    fn test_upstream_url_ignores_empty_query() {
        let url = upstream_url("https://backend.test", ProxyRoute::Api, &["skills"], Some(""));
        assert_eq!(url, "https://backend.test/api/skills");
    }

    #[test]
    fn test_split_detects_v1_prefix() {
        let (route, segments) = ProxyRoute::split("v1/users/5");
        assert_eq!(route, ProxyRoute::V1);
        assert_eq!(segments, vec!["users", "5"]);

        let (route, segments) = ProxyRoute::split("users/5/");
        assert_eq!(route, ProxyRoute::Api);
        assert_eq!(segments, vec!["users", "5"]);
    }

    #[test]
    fn test_get_and_head_carry_no_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::DELETE));
    }

    #[tokio::test]
    async fn test_forwards_get_with_query_and_auth() {
        let backend = spawn_echo_backend().await;
        let app = build_router(state_for(&backend));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/users/5?include=roles")
                    .header(header::AUTHORIZATION, "Bearer abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = json_body(response).await;
        assert_eq!(body["method"], "GET");
        assert_eq!(body["path"], "/api/users/5");
        assert_eq!(body["query"], "include=roles");
        assert_eq!(body["authorization"], "Bearer abc");
        assert_eq!(body["contentType"], "application/json");
        assert_eq!(body["body"], "");
    }

    #[tokio::test]
    async fn test_forwards_v1_post_body() {
        let backend = spawn_echo_backend().await;
        let app = build_router(state_for(&backend));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/skills")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Rust"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["method"], "POST");
        assert_eq!(body["path"], "/api/v1/skills");
        assert_eq!(body["body"], r#"{"name":"Rust"}"#);
        assert!(body["authorization"].is_null());
    }

    #[tokio::test]
    async fn test_relays_upstream_status() {
        let backend = spawn_echo_backend().await;
        let app = build_router(state_for(&backend));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/companies/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["path"], "/api/companies/missing");
    }

    #[tokio::test]
    async fn test_relays_text_body() {
        let backend = spawn_echo_backend().await;
        let app = build_router(state_for(&backend));

        let response = app
            .oneshot(Request::builder().uri("/api/plain").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"plain upstream text");
    }

    #[tokio::test]
    async fn test_v1_options_preflight_short_circuits() {
        // Unroutable backend: a forwarded request would fail with 500.
        let app = build_router(state_for("http://127.0.0.1:1"));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_fixed_500() {
        let app = build_router(state_for("http://127.0.0.1:1"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users/5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = json_body(response).await;
        assert_eq!(body["error"], "Proxy error");
        assert_eq!(body["path"], "/api/users/5");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}
