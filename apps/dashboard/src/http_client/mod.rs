//! HTTP client wrapper: the single pipeline every backend call goes through.
//!
//! Attaches the bearer token read from the session at call time, unwraps
//! response bodies, turns failure statuses into notifications, and tears the
//! session down after a 401.

pub mod messages;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::errors::ApiError;
use crate::notify::{Navigator, Notifier, Route};
use crate::session::Session;

use messages::{
    extract_message, BAD_REQUEST_FALLBACK, FORBIDDEN_FALLBACK, GENERIC_FALLBACK, NETWORK_FALLBACK,
    UNAUTHORIZED_FALLBACK,
};

/// Query parameters as sent on the wire.
pub type QueryParams = [(String, String)];

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    logout_delay: Duration,
}

impl ApiClient {
    pub fn new(
        config: &DashboardConfig,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            notifier,
            navigator,
            logout_delay: config.logout_delay,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request and returns the response body on 2xx.
    /// Empty bodies become `Value::Null`; non-JSON bodies become a string.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let token = self.session.token();
        self.send_as(method, path, query, body, token.as_deref()).await
    }

    /// GET with an explicit bearer token instead of the session's.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        let body = self.send_as(Method::GET, path, &[], None, Some(token)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn send_as(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!("{} {} query={:?}", method, url, query);

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return Err(self.network_failure(e)),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return Err(self.network_failure(e)),
        };
        let payload = parse_body(&text);

        if status.is_success() {
            return Ok(payload.unwrap_or(Value::Null));
        }

        Err(self.classify(status.as_u16(), payload))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &QueryParams) -> Result<T, ApiError> {
        let body = self.send(Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(Method::DELETE, path, &[], None).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(method, path, &[], Some(&body)).await?;
        Ok(serde_json::from_value(response)?)
    }

    fn classify(&self, status: u16, payload: Option<Value>) -> ApiError {
        let server_message = payload.as_ref().and_then(extract_message);
        let message_or = |fallback: &str| server_message.clone().unwrap_or_else(|| fallback.to_string());

        match status {
            401 => {
                let message = message_or(UNAUTHORIZED_FALLBACK);
                // Shown first; the logout waits so the message can be read.
                self.notifier.error(&message);
                self.schedule_forced_logout();
                ApiError::Unauthorized { message, payload }
            }
            403 => {
                let message = message_or(FORBIDDEN_FALLBACK);
                self.notifier.error(&message);
                ApiError::Forbidden { message, payload }
            }
            400 => {
                let message = message_or(BAD_REQUEST_FALLBACK);
                self.notifier.error(&message);
                ApiError::BadRequest { message, payload }
            }
            _ => {
                let message = message_or(GENERIC_FALLBACK);
                warn!("Backend returned {status}: {message}");
                ApiError::Status {
                    status,
                    message,
                    payload,
                }
            }
        }
    }

    fn network_failure(&self, error: reqwest::Error) -> ApiError {
        warn!("No response from backend: {error}");
        self.notifier.error(NETWORK_FALLBACK);
        ApiError::Network(error.to_string())
    }

    fn schedule_forced_logout(&self) {
        let Some(generation) = self.session.claim_logout() else {
            return;
        };

        let session = Arc::clone(&self.session);
        let navigator = Arc::clone(&self.navigator);
        let delay = self.logout_delay;
        info!("Session rejected, logging out in {}ms", delay.as_millis());

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if session.logout_if_current(generation) {
                navigator.navigate(Route::Login);
            }
        });
    }
}

fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

/// Unwraps `{ data, message, status|success }` envelopes; bare bodies pass through.
pub fn unwrap_data<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or_default(),
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}
