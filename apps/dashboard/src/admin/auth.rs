use serde::de::Error as _;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::{ApiError, FormError};
use crate::http_client::{unwrap_data, ApiClient};
use crate::models::AdminUser;

const LOGIN_PATH: &str = "/admin/auth/login";
const LOGOUT_PATH: &str = "/admin/auth/logout";
const PROFILE_PATH: &str = "/admin/auth/me";
const PASSWORD_PATH: &str = "/admin/auth/change-password";

const MIN_PASSWORD_LEN: usize = 8;

/// A password change that passed local checks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    current_password: String,
    new_password: String,
}

impl PasswordChange {
    pub fn new(current: &str, new: &str, confirm: &str) -> Result<Self, FormError> {
        let invalid = |field: &str, label: &str, message: &str| FormError {
            field: field.to_string(),
            label: label.to_string(),
            message: message.to_string(),
        };

        if current.is_empty() {
            return Err(invalid("currentPassword", "Current password", "is required"));
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(invalid(
                "newPassword",
                "New password",
                &format!("must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if new == current {
            return Err(invalid("newPassword", "New password", "must differ from the current password"));
        }
        if new != confirm {
            return Err(invalid("confirmPassword", "Confirm password", "does not match"));
        }

        Ok(Self {
            current_password: current.to_string(),
            new_password: new.to_string(),
        })
    }
}

/// Login, logout and the signed-in admin's profile.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a token and opens the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, ApiError> {
        let body: Value = self
            .client
            .post(LOGIN_PATH, &json!({"email": email.trim(), "password": password}))
            .await?;
        let (token, user) = read_login(body)?;

        // Some deployments only return the token. The session opens once the
        // profile is in hand, so a failed profile call leaves it closed.
        let user = match user {
            Some(user) => user,
            None => read_profile(self.client.get_as(PROFILE_PATH, &token).await?)?,
        };
        self.client.session().login(token, user.clone());
        Ok(user)
    }

    /// Tells the backend, then clears the session whatever it answered.
    pub async fn logout(&self) {
        if self.client.session().is_authenticated() {
            if let Err(e) = self.client.send(reqwest::Method::POST, LOGOUT_PATH, &[], None).await {
                warn!("Backend logout failed: {e}");
            }
        }
        self.client.session().logout();
    }

    /// Refreshes the signed-in admin from the backend.
    pub async fn profile(&self) -> Result<AdminUser, ApiError> {
        let user = read_profile(self.client.get(PROFILE_PATH, &[]).await?)?;
        self.client.session().set_user(user.clone());
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        let _: Value = self.client.put(PASSWORD_PATH, change).await?;
        info!("Password changed");
        self.client.notifier().success("Password changed successfully");
        Ok(())
    }
}

/// Pulls the token and, when present, the admin out of a login response.
fn read_login(body: Value) -> Result<(String, Option<AdminUser>), ApiError> {
    let mut data = match unwrap_data::<Value>(body)? {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    let token = ["token", "accessToken", "access_token"]
        .iter()
        .find_map(|k| match data.remove(*k) {
            Some(Value::String(t)) if !t.is_empty() => Some(t),
            _ => None,
        })
        .ok_or_else(|| ApiError::Decode(serde_json::Error::custom("login response carries no token")))?;

    let user = match data.remove("user").or_else(|| data.remove("admin")) {
        Some(value) if value.is_object() => Some(serde_json::from_value(value)?),
        _ => None,
    };
    Ok((token, user))
}

/// Accepts the admin bare or nested under `user` / `admin`.
fn read_profile(body: Value) -> Result<AdminUser, ApiError> {
    let user = match unwrap_data::<Value>(body)? {
        Value::Object(mut map) if map.contains_key("user") || map.contains_key("admin") => {
            let inner = map.remove("user").or_else(|| map.remove("admin")).unwrap_or_default();
            serde_json::from_value(inner)?
        }
        other => serde_json::from_value(other)?,
    };
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, Harness};
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post, put},
        Json, Router,
    };
    use std::time::Duration;

    async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        match (body["email"].as_str(), body["password"].as_str()) {
            (Some("ada@example.com"), Some("secret")) => (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {"token": "tok-ada", "admin": {"_id": "a1", "name": "Ada", "email": "ada@example.com"}}
                })),
            ),
            (Some("bare@example.com"), _) => (StatusCode::OK, Json(json!({"accessToken": "tok-bare"}))),
            (Some("broken@example.com"), _) => (StatusCode::OK, Json(json!({"accessToken": "tok-broken"}))),
            (Some("notoken@example.com"), _) => (
                StatusCode::OK,
                Json(json!({"data": {"user": {"_id": "n1", "name": "No Token", "email": "notoken@example.com"}}})),
            ),
            _ => (StatusCode::BAD_REQUEST, Json(json!({"message": "Invalid email or password"}))),
        }
    }

    async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default();
        match auth {
            "Bearer tok-broken" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "profile lookup failed"}))),
            "Bearer tok-ada" => (
                StatusCode::OK,
                Json(json!({"data": {"admin": {"_id": "a1", "name": "Ada Lovelace", "email": "ada@example.com"}}})),
            ),
            _ => (
                StatusCode::OK,
                Json(json!({"data": {"user": {"id": "b1", "name": auth, "email": "bare@example.com"}}})),
            ),
        }
    }

    async fn harness() -> Harness {
        let app = Router::new()
            .route(LOGIN_PATH, post(login))
            .route(LOGOUT_PATH, post(|| async { Json(json!({"success": true})) }))
            .route(PROFILE_PATH, get(me))
            .route(PASSWORD_PATH, put(|| async { Json(json!({"success": true})) }));
        Harness::new(&spawn_backend(app).await, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_login_opens_session() {
        let h = harness().await;
        let user = AuthApi::new(h.client.clone()).login(" ada@example.com ", "secret").await.unwrap();
        assert_eq!(user.id, "a1");
        assert_eq!(h.session.token().as_deref(), Some("tok-ada"));
        assert_eq!(h.persistence.get_raw("token").unwrap().as_deref(), Some("tok-ada"));
    }

    #[tokio::test]
    async fn test_token_only_login_fetches_profile() {
        let h = harness().await;
        let user = AuthApi::new(h.client.clone()).login("bare@example.com", "x").await.unwrap();
        assert_eq!(user.name, "Bearer tok-bare");
        assert_eq!(h.session.user().unwrap().id, "b1");
    }

    #[tokio::test]
    async fn test_failed_profile_after_token_only_login_keeps_session_closed() {
        let h = harness().await;
        let err = AuthApi::new(h.client.clone()).login("broken@example.com", "x").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!h.session.is_authenticated());
        assert!(h.session.user().is_none());
        assert!(h.session.token().is_none());
        assert!(h.persistence.get_raw("token").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let h = harness().await;
        let err = AuthApi::new(h.client.clone()).login("notoken@example.com", "x").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(!h.session.is_authenticated());
        assert!(h.persistence.get_raw("token").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_reads_admin_shape() {
        let h = harness().await;
        let auth = AuthApi::new(h.client.clone());
        auth.login("ada@example.com", "secret").await.unwrap();
        assert_eq!(h.session.user().unwrap().name, "Ada");

        let user = auth.profile().await.unwrap();
        assert_eq!(user.id, "a1");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(h.session.user().unwrap().name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_session_empty() {
        let h = harness().await;
        let err = AuthApi::new(h.client.clone()).login("ada@example.com", "wrong").await.unwrap_err();
        assert!(err.is_validation());
        assert!(!h.session.is_authenticated());
        assert_eq!(h.notifier.last().unwrap().message, "Invalid email or password");
    }

    #[tokio::test]
    async fn test_logout_clears_storage() {
        let h = harness().await;
        let auth = AuthApi::new(h.client.clone());
        auth.login("ada@example.com", "secret").await.unwrap();
        auth.logout().await;
        assert!(!h.session.is_authenticated());
        assert!(h.persistence.get_raw("token").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_change_password() {
        let h = harness().await;
        let change = PasswordChange::new("old-secret", "new-secret", "new-secret").unwrap();
        AuthApi::new(h.client.clone()).change_password(&change).await.unwrap();
        assert_eq!(h.notifier.last().unwrap().message, "Password changed successfully");
    }

    #[test]
    fn test_password_change_rules() {
        assert_eq!(PasswordChange::new("", "abcdefgh", "abcdefgh").unwrap_err().field, "currentPassword");
        assert_eq!(PasswordChange::new("old", "short", "short").unwrap_err().field, "newPassword");
        assert_eq!(PasswordChange::new("same-pass", "same-pass", "same-pass").unwrap_err().field, "newPassword");
        assert_eq!(PasswordChange::new("old", "abcdefgh", "abcdefgX").unwrap_err().field, "confirmPassword");
    }
}
