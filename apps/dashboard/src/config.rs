use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Dashboard configuration, read once at startup from the environment.
/// There is no runtime reconfiguration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub app_name: String,
    /// Backend REST origin every `ApiClient` path is appended to.
    pub api_base_url: String,
    pub logo_path: String,
    /// Directory backing the file-based local storage.
    pub storage_dir: PathBuf,
    pub request_timeout: Duration,
    /// How long a 401 notification stays visible before the forced logout.
    pub logout_delay: Duration,
    pub search_debounce: Duration,
    pub submit_throttle: Duration,
    pub page_size: u32,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(DashboardConfig {
            app_name: env_or("ADMIN_APP_NAME", "Job Board Admin".to_string())?,
            api_base_url: require_env("ADMIN_API_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            logo_path: env_or("ADMIN_LOGO_PATH", "/logo.svg".to_string())?,
            storage_dir: env_or("ADMIN_STORAGE_DIR", PathBuf::from(".admin-storage"))?,
            request_timeout: Duration::from_secs(env_or("ADMIN_REQUEST_TIMEOUT_SECS", 30)?),
            logout_delay: Duration::from_millis(env_or("ADMIN_LOGOUT_DELAY_MS", 1500)?),
            search_debounce: Duration::from_millis(env_or("ADMIN_SEARCH_DEBOUNCE_MS", 500)?),
            submit_throttle: Duration::from_millis(env_or("ADMIN_SUBMIT_THROTTLE_MS", 2000)?),
            page_size: env_or("ADMIN_PAGE_SIZE", 10)?,
        })
    }

    /// Defaults for everything except the backend origin.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        DashboardConfig {
            app_name: "Job Board Admin".to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            logo_path: "/logo.svg".to_string(),
            storage_dir: PathBuf::from(".admin-storage"),
            request_timeout: Duration::from_secs(30),
            logout_delay: Duration::from_millis(1500),
            search_debounce: Duration::from_millis(500),
            submit_throttle: Duration::from_millis(2000),
            page_size: 10,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
