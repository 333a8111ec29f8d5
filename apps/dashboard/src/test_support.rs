//! Shared fixtures for tests that talk to an in-process backend.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::config::DashboardConfig;
use crate::http_client::ApiClient;
use crate::models::AdminUser;
use crate::notify::{MemoryNavigator, MemoryNotifier};
use crate::session::Session;
use crate::storage::Persistence;

/// Serves `app` on an ephemeral local port and returns its origin.
pub async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub struct Harness {
    pub client: ApiClient,
    pub session: Arc<Session>,
    pub notifier: Arc<MemoryNotifier>,
    pub navigator: Arc<MemoryNavigator>,
    pub persistence: Persistence,
    pub config: DashboardConfig,
}

impl Harness {
    pub fn new(base_url: &str, logout_delay: Duration) -> Self {
        let mut config = DashboardConfig::with_base_url(base_url);
        config.logout_delay = logout_delay;
        config.request_timeout = Duration::from_secs(5);

        let persistence = Persistence::in_memory();
        let session = Arc::new(Session::restore(persistence.clone()));
        let notifier = Arc::new(MemoryNotifier::default());
        let navigator = Arc::new(MemoryNavigator::default());
        let client = ApiClient::new(&config, Arc::clone(&session), notifier.clone(), navigator.clone()).unwrap();

        Self {
            client,
            session,
            notifier,
            navigator,
            persistence,
            config,
        }
    }
}

pub fn admin_user() -> AdminUser {
    AdminUser {
        id: "admin-1".to_string(),
        name: "Ada Admin".to_string(),
        email: "ada@example.com".to_string(),
        role: Some("super-admin".to_string()),
        permissions: vec!["companies.read".to_string(), "roles.write".to_string()],
        avatar: None,
        is_active: true,
    }
}
