use reqwest::Client;

use crate::config::Config;

/// Shared state injected into the forwarding handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Outbound client reused across requests. No retry policy is layered on top.
    pub http: Client,
    pub config: Config,
}
