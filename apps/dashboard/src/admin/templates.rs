use serde_json::{json, Value};

use super::catalog::RESUME_TEMPLATES;
use super::{action_path, echoed};
use crate::errors::ApiError;
use crate::http_client::ApiClient;
use crate::models::ResumeTemplate;

pub struct TemplateApi {
    client: ApiClient,
}

impl TemplateApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Publishes or withdraws a template from the candidate-facing gallery.
    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<Option<ResumeTemplate>, ApiError> {
        let body: Value = self
            .client
            .patch(&action_path(RESUME_TEMPLATES.endpoint, id, "status"), &json!({"isActive": is_active}))
            .await?;
        Ok(echoed(body))
    }
}
