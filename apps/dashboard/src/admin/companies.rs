use serde_json::{json, Value};

use super::catalog::COMPANIES;
use super::{action_path, echoed};
use crate::errors::ApiError;
use crate::http_client::{unwrap_data, ApiClient};
use crate::models::{Company, KycDocument};

/// Company records and their KYC review.
pub struct CompanyApi {
    client: ApiClient,
}

impl CompanyApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> Result<Company, ApiError> {
        let body: Value = self.client.get(&format!("{}/{id}", COMPANIES.endpoint), &[]).await?;
        unwrap_data(body)
    }

    pub async fn kyc_documents(&self, id: &str) -> Result<Vec<KycDocument>, ApiError> {
        let body: Value = self.client.get(&action_path(COMPANIES.endpoint, id, "kyc-documents"), &[]).await?;
        let documents = match unwrap_data::<Value>(body)? {
            Value::Object(mut map) => map
                .remove("documents")
                .or_else(|| map.remove("kycDocuments"))
                .unwrap_or_default(),
            other => other,
        };
        if documents.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(documents)?)
    }

    /// Marks the company's KYC as verified.
    pub async fn verify(&self, id: &str) -> Result<Option<Company>, ApiError> {
        let body: Value = self.client.patch(&action_path(COMPANIES.endpoint, id, "verify"), &json!({})).await?;
        Ok(echoed(body))
    }

    /// Rejects the company's KYC. The reason is shown to the company.
    pub async fn reject(&self, id: &str, reason: &str) -> Result<Option<Company>, ApiError> {
        let body: Value = self
            .client
            .patch(&action_path(COMPANIES.endpoint, id, "reject"), &json!({"reason": reason.trim()}))
            .await?;
        Ok(echoed(body))
    }

    pub async fn set_active(&self, id: &str, is_active: bool) -> Result<Option<Company>, ApiError> {
        let body: Value = self
            .client
            .patch(&action_path(COMPANIES.endpoint, id, "status"), &json!({"isActive": is_active}))
            .await?;
        Ok(echoed(body))
    }
}
