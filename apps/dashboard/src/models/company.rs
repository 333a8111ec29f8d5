use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, list_item};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// A Know-Your-Customer document uploaded by the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycDocument {
    #[serde(alias = "_id")]
    pub id: String,
    /// e.g. `gst_certificate`, `pan_card`, `incorporation_certificate`.
    #[serde(alias = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub status: VerificationStatus,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub kyc_documents: Vec<KycDocument>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

list_item!(Company, active);

impl Company {
    /// Documents still waiting for a decision.
    pub fn pending_documents(&self) -> impl Iterator<Item = &KycDocument> {
        self.kyc_documents
            .iter()
            .filter(|d| d.status == VerificationStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_defaults_and_documents() {
        let company: Company = serde_json::from_value(json!({
            "_id": "c1",
            "name": "Acme",
            "kycDocuments": [
                {"_id": "d1", "type": "pan_card", "url": "https://cdn/pan.pdf"},
                {"_id": "d2", "type": "gst_certificate", "url": "https://cdn/gst.pdf", "status": "verified"}
            ]
        }))
        .unwrap();

        assert!(company.is_active);
        assert_eq!(company.verification_status, VerificationStatus::Pending);
        let pending: Vec<_> = company.pending_documents().map(|d| d.id.as_str()).collect();
        assert_eq!(pending, vec!["d1"]);
    }
}
