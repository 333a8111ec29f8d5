use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, list_item};

/// Permission identifier, e.g. `companies.write`.
pub type PermissionKey = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionKey>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

list_item!(AdminUser, active);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub key: &'static str,
    pub label: &'static str,
    pub group: &'static str,
}

/// Static permission catalogue offered when editing roles.
pub const PERMISSIONS: &[Permission] = &[
    Permission { key: "dashboard.view", label: "View dashboard", group: "General" },
    Permission { key: "companies.read", label: "View companies", group: "Companies" },
    Permission { key: "companies.write", label: "Manage companies", group: "Companies" },
    Permission { key: "companies.verify", label: "Review KYC documents", group: "Companies" },
    Permission { key: "employers.read", label: "View employers", group: "Employers" },
    Permission { key: "employers.write", label: "Manage employers", group: "Employers" },
    Permission { key: "candidates.read", label: "View candidates", group: "Candidates" },
    Permission { key: "candidates.write", label: "Manage candidates", group: "Candidates" },
    Permission { key: "master_data.write", label: "Edit skills, degrees and fields of study", group: "Master data" },
    Permission { key: "templates.write", label: "Manage resume templates", group: "Templates" },
    Permission { key: "moderation.review", label: "Moderate posts and video resumes", group: "Moderation" },
    Permission { key: "roles.write", label: "Manage roles and members", group: "Access" },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<PermissionKey>,
    /// Built-in roles seeded on first start.
    #[serde(default)]
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
}

list_item!(Role);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_id: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

list_item!(Member, active);
