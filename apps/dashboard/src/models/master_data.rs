use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, list_item};

/// Master-typed skills are curated by administrators; user-typed skills were
/// entered as free text by an end user and can be promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    #[default]
    Master,
    User,
}

impl SkillType {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillType::Master => "master",
            SkillType::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, alias = "type")]
    pub skill_type: SkillType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

list_item!(Skill, active);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degree {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    /// e.g. `bachelor`, `master`, `doctorate`, `diploma`.
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

list_item!(Degree, active);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOfStudy {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub degree_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

list_item!(FieldOfStudy, active);
