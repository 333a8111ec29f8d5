use serde_json::{json, Value};

use super::catalog::{DEGREES, SKILLS};
use super::{action_path, echoed};
use crate::errors::ApiError;
use crate::http_client::{unwrap_data, ApiClient};
use crate::models::{Degree, Skill, SkillType};
use crate::resources::{Page, QueryKey};

/// Filter name the skills endpoint uses for the master/user split.
pub const SKILL_TYPE_FILTER: &str = "type";
pub const DEGREE_FILTER: &str = "degreeId";

/// Skills, degrees and fields of study beyond plain CRUD.
pub struct MasterDataApi {
    client: ApiClient,
}

impl MasterDataApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Turns a user-entered skill into a curated master skill.
    pub async fn promote_to_master(&self, skill_id: &str) -> Result<Option<Skill>, ApiError> {
        let body: Value = self
            .client
            .patch(
                &action_path(SKILLS.endpoint, skill_id, "type"),
                &json!({"type": SkillType::Master.as_str()}),
            )
            .await?;
        Ok(echoed(body))
    }

    /// Active degrees for the field-of-study degree picker.
    pub async fn degree_options(&self) -> Result<Vec<Degree>, ApiError> {
        let key = QueryKey::new(DEGREES.key, 1, 100);
        let mut query = key.to_query();
        query.push(("isActive".to_string(), "true".to_string()));
        let body: Value = self.client.get(DEGREES.endpoint, &query).await?;
        let page: Page<Degree> = Page::from_response(body, &key)?;
        Ok(page.items.into_iter().filter(|d| d.is_active).collect())
    }

    pub async fn skill(&self, id: &str) -> Result<Skill, ApiError> {
        let body: Value = self.client.get(&format!("{}/{id}", SKILLS.endpoint), &[]).await?;
        unwrap_data(body)
    }
}
