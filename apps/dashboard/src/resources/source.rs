use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::delete::DeleteOutcome;
use super::query::{Page, QueryKey};
use crate::errors::{ListError, StoreError};
use crate::http_client::ApiClient;
use crate::models::{FlagStatus, FlaggedPost, ListItem, Member, Role};
use crate::stores::{MemberDraft, ModerationStore, RoleDraft, RoleStore};

/// Where a list page reads and writes its records.
///
/// Carried by `ListPage` as `Arc<dyn ListSource<T>>`, so a page works the same
/// against the backend or a client-side store.
#[async_trait]
pub trait ListSource<T: ListItem>: Send + Sync {
    async fn list(&self, key: &QueryKey) -> Result<Page<T>, ListError>;

    /// Creates a record from a validated form body and returns the server's view of it.
    async fn create(&self, body: &Value) -> Result<Value, ListError>;

    async fn update(&self, id: &str, body: &Value) -> Result<Value, ListError>;

    async fn delete(&self, id: &str) -> Result<DeleteOutcome, ListError>;
}

// ────────────────────────────────────────────────────────────────────────────
// RemoteSource: a backend collection endpoint
// ────────────────────────────────────────────────────────────────────────────

/// A REST collection at `endpoint`, with members at `endpoint/<id>`.
pub struct RemoteSource<T> {
    client: ApiClient,
    endpoint: String,
    fixed_query: Vec<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<T> RemoteSource<T> {
    pub fn new(client: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            fixed_query: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Adds a query parameter sent with every list request, e.g. `flagged=true`.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.fixed_query.push((name.to_string(), value.to_string()));
        self
    }

    fn member_path(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint, id)
    }
}

#[async_trait]
impl<T: ListItem> ListSource<T> for RemoteSource<T> {
    async fn list(&self, key: &QueryKey) -> Result<Page<T>, ListError> {
        let mut query = key.to_query();
        query.extend(self.fixed_query.iter().cloned());
        let body = self.client.send(Method::GET, &self.endpoint, &query, None).await?;
        Ok(Page::from_response(body, key)?)
    }

    async fn create(&self, body: &Value) -> Result<Value, ListError> {
        Ok(self.client.send(Method::POST, &self.endpoint, &[], Some(body)).await?)
    }

    async fn update(&self, id: &str, body: &Value) -> Result<Value, ListError> {
        Ok(self
            .client
            .send(Method::PUT, &self.member_path(id), &[], Some(body))
            .await?)
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome, ListError> {
        let body = self
            .client
            .send(Method::DELETE, &self.member_path(id), &[], None)
            .await?;
        Ok(DeleteOutcome::from_response(&body))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store-backed sources
// ────────────────────────────────────────────────────────────────────────────

pub struct RoleSource(pub Arc<RoleStore>);

#[async_trait]
impl ListSource<Role> for RoleSource {
    async fn list(&self, key: &QueryKey) -> Result<Page<Role>, ListError> {
        Ok(Page::paginate(self.0.filter_roles(&key.search), key))
    }

    async fn create(&self, body: &Value) -> Result<Value, ListError> {
        let draft: RoleDraft = serde_json::from_value(body.clone())?;
        let state = self.0.add_role(draft);
        Ok(serde_json::to_value(state.roles.last())?)
    }

    async fn update(&self, id: &str, body: &Value) -> Result<Value, ListError> {
        let draft: RoleDraft = serde_json::from_value(body.clone())?;
        let state = self.0.update_role(id, draft)?;
        Ok(serde_json::to_value(state.roles.iter().find(|r| r.id == id))?)
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome, ListError> {
        self.0.remove_role(id)?;
        Ok(DeleteOutcome::Deleted)
    }
}

/// Members, optionally narrowed by the `roleId` filter.
pub struct MemberSource(pub Arc<RoleStore>);

pub const ROLE_FILTER: &str = "roleId";

#[async_trait]
impl ListSource<Member> for MemberSource {
    async fn list(&self, key: &QueryKey) -> Result<Page<Member>, ListError> {
        let role_id = key.filters.get(ROLE_FILTER).map(String::as_str).filter(|r| !r.is_empty());
        Ok(Page::paginate(self.0.filter_members(&key.search, role_id), key))
    }

    async fn create(&self, body: &Value) -> Result<Value, ListError> {
        let draft: MemberDraft = serde_json::from_value(body.clone())?;
        let state = self.0.add_member(draft);
        Ok(serde_json::to_value(state.members.last())?)
    }

    async fn update(&self, id: &str, body: &Value) -> Result<Value, ListError> {
        let draft: MemberDraft = serde_json::from_value(body.clone())?;
        let state = self.0.update_member(id, draft)?;
        Ok(serde_json::to_value(state.members.iter().find(|m| m.id == id))?)
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome, ListError> {
        self.0.remove_member(id)?;
        Ok(DeleteOutcome::Deleted)
    }
}

/// Flagged posts, optionally narrowed by the `status` filter.
pub struct FlaggedPostSource(pub Arc<ModerationStore>);

pub const STATUS_FILTER: &str = "status";

#[async_trait]
impl ListSource<FlaggedPost> for FlaggedPostSource {
    async fn list(&self, key: &QueryKey) -> Result<Page<FlaggedPost>, ListError> {
        let status = match key.filters.get(STATUS_FILTER).filter(|s| !s.is_empty()) {
            Some(raw) => Some(serde_json::from_value::<FlagStatus>(Value::String(raw.clone()))?),
            None => None,
        };
        Ok(Page::paginate(self.0.filter(status, &key.search), key))
    }

    async fn create(&self, body: &Value) -> Result<Value, ListError> {
        let mut record = as_object(body);
        record
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        record
            .entry("flaggedAt")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        let post: FlaggedPost = serde_json::from_value(Value::Object(record))?;
        let echoed = serde_json::to_value(&post)?;
        self.0.add(post);
        Ok(echoed)
    }

    /// Applies the submitted fields over the stored post.
    async fn update(&self, id: &str, body: &Value) -> Result<Value, ListError> {
        let current = self
            .0
            .posts()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "Flagged post",
                id: id.to_string(),
            })?;

        let mut merged = as_object(&serde_json::to_value(&current)?);
        merged.extend(as_object(body));
        merged.insert("id".to_string(), Value::String(id.to_string()));
        let post: FlaggedPost = serde_json::from_value(Value::Object(merged))?;
        let echoed = serde_json::to_value(&post)?;
        self.0.update(post)?;
        Ok(echoed)
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome, ListError> {
        self.0.remove(id)?;
        Ok(DeleteOutcome::Deleted)
    }
}

fn as_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Persistence;
    use crate::stores::moderation::flagged;
    use crate::models::Skill;
    use crate::test_support::{spawn_backend, Harness};
    use axum::{extract::Path, http::Uri, routing::get, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_member_source_filters_by_role() {
        let store = Arc::new(RoleStore::open(Persistence::in_memory()));
        let source = MemberSource(Arc::clone(&store));
        for (name, role) in [("Ada", "admin"), ("Bob", "moderator"), ("Cy", "moderator")] {
            source
                .create(&json!({"name": name, "email": format!("{name}@example.com"), "roleId": role}))
                .await
                .unwrap();
        }

        let mut key = QueryKey::new("members", 1, 10);
        key.filters.insert(ROLE_FILTER.to_string(), "moderator".to_string());
        let page = source.list(&key).await.unwrap();
        assert_eq!(page.info.total, 2);

        key.search = "bob".to_string();
        assert_eq!(source.list(&key).await.unwrap().items[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_role_source_update_and_missing_delete() {
        let store = Arc::new(RoleStore::open(Persistence::in_memory()));
        let source = RoleSource(Arc::clone(&store));
        let created = source.create(&json!({"name": "Support"})).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = source
            .update(&id, &json!({"name": "Support", "permissions": ["companies.read"]}))
            .await
            .unwrap();
        assert_eq!(updated["permissions"], json!(["companies.read"]));

        assert!(matches!(source.delete("nope").await, Err(ListError::Store(_))));
    }

    #[tokio::test]
    async fn test_flagged_source_status_filter_and_partial_update() {
        let store = Arc::new(ModerationStore::open(Persistence::in_memory()));
        store.add(flagged("f1", "p1", "alice", "spam"));
        store.add(flagged("f2", "p2", "bob", "abuse"));
        store.mark_as_reviewed("f2").unwrap();
        let source = FlaggedPostSource(Arc::clone(&store));

        let mut key = QueryKey::new("flagged-posts", 1, 10);
        key.filters.insert(STATUS_FILTER.to_string(), "pending".to_string());
        let page = source.list(&key).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "f1");

        let updated = source.update("f1", &json!({"reason": "phishing"})).await.unwrap();
        assert_eq!(updated["reason"], "phishing");
        assert_eq!(updated["author"], "alice");

        key.filters.insert(STATUS_FILTER.to_string(), "bogus".to_string());
        assert!(matches!(source.list(&key).await, Err(ListError::Decode(_))));
    }

    async fn skills_handler(uri: Uri) -> Json<Value> {
        let query = uri.query().unwrap_or_default();
        let items = if query.contains("search=ru") && query.contains("sort=name") {
            json!([{"_id": "s1", "name": "Rust", "type": "master"}])
        } else {
            json!([])
        };
        Json(json!({
            "data": items,
            "pagination": {"total": 1, "page": 1, "limit": 10, "totalPages": 1},
        }))
    }

    async fn delete_skill(Path(id): Path<String>) -> Json<Value> {
        Json(json!({"success": true, "softDeleted": id == "in-use"}))
    }

    #[tokio::test]
    async fn test_remote_source_sends_query_and_reads_delete_outcome() {
        let app = Router::new()
            .route("/admin/skills", get(skills_handler))
            .route("/admin/skills/:id", axum::routing::delete(delete_skill));
        let base = spawn_backend(app).await;
        let harness = Harness::new(&base, Duration::from_millis(200));
        let source: RemoteSource<Skill> =
            RemoteSource::new(harness.client.clone(), "/admin/skills").with_query("sort", "name");

        let mut key = QueryKey::new("skills", 1, 10);
        key.search = "ru".to_string();
        let page = source.list(&key).await.unwrap();
        assert_eq!(page.items[0].name, "Rust");
        assert_eq!(page.info.total_pages, 1);

        assert_eq!(source.delete("in-use").await.unwrap(), DeleteOutcome::Deactivated);
        assert_eq!(source.delete("unused").await.unwrap(), DeleteOutcome::Deleted);
    }
}
