use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use super::catalog::{POSTS, VIDEO_RESUMES};
use super::{action_path, echoed};
use crate::errors::ApiError;
use crate::http_client::{unwrap_data, ApiClient};
use crate::models::{FlaggedPost, VideoResume};
use crate::stores::ModerationStore;

/// Video resume review.
pub struct VideoResumeApi {
    client: ApiClient,
}

impl VideoResumeApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn approve(&self, id: &str) -> Result<Option<VideoResume>, ApiError> {
        let body: Value = self
            .client
            .patch(&action_path(VIDEO_RESUMES.endpoint, id, "approve"), &json!({}))
            .await?;
        Ok(echoed(body))
    }

    /// Rejects the video. The candidate sees the reason.
    pub async fn reject(&self, id: &str, reason: &str) -> Result<Option<VideoResume>, ApiError> {
        let body: Value = self
            .client
            .patch(
                &action_path(VIDEO_RESUMES.endpoint, id, "reject"),
                &json!({"reason": reason.trim()}),
            )
            .await?;
        Ok(echoed(body))
    }
}

/// Flagged community posts. The backend feed is mirrored into the local
/// moderation store, where review state is kept.
pub struct PostApi {
    client: ApiClient,
    store: Arc<ModerationStore>,
}

impl PostApi {
    pub fn new(client: ApiClient, store: Arc<ModerationStore>) -> Self {
        Self { client, store }
    }

    /// Pulls the flagged feed and merges it into the store. Posts already in
    /// the store keep their local review state, and flags merged into another
    /// are not counted again.
    pub async fn refresh_flagged(&self) -> Result<Vec<FlaggedPost>, ApiError> {
        let body: Value = self.client.get(POSTS.endpoint, &flagged_query()).await?;
        let fetched: Vec<FlaggedPost> = match unwrap_data::<Value>(body)? {
            Value::Object(mut map) => serde_json::from_value(
                map.remove("posts").or_else(|| map.remove("items")).unwrap_or(Value::Array(Vec::new())),
            )?,
            other => serde_json::from_value(other)?,
        };

        let mut new_count = 0;
        for post in fetched {
            if !self.store.contains(&post.id) {
                self.store.add(post);
                new_count += 1;
            }
        }
        info!("Flagged feed refreshed, {new_count} new");
        Ok(self.store.posts())
    }

    /// Takes the post down and drops every flag raised against it.
    pub async fn remove(&self, post_id: &str) -> Result<(), ApiError> {
        let _: Value = self.client.delete(&format!("{}/{post_id}", POSTS.endpoint)).await?;
        for flag in self.store.posts().into_iter().filter(|p| p.post_id == post_id) {
            if let Err(e) = self.store.remove(&flag.id) {
                debug!("Flag already gone locally: {e}");
            }
        }
        Ok(())
    }
}

fn flagged_query() -> Vec<(String, String)> {
    vec![("flagged".to_string(), "true".to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlagStatus, ReviewStatus};
    use crate::storage::Persistence;
    use crate::stores::moderation::flagged;
    use crate::test_support::{spawn_backend, Harness};
    use axum::{
        extract::Path,
        http::Uri,
        routing::{delete, get, patch},
        Json, Router,
    };
    use std::time::Duration;

    fn backend() -> Router {
        Router::new()
            .route(
                "/admin/video-resumes/:id/approve",
                patch(|Path(id): Path<String>| async move {
                    Json(json!({"data": {"_id": id, "candidateId": "c1", "videoUrl": "https://cdn/v.mp4", "status": "approved"}}))
                }),
            )
            .route(
                "/admin/video-resumes/:id/reject",
                patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({"data": {
                        "_id": id, "candidateId": "c1", "videoUrl": "https://cdn/v.mp4",
                        "status": "rejected", "rejectionReason": body["reason"]
                    }}))
                }),
            )
            .route(
                "/admin/posts",
                get(|uri: Uri| async move {
                    let flagged = uri.query() == Some("flagged=true");
                    let posts = if flagged {
                        json!([
                            {"_id": "f1", "postId": "p1", "author": "alice", "content": "buy now", "reason": "spam", "flaggedAt": "2026-01-05T10:00:00Z"},
                            {"_id": "f2", "postId": "p2", "author": "bob", "content": "hi", "reason": "abuse", "flaggedAt": "2026-01-05T11:00:00Z"}
                        ])
                    } else {
                        json!([])
                    };
                    Json(json!({"data": {"posts": posts}}))
                }),
            )
            .route("/admin/posts/:id", delete(|| async { Json(json!({"success": true})) }))
    }

    #[tokio::test]
    async fn test_video_review() {
        let h = Harness::new(&spawn_backend(backend()).await, Duration::from_millis(200));
        let api = VideoResumeApi::new(h.client.clone());

        let approved = api.approve("v1").await.unwrap().unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);

        let rejected = api.reject("v2", " too dark ").await.unwrap().unwrap();
        assert_eq!(rejected.status, ReviewStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("too dark"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_local_review_state() {
        let h = Harness::new(&spawn_backend(backend()).await, Duration::from_millis(200));
        let store = Arc::new(ModerationStore::open(Persistence::in_memory()));
        store.add(flagged("f1", "p1", "alice", "spam"));
        store.mark_as_reviewed("f1").unwrap();

        let posts = PostApi::new(h.client.clone(), Arc::clone(&store)).refresh_flagged().await.unwrap();
        assert_eq!(posts.len(), 2);
        let f1 = posts.iter().find(|p| p.id == "f1").unwrap();
        assert_eq!(f1.status, FlagStatus::Reviewed);
    }

    #[tokio::test]
    async fn test_repeated_refresh_does_not_recount_merged_flags() {
        let h = Harness::new(&spawn_backend(backend()).await, Duration::from_millis(200));
        let store = Arc::new(ModerationStore::open(Persistence::in_memory()));
        store.add(flagged("f9", "p1", "alice", "spam"));
        let api = PostApi::new(h.client.clone(), Arc::clone(&store));

        for _ in 0..3 {
            api.refresh_flagged().await.unwrap();
        }

        let posts = store.posts();
        assert_eq!(posts.len(), 2);
        let p1 = posts.iter().find(|p| p.post_id == "p1").unwrap();
        assert_eq!(p1.id, "f9");
        assert_eq!(p1.report_count, 2);
    }

    #[tokio::test]
    async fn test_remove_post_drops_its_flags() {
        let h = Harness::new(&spawn_backend(backend()).await, Duration::from_millis(200));
        let store = Arc::new(ModerationStore::open(Persistence::in_memory()));
        store.add(flagged("f1", "p1", "alice", "spam"));
        store.add(flagged("f2", "p2", "bob", "abuse"));

        PostApi::new(h.client.clone(), Arc::clone(&store)).remove("p1").await.unwrap();
        let ids: Vec<_> = store.posts().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["f2"]);
    }
}
