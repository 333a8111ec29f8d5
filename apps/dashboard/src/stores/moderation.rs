use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{matches_search, Store};
use crate::errors::StoreError;
use crate::models::{FlagStatus, FlaggedPost};
use crate::storage::{Persistence, StoreSchema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationState {
    pub flagged_posts: Vec<FlaggedPost>,
    /// Flag ids folded into another pending flag, mapped to the flag that kept them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub merged_ids: BTreeMap<String, String>,
}

impl StoreSchema for ModerationState {
    const NAME: &'static str = "moderation-storage";
    const VERSION: u32 = 1;
}

/// Flagged posts awaiting or past review.
pub struct ModerationStore {
    inner: Store<ModerationState>,
}

impl ModerationStore {
    pub fn open(persistence: Persistence) -> Self {
        Self {
            inner: Store::open(persistence),
        }
    }

    pub fn snapshot(&self) -> Arc<ModerationState> {
        self.inner.snapshot()
    }

    pub fn posts(&self) -> Vec<FlaggedPost> {
        self.snapshot().flagged_posts.clone()
    }

    /// Replaces the collection with what the backend just returned.
    pub fn replace_all(&self, posts: Vec<FlaggedPost>) -> Arc<ModerationState> {
        self.inner.update(|state| {
            state.flagged_posts = posts;
            state.merged_ids.clear();
        })
    }

    /// Whether the flag is held, either as itself or merged into another.
    pub fn contains(&self, id: &str) -> bool {
        let state = self.snapshot();
        state.merged_ids.contains_key(id) || state.flagged_posts.iter().any(|p| p.id == id)
    }

    /// Adds a post, or merges the report into an existing pending flag for the
    /// same post. A flag id already held is a no-op.
    pub fn add(&self, post: FlaggedPost) -> Arc<ModerationState> {
        self.inner.update(|state| {
            if state.merged_ids.contains_key(&post.id) || state.flagged_posts.iter().any(|p| p.id == post.id) {
                return;
            }
            match state
                .flagged_posts
                .iter_mut()
                .find(|p| p.post_id == post.post_id && p.status == FlagStatus::Pending)
            {
                Some(existing) => {
                    existing.report_count = existing.report_count.saturating_add(post.report_count);
                    let kept = existing.id.clone();
                    state.merged_ids.insert(post.id, kept);
                }
                None => state.flagged_posts.push(post),
            }
        })
    }

    pub fn update(&self, post: FlaggedPost) -> Result<Arc<ModerationState>, StoreError> {
        self.inner.try_update(|state| {
            let slot = find(state, &post.id)?;
            *slot = post;
            Ok(())
        })
    }

    pub fn remove(&self, id: &str) -> Result<Arc<ModerationState>, StoreError> {
        self.inner.try_update(|state| {
            let before = state.flagged_posts.len();
            state.flagged_posts.retain(|p| p.id != id);
            if state.flagged_posts.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }

    /// Keeps the post, recording that a moderator looked at it.
    pub fn mark_as_reviewed(&self, id: &str) -> Result<Arc<ModerationState>, StoreError> {
        self.inner.try_update(|state| {
            let post = find(state, id)?;
            post.status = FlagStatus::Reviewed;
            post.reviewed_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Clears the flag: the post is fine and leaves the moderation queue.
    pub fn unflag_post(&self, id: &str) -> Result<Arc<ModerationState>, StoreError> {
        self.remove(id)
    }

    pub fn pending(&self) -> Vec<FlaggedPost> {
        self.filter(Some(FlagStatus::Pending), "")
    }

    pub fn filter(&self, status: Option<FlagStatus>, search: &str) -> Vec<FlaggedPost> {
        self.snapshot()
            .flagged_posts
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter(|p| matches_search(&[&p.author, &p.content, &p.reason], search))
            .cloned()
            .collect()
    }
}

fn find<'a>(state: &'a mut ModerationState, id: &str) -> Result<&'a mut FlaggedPost, StoreError> {
    state
        .flagged_posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound {
        kind: "Flagged post",
        id: id.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn flagged(id: &str, post_id: &str, author: &str, reason: &str) -> FlaggedPost {
    FlaggedPost {
        id: id.to_string(),
        post_id: post_id.to_string(),
        author: author.to_string(),
        content: format!("post by {author}"),
        reason: reason.to_string(),
        report_count: 1,
        status: FlagStatus::Pending,
        flagged_at: Utc::now(),
        reviewed_at: None,
    }
}
