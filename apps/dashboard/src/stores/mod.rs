//! Client-side stores for the collections the backend does not serve yet.
//!
//! Each store holds an immutable snapshot. Mutators are synchronous, build the
//! next snapshot, persist it, and hand it back. Stores do not validate
//! relationships between entities.

pub mod moderation;
pub mod roles;

use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::storage::{Persistence, StoreSchema};

pub use moderation::{ModerationState, ModerationStore};
pub use roles::{MemberDraft, RoleDraft, RoleState, RoleStore};

pub struct Store<S: StoreSchema> {
    state: RwLock<Arc<S>>,
    persistence: Persistence,
}

impl<S: StoreSchema> Store<S> {
    /// Restores persisted state, falling back to the schema's initial state.
    pub fn open(persistence: Persistence) -> Self {
        let state = persistence.load::<S>().unwrap_or_else(S::initial);
        Self {
            state: RwLock::new(Arc::new(state)),
            persistence,
        }
    }

    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Applies `mutate` to a copy of the current state and publishes it.
    pub fn update(&self, mutate: impl FnOnce(&mut S)) -> Arc<S> {
        let next = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let mut next = S::clone(&guard);
            mutate(&mut next);
            let next = Arc::new(next);
            *guard = Arc::clone(&next);
            next
        };
        self.persist(&next);
        next
    }

    /// Like `update`, but `mutate` may reject the change, leaving state untouched.
    pub fn try_update<E>(&self, mutate: impl FnOnce(&mut S) -> Result<(), E>) -> Result<Arc<S>, E> {
        let next = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let mut next = S::clone(&guard);
            mutate(&mut next)?;
            let next = Arc::new(next);
            *guard = Arc::clone(&next);
            next
        };
        self.persist(&next);
        Ok(next)
    }

    /// Replaces the in-memory state without touching storage.
    pub fn reset(&self, state: S) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(state);
    }

    fn persist(&self, state: &S) {
        if let Err(e) = self.persistence.save(state) {
            warn!("Failed to persist '{}': {e}", S::NAME);
        }
    }
}

/// Case-insensitive substring match used by the store filters.
pub(crate) fn matches_search(haystacks: &[&str], search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty() || haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
}
