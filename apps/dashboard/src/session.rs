//! The admin session: one token + identity value per process.
//!
//! Login sets it, logout clears it together with all local storage. Requests
//! read the token at call time, so a logout takes effect on the next call.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::AdminUser;
use crate::storage::{Persistence, StoreSchema};
use crate::stores::Store;

/// Raw bearer token key, kept outside the versioned blob.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<AdminUser>,
}

impl StoreSchema for AuthState {
    const NAME: &'static str = "auth-storage";
    const VERSION: u32 = 1;
}

pub struct Session {
    store: Store<AuthState>,
    persistence: Persistence,
    logout_scheduled: AtomicBool,
    /// Bumped on every login and logout.
    generation: AtomicU64,
}

impl Session {
    /// Restores a previous session from storage, if any.
    pub fn restore(persistence: Persistence) -> Self {
        let store = Store::<AuthState>::open(persistence.clone());

        // A bare token written by an older client still authenticates requests.
        if store.snapshot().token.is_none() {
            if let Ok(Some(token)) = persistence.get_raw(TOKEN_KEY) {
                store.reset(AuthState {
                    token: Some(token),
                    user: None,
                });
            }
        }

        Self {
            store,
            persistence,
            logout_scheduled: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub fn login(&self, token: String, user: AdminUser) -> Arc<AuthState> {
        info!("Admin {} logged in", user.email);
        if let Err(e) = self.persistence.set_raw(TOKEN_KEY, &token) {
            warn!("Failed to persist token: {e}");
        }
        self.logout_scheduled.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store.update(|state| {
            state.token = Some(token);
            state.user = Some(user);
        })
    }

    /// Clears the session and every local storage key.
    pub fn logout(&self) {
        self.store.reset(AuthState::default());
        if let Err(e) = self.persistence.clear_all() {
            warn!("Failed to clear local storage on logout: {e}");
        }
        self.logout_scheduled.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        info!("Session cleared");
    }

    pub fn set_user(&self, user: AdminUser) -> Arc<AuthState> {
        self.store.update(|state| state.user = Some(user))
    }

    pub fn token(&self) -> Option<String> {
        self.store.snapshot().token.clone()
    }

    pub fn user(&self) -> Option<AdminUser> {
        self.store.snapshot().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.snapshot().token.is_some()
    }

    pub fn has_permission(&self, key: &str) -> bool {
        self.store
            .snapshot()
            .user
            .as_ref()
            .is_some_and(|u| u.permissions.iter().any(|p| p == key))
    }

    /// Claims the pending forced logout for the current session. Only the
    /// first caller gets the session generation to log out.
    pub(crate) fn claim_logout(&self) -> Option<u64> {
        if self.logout_scheduled.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(self.generation.load(Ordering::SeqCst))
        }
    }

    /// Logs out only if nobody logged in or out since `generation` was read.
    pub(crate) fn logout_if_current(&self, generation: u64) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            info!("Skipping forced logout, the session changed");
            return false;
        }
        self.logout();
        true
    }
}
