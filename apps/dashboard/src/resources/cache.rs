use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::query::{Page, QueryKey};

struct Inner<T> {
    pages: HashMap<QueryKey, Arc<Page<T>>>,
    /// Bumped on every invalidation; fetches started before it are not cached.
    generation: u64,
}

/// List results keyed by `QueryKey`. Entries live until their resource is
/// invalidated by a mutation.
pub struct QueryCache<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pages: HashMap::new(),
                generation: 0,
            }),
        }
    }
}

impl<T> QueryCache<T> {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &QueryKey) -> Option<Arc<Page<T>>> {
        let hit = self.lock().pages.get(key).cloned();
        if hit.is_some() {
            debug!("Cache hit for {} page {}", key.resource, key.page);
        }
        hit
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Stores a fetched page unless the resource was invalidated after the
    /// fetch began. Returns whether the page was stored.
    pub fn insert(&self, key: QueryKey, page: Arc<Page<T>>, started_at_generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.generation != started_at_generation {
            return false;
        }
        inner.pages.insert(key, page);
        true
    }

    /// Drops every cached page of `resource`.
    pub fn invalidate(&self, resource: &str) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.pages.retain(|k, _| k.resource != resource);
        debug!("Invalidated cached pages for {resource}");
    }

    pub fn len(&self) -> usize {
        self.lock().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
