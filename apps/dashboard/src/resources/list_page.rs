use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::cache::QueryCache;
use super::delete::DeleteOutcome;
use super::form::Form;
use super::query::{Page, QueryKey};
use super::source::ListSource;
use super::table::TableView;
use super::ResourceConfig;
use crate::config::DashboardConfig;
use crate::errors::{ApiError, ListError, StoreError};
use crate::models::ListItem;
use crate::notify::Notifier;
use crate::timing::{Debouncer, Throttle};

#[derive(Debug, Clone, Copy)]
pub struct ListSettings {
    pub page_size: u32,
    pub search_debounce: Duration,
    pub submit_throttle: Duration,
}

impl From<&DashboardConfig> for ListSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            page_size: config.page_size,
            search_debounce: config.search_debounce,
            submit_throttle: config.submit_throttle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Closed,
    Create(Form),
    Edit { id: String, form: Form },
    ConfirmDelete { id: String },
}

#[derive(Debug, Clone)]
pub enum LoadOutcome<T> {
    /// Fetched from the source and now current.
    Fresh(Arc<Page<T>>),
    Cached(Arc<Page<T>>),
    /// A newer load was issued while this one was in flight; its result was dropped.
    Stale,
}

impl<T> LoadOutcome<T> {
    pub fn page(&self) -> Option<&Arc<Page<T>>> {
        match self {
            LoadOutcome::Fresh(page) | LoadOutcome::Cached(page) => Some(page),
            LoadOutcome::Stale => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Created(Value),
    Updated(Value),
    Deleted,
    Deactivated,
    /// Dropped by the submit throttle.
    Ignored,
}

struct ViewState<T> {
    page: u32,
    limit: u32,
    raw_search: String,
    filters: BTreeMap<String, String>,
    current: Option<Arc<Page<T>>>,
    dialog: Dialog,
}

/// Controller behind every administrative list page.
///
/// Holds paging, search and filter state, serves list queries through a
/// cache keyed by `QueryKey`, and runs create/edit/delete dialogs against a
/// `ListSource`. All methods take `&self`; the page can be shared across
/// tasks.
pub struct ListPage<T: ListItem> {
    config: &'static ResourceConfig,
    source: Arc<dyn ListSource<T>>,
    notifier: Arc<dyn Notifier>,
    cache: QueryCache<T>,
    search: Debouncer<String>,
    submit_gate: Throttle,
    delete_gate: Throttle,
    action_gate: Throttle,
    latest_load: AtomicU64,
    view: Mutex<ViewState<T>>,
}

impl<T: ListItem> ListPage<T> {
    pub fn new(
        config: &'static ResourceConfig,
        source: Arc<dyn ListSource<T>>,
        notifier: Arc<dyn Notifier>,
        settings: ListSettings,
    ) -> Self {
        Self {
            config,
            source,
            notifier,
            cache: QueryCache::default(),
            search: Debouncer::new(String::new(), settings.search_debounce),
            submit_gate: Throttle::new(settings.submit_throttle),
            delete_gate: Throttle::new(settings.submit_throttle),
            action_gate: Throttle::new(settings.submit_throttle),
            latest_load: AtomicU64::new(0),
            view: Mutex::new(ViewState {
                page: 1,
                limit: settings.page_size.max(1),
                raw_search: String::new(),
                filters: BTreeMap::new(),
                current: None,
                dialog: Dialog::Closed,
            }),
        }
    }

    fn view(&self) -> MutexGuard<'_, ViewState<T>> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &'static ResourceConfig {
        self.config
    }

    // ── Query state ──────────────────────────────────────────────────────

    pub fn query_key(&self) -> QueryKey {
        let view = self.view();
        QueryKey {
            resource: self.config.key,
            page: view.page,
            limit: view.limit,
            search: self.search.current(),
            filters: view.filters.clone(),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.view().page
    }

    pub fn set_page(&self, page: u32) {
        self.view().page = page.max(1);
    }

    /// Moves forward when the current page says there is more. Returns whether it moved.
    pub fn next_page(&self) -> bool {
        let mut view = self.view();
        let has_next = view.current.as_ref().is_some_and(|p| p.info.has_next());
        if has_next {
            view.page += 1;
        }
        has_next
    }

    pub fn prev_page(&self) -> bool {
        let mut view = self.view();
        if view.page > 1 {
            view.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_limit(&self, limit: u32) {
        let mut view = self.view();
        view.limit = limit.max(1);
        view.page = 1;
    }

    /// Records the raw search input. The query only follows it once typing pauses.
    pub fn set_search(&self, input: &str) {
        if !self.config.searchable {
            return;
        }
        {
            let mut view = self.view();
            view.raw_search = input.to_string();
            view.page = 1;
        }
        self.search.set(input.trim().to_string());
    }

    pub fn raw_search(&self) -> String {
        self.view().raw_search.clone()
    }

    /// Fires each time the debounced search settles on a new value.
    pub fn search_updates(&self) -> watch::Receiver<String> {
        self.search.subscribe()
    }

    /// Sets one of the page's declared filters. Undeclared names are ignored
    /// and return `false`.
    pub fn set_filter(&self, name: &str, value: &str) -> bool {
        if !self.config.filters.contains(&name) {
            warn!("{} has no filter named {name}", self.config.key);
            return false;
        }
        let mut view = self.view();
        view.filters.insert(name.to_string(), value.to_string());
        view.page = 1;
        true
    }

    pub fn clear_filter(&self, name: &str) {
        let mut view = self.view();
        if view.filters.remove(name).is_some() {
            view.page = 1;
        }
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Loads the page for the current query key, from cache when possible.
    ///
    /// Only the most recently issued load may replace the current page.
    pub async fn load(&self) -> Result<LoadOutcome<T>, ListError> {
        let key = self.query_key();
        let ticket = self.latest_load.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(page) = self.cache.get(&key) {
            self.view().current = Some(Arc::clone(&page));
            return Ok(LoadOutcome::Cached(page));
        }

        let generation = self.cache.generation();
        let result = self.source.list(&key).await;

        if self.latest_load.load(Ordering::SeqCst) != ticket {
            debug!("Dropping stale {} response for page {}", key.resource, key.page);
            return Ok(LoadOutcome::Stale);
        }

        let page = match result {
            Ok(page) => Arc::new(page),
            Err(e) => {
                self.report_failure(&e, "load");
                return Err(e);
            }
        };
        self.cache.insert(key, Arc::clone(&page), generation);
        self.view().current = Some(Arc::clone(&page));
        Ok(LoadOutcome::Fresh(page))
    }

    pub fn current(&self) -> Option<Arc<Page<T>>> {
        self.view().current.clone()
    }

    pub fn table(&self) -> TableView {
        let current = self.current();
        let items = current.as_ref().map(|p| p.items.as_slice()).unwrap_or_default();
        TableView::build(self.config.columns, items, self.config.empty_message)
    }

    /// Drops every cached page of this resource so the next load refetches.
    pub fn invalidate(&self) {
        self.cache.invalidate(self.config.key);
    }

    // ── Dialogs ──────────────────────────────────────────────────────────

    pub fn dialog(&self) -> Dialog {
        self.view().dialog.clone()
    }

    pub fn open_create(&self) {
        self.view().dialog = Dialog::Create(Form::empty(self.config.form));
    }

    /// Opens the edit dialog pre-filled from the row currently on screen.
    pub fn open_edit(&self, id: &str) -> Result<(), ListError> {
        let record = self
            .current()
            .and_then(|page| page.items.iter().find(|item| item.id() == id).cloned())
            .ok_or_else(|| StoreError::NotFound {
                kind: self.config.title,
                id: id.to_string(),
            })?;
        let form = Form::from_record(self.config.form, &serde_json::to_value(&record)?);
        self.view().dialog = Dialog::Edit {
            id: id.to_string(),
            form,
        };
        Ok(())
    }

    pub fn open_delete(&self, id: &str) {
        self.view().dialog = Dialog::ConfirmDelete { id: id.to_string() };
    }

    pub fn close_dialog(&self) {
        self.view().dialog = Dialog::Closed;
    }

    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<(), ListError> {
        match &mut self.view().dialog {
            Dialog::Create(form) | Dialog::Edit { form, .. } => {
                form.set(name, value);
                Ok(())
            }
            _ => Err(ListError::NoDialog("form")),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Submits the open create or edit dialog.
    ///
    /// Invalid input and rejected submissions leave the dialog open with
    /// what the user typed.
    pub async fn submit(&self) -> Result<MutationOutcome, ListError> {
        let (id, validated) = match &self.view().dialog {
            Dialog::Create(form) => (None, form.validate(self.config.form)),
            Dialog::Edit { id, form } => (Some(id.clone()), form.validate(self.config.form)),
            _ => return Err(ListError::NoDialog("create or edit")),
        };
        let body = validated.map_err(|e| {
            self.notifier.error(&e.to_string());
            ListError::Form(e)
        })?;

        if !self.submit_gate.try_acquire() {
            debug!("Throttled duplicate submit on {}", self.config.key);
            return Ok(MutationOutcome::Ignored);
        }

        let result = match &id {
            None => self.source.create(&body).await.map(MutationOutcome::Created),
            Some(id) => self.source.update(id, &body).await.map(MutationOutcome::Updated),
        };

        match result {
            Ok(outcome) => {
                self.invalidate();
                let verb = if id.is_none() {
                    self.view().page = 1;
                    "created"
                } else {
                    "updated"
                };
                self.close_dialog();
                info!("{} {verb}", self.config.title);
                self.notifier.success(&format!("{} {verb} successfully", self.config.title));
                Ok(outcome)
            }
            Err(e) => {
                self.submit_gate.reset();
                self.report_failure(&e, "save");
                Err(e)
            }
        }
    }

    /// Deletes the record named by the open delete confirmation.
    pub async fn confirm_delete(&self) -> Result<MutationOutcome, ListError> {
        let id = match &self.view().dialog {
            Dialog::ConfirmDelete { id } => id.clone(),
            _ => return Err(ListError::NoDialog("delete")),
        };

        if !self.delete_gate.try_acquire() {
            debug!("Throttled duplicate delete on {}", self.config.key);
            return Ok(MutationOutcome::Ignored);
        }

        match self.source.delete(&id).await {
            Ok(outcome) => {
                self.invalidate();
                self.view().page = 1;
                self.close_dialog();
                let title = self.config.title;
                Ok(match outcome {
                    DeleteOutcome::Deleted => {
                        info!("{title} {id} deleted");
                        self.notifier.success(&format!("{title} deleted successfully"));
                        MutationOutcome::Deleted
                    }
                    DeleteOutcome::Deactivated => {
                        if !self.config.soft_delete {
                            warn!("{title} {id} was deactivated, but {} is not soft-delete", self.config.key);
                        }
                        info!("{title} {id} deactivated instead of deleted");
                        self.notifier.warning(&format!(
                            "{title} is in use and has been deactivated instead of deleted"
                        ));
                        MutationOutcome::Deactivated
                    }
                })
            }
            Err(e) => {
                self.delete_gate.reset();
                self.report_failure(&e, "delete");
                Err(e)
            }
        }
    }

    /// Runs a domain action on one of this page's records (verify, approve,
    /// toggle status, ...) under the same throttle and invalidation rules as
    /// the dialogs. Returns `None` when the throttle dropped the call.
    pub async fn run_action<R, F>(&self, success_message: &str, action: F) -> Result<Option<R>, ListError>
    where
        F: Future<Output = Result<R, ApiError>>,
    {
        if !self.action_gate.try_acquire() {
            debug!("Throttled duplicate action on {}", self.config.key);
            return Ok(None);
        }

        match action.await {
            Ok(value) => {
                self.invalidate();
                self.notifier.success(success_message);
                Ok(Some(value))
            }
            Err(e) => {
                self.action_gate.reset();
                let e = ListError::Api(e);
                self.report_failure(&e, "update");
                Err(e)
            }
        }
    }

    /// Toasts failures the HTTP client has not already announced.
    fn report_failure(&self, error: &ListError, verb: &str) {
        let announced = match error {
            ListError::Api(ApiError::Status { .. } | ApiError::Decode(_) | ApiError::Client(_)) => false,
            ListError::Api(_) => true,
            // Form errors are announced by `submit` before anything is sent.
            ListError::Form(_) => true,
            _ => false,
        };
        if !announced {
            self.notifier
                .error(&format!("Failed to {verb} {}: {error}", self.config.title.to_lowercase()));
        }
    }
}
