//! The administrative console: one context owning the session, the HTTP
//! client and the client-side stores, handing out list pages and typed
//! resource APIs.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod companies;
pub mod master_data;
pub mod moderation;
pub mod templates;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::config::DashboardConfig;
use crate::http_client::{unwrap_data, ApiClient};
use crate::models::{
    AdminUser, Candidate, Company, Degree, Employer, FieldOfStudy, FlaggedPost, ListItem, Member, ResumeTemplate,
    Role, Skill, VideoResume,
};
use crate::notify::{Navigator, Notifier, Route};
use crate::resources::{
    FlaggedPostSource, ListPage, ListSettings, MemberSource, RemoteSource, ResourceConfig, RoleSource,
};
use crate::session::Session;
use crate::storage::{FileStorage, Persistence};
use crate::stores::{ModerationStore, RoleStore};

pub use accounts::AccountApi;
pub use auth::{AuthApi, PasswordChange};
pub use companies::CompanyApi;
pub use master_data::MasterDataApi;
pub use moderation::{PostApi, VideoResumeApi};
pub use templates::TemplateApi;

/// Everything an admin screen needs, built once at startup.
pub struct AdminContext {
    pub config: DashboardConfig,
    pub persistence: Persistence,
    pub session: Arc<Session>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub client: ApiClient,
    pub roles: Arc<RoleStore>,
    pub moderation: Arc<ModerationStore>,
}

impl AdminContext {
    pub fn new(
        config: DashboardConfig,
        persistence: Persistence,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let session = Arc::new(Session::restore(persistence.clone()));
        let client = ApiClient::new(&config, Arc::clone(&session), Arc::clone(&notifier), Arc::clone(&navigator))
            .context("Failed to build API client")?;
        let roles = Arc::new(RoleStore::open(persistence.clone()));
        let moderation = Arc::new(ModerationStore::open(persistence.clone()));

        info!(
            "{} ready against {} (signed in: {})",
            config.app_name,
            config.api_base_url,
            session.is_authenticated()
        );

        Ok(Self {
            config,
            persistence,
            session,
            notifier,
            navigator,
            client,
            roles,
            moderation,
        })
    }

    /// Reads `DashboardConfig` from the environment and stores state on disk
    /// under its storage directory.
    pub fn from_env(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let config = DashboardConfig::from_env()?;
        let storage = FileStorage::open(&config.storage_dir)
            .with_context(|| format!("Failed to open storage at {}", config.storage_dir.display()))?;
        Self::new(config, Persistence::new(Arc::new(storage)), notifier, navigator)
    }

    pub fn settings(&self) -> ListSettings {
        ListSettings::from(&self.config)
    }

    fn remote_page<T: ListItem>(&self, config: &'static ResourceConfig) -> ListPage<T> {
        let source = RemoteSource::<T>::new(self.client.clone(), config.endpoint);
        ListPage::new(config, Arc::new(source), Arc::clone(&self.notifier), self.settings())
    }

    // ── Pages ────────────────────────────────────────────────────────────

    pub fn admins_page(&self) -> ListPage<AdminUser> {
        self.remote_page(&catalog::ADMINS)
    }

    pub fn companies_page(&self) -> ListPage<Company> {
        self.remote_page(&catalog::COMPANIES)
    }

    pub fn employers_page(&self) -> ListPage<Employer> {
        self.remote_page(&catalog::EMPLOYERS)
    }

    pub fn candidates_page(&self) -> ListPage<Candidate> {
        self.remote_page(&catalog::CANDIDATES)
    }

    pub fn skills_page(&self) -> ListPage<Skill> {
        self.remote_page(&catalog::SKILLS)
    }

    pub fn degrees_page(&self) -> ListPage<Degree> {
        self.remote_page(&catalog::DEGREES)
    }

    pub fn fields_of_study_page(&self) -> ListPage<FieldOfStudy> {
        self.remote_page(&catalog::FIELDS_OF_STUDY)
    }

    pub fn templates_page(&self) -> ListPage<ResumeTemplate> {
        self.remote_page(&catalog::RESUME_TEMPLATES)
    }

    pub fn video_resumes_page(&self) -> ListPage<VideoResume> {
        self.remote_page(&catalog::VIDEO_RESUMES)
    }

    /// Flagged posts as the backend reports them.
    pub fn posts_page(&self) -> ListPage<FlaggedPost> {
        let source = RemoteSource::<FlaggedPost>::new(self.client.clone(), catalog::POSTS.endpoint)
            .with_query("flagged", "true");
        ListPage::new(&catalog::POSTS, Arc::new(source), Arc::clone(&self.notifier), self.settings())
    }

    pub fn roles_page(&self) -> ListPage<Role> {
        let source = RoleSource(Arc::clone(&self.roles));
        ListPage::new(&catalog::ROLES, Arc::new(source), Arc::clone(&self.notifier), self.settings())
    }

    pub fn members_page(&self) -> ListPage<Member> {
        let source = MemberSource(Arc::clone(&self.roles));
        ListPage::new(&catalog::MEMBERS, Arc::new(source), Arc::clone(&self.notifier), self.settings())
    }

    /// The local moderation queue.
    pub fn flagged_posts_page(&self) -> ListPage<FlaggedPost> {
        let source = FlaggedPostSource(Arc::clone(&self.moderation));
        ListPage::new(&catalog::FLAGGED_POSTS, Arc::new(source), Arc::clone(&self.notifier), self.settings())
    }

    // ── Resource APIs ────────────────────────────────────────────────────

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.client.clone())
    }

    pub fn companies(&self) -> CompanyApi {
        CompanyApi::new(self.client.clone())
    }

    pub fn employers(&self) -> AccountApi<Employer> {
        AccountApi::new(self.client.clone(), catalog::EMPLOYERS.endpoint)
    }

    pub fn candidates(&self) -> AccountApi<Candidate> {
        AccountApi::new(self.client.clone(), catalog::CANDIDATES.endpoint)
    }

    pub fn admins(&self) -> AccountApi<AdminUser> {
        AccountApi::new(self.client.clone(), catalog::ADMINS.endpoint)
    }

    pub fn master_data(&self) -> MasterDataApi {
        MasterDataApi::new(self.client.clone())
    }

    pub fn templates(&self) -> TemplateApi {
        TemplateApi::new(self.client.clone())
    }

    pub fn video_resumes(&self) -> VideoResumeApi {
        VideoResumeApi::new(self.client.clone())
    }

    pub fn posts(&self) -> PostApi {
        PostApi::new(self.client.clone(), Arc::clone(&self.moderation))
    }

    /// Signs out and returns to the login screen.
    pub async fn logout(&self) {
        self.auth().logout().await;
        self.navigator.navigate(Route::Login);
    }
}

/// `<endpoint>/<id>/<action>`, the shape of every state-transition route.
pub(crate) fn action_path(endpoint: &str, id: &str, action: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), id, action)
}

/// The record a mutation echoes back, when the backend sends one.
pub(crate) fn echoed<T: DeserializeOwned>(body: Value) -> Option<T> {
    unwrap_data(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VerificationStatus;
    use crate::notify::{MemoryNavigator, MemoryNotifier, NotificationLevel};
    use crate::resources::{LoadOutcome, MutationOutcome};
    use crate::test_support::{admin_user, spawn_backend};
    use axum::{
        extract::{Path, State},
        routing::{get, patch},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn context(base_url: &str) -> (AdminContext, Arc<MemoryNotifier>, Arc<MemoryNavigator>) {
        let mut config = DashboardConfig::with_base_url(base_url);
        config.logout_delay = Duration::from_millis(100);
        let notifier = Arc::new(MemoryNotifier::default());
        let navigator = Arc::new(MemoryNavigator::default());
        let ctx = AdminContext::new(config, Persistence::in_memory(), notifier.clone(), navigator.clone()).unwrap();
        (ctx, notifier, navigator)
    }

    #[test]
    fn test_action_path() {
        assert_eq!(action_path("/admin/companies/", "c1", "verify"), "/admin/companies/c1/verify");
    }

    #[tokio::test]
    async fn test_stores_share_persistence_and_logout_clears_them() {
        let (ctx, _, _) = context("http://127.0.0.1:1");
        ctx.session.login("tok".to_string(), admin_user());
        let page = ctx.members_page();
        page.open_create();
        page.set_field("name", "Grace").unwrap();
        page.set_field("email", "grace@example.com").unwrap();
        page.set_field("roleId", "moderator").unwrap();
        page.submit().await.unwrap();
        assert!(ctx.persistence.get_raw("role-storage").unwrap().is_some());

        assert!(ctx.roles.members()[0].is_active);

        ctx.session.logout();
        assert!(ctx.persistence.get_raw("role-storage").unwrap().is_none());
        assert!(ctx.persistence.get_raw("auth-storage").unwrap().is_none());
    }

    type Companies = Arc<Mutex<Vec<Value>>>;

    #[tokio::test]
    async fn test_verify_from_companies_page_refreshes_row() {
        let companies: Companies = Arc::new(Mutex::new(vec![
            json!({"_id": "c1", "name": "Acme", "verificationStatus": "pending"}),
        ]));
        let app = Router::new()
            .route(
                "/admin/companies",
                get(|State(c): State<Companies>| async move {
                    let items = c.lock().unwrap().clone();
                    Json(json!({"data": {"companies": items, "total": items.len()}}))
                }),
            )
            .route(
                "/admin/companies/:id/verify",
                patch(|State(c): State<Companies>, Path(id): Path<String>| async move {
                    let mut c = c.lock().unwrap();
                    for company in c.iter_mut().filter(|x| x["_id"] == id) {
                        company["verificationStatus"] = json!("verified");
                    }
                    Json(json!({"success": true, "message": "Company verified"}))
                }),
            )
            .with_state(companies);
        let (ctx, notifier, _) = context(&spawn_backend(app).await);

        let page = ctx.companies_page();
        let first = page.load().await.unwrap();
        let company = &first.page().unwrap().items[0];
        assert_eq!(company.verification_status, VerificationStatus::Pending);

        let api = ctx.companies();
        page.run_action("Company verified", api.verify("c1")).await.unwrap();
        assert_eq!(notifier.last().unwrap().level, NotificationLevel::Success);

        let reloaded = page.load().await.unwrap();
        assert!(matches!(reloaded, LoadOutcome::Fresh(_)));
        assert_eq!(page.table().row("c1").unwrap().cells[3], "verified");
    }

    #[tokio::test]
    async fn test_logout_navigates_to_login() {
        let app = Router::new().route("/admin/auth/logout", axum::routing::post(|| async { Json(json!({})) }));
        let (ctx, _, navigator) = context(&spawn_backend(app).await);
        ctx.session.login("tok".to_string(), admin_user());

        ctx.logout().await;
        assert!(!ctx.session.is_authenticated());
        assert_eq!(navigator.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_flagged_page_reads_local_queue() {
        let (ctx, _, _) = context("http://127.0.0.1:1");
        ctx.moderation.add(crate::stores::moderation::flagged("f1", "p1", "alice", "spam"));
        let page = ctx.flagged_posts_page();
        page.load().await.unwrap();
        assert_eq!(page.table().rows.len(), 1);

        page.open_delete("f1");
        assert_eq!(page.confirm_delete().await.unwrap(), MutationOutcome::Deleted);
        assert!(ctx.moderation.posts().is_empty());
    }
}
