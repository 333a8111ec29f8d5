//! Generic list-resource abstraction shared by every administrative page:
//! paginated, searchable query with a cache, create/edit/delete dialogs, and
//! mutation handling. A page is a `ResourceConfig` plus a `ListSource`.

pub mod cache;
pub mod delete;
pub mod form;
pub mod list_page;
pub mod query;
pub mod source;
pub mod table;

pub use cache::QueryCache;
pub use delete::DeleteOutcome;
pub use form::{FieldKind, Form, FormField};
pub use list_page::{Dialog, ListPage, ListSettings, LoadOutcome, MutationOutcome};
pub use query::{Page, PageInfo, QueryKey};
pub use source::{FlaggedPostSource, ListSource, MemberSource, RemoteSource, RoleSource};
pub use table::{Column, TableRow, TableView};

/// Static description of one administrative list page.
#[derive(Debug)]
pub struct ResourceConfig {
    /// Cache namespace, e.g. `skills`.
    pub key: &'static str,
    /// Singular display name used in messages, e.g. `Skill`.
    pub title: &'static str,
    /// Backend collection path, e.g. `/admin/skills`. Empty for store-backed pages.
    pub endpoint: &'static str,
    pub columns: &'static [Column],
    pub form: &'static [FormField],
    /// Filter parameters the page exposes besides search.
    pub filters: &'static [&'static str],
    pub searchable: bool,
    /// The backend may deactivate instead of deleting.
    pub soft_delete: bool,
    pub empty_message: &'static str,
}
