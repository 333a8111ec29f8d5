//! Plain records mirroring backend resources. Wire names are camelCase and
//! ids accept both `id` and `_id`.

/// A row that can be listed, keyed by its id.
pub trait ListItem: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Whether the record is currently active. Soft-deleted rows report `false`.
    fn is_active(&self) -> bool {
        true
    }
}

macro_rules! list_item {
    ($ty:ty, active) => {
        impl $crate::models::ListItem for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn is_active(&self) -> bool {
                self.is_active
            }
        }
    };
    ($ty:ty) => {
        impl $crate::models::ListItem for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

pub(crate) use list_item;

fn default_true() -> bool {
    true
}

pub mod access;
pub mod accounts;
pub mod company;
pub mod content;
pub mod master_data;

pub use access::{AdminUser, Member, Permission, PermissionKey, Role, PERMISSIONS};
pub use accounts::{Candidate, Employer};
pub use company::{Company, KycDocument, VerificationStatus};
pub use content::{FlagStatus, FlaggedPost, ResumeTemplate, ReviewStatus, VideoResume};
pub use master_data::{Degree, FieldOfStudy, Skill, SkillType};
