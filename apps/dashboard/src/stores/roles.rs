use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{matches_search, Store};
use crate::errors::StoreError;
use crate::models::{Member, PermissionKey, Role, PERMISSIONS};
use crate::storage::{Persistence, StoreSchema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleState {
    pub roles: Vec<Role>,
    pub members: Vec<Member>,
}

impl StoreSchema for RoleState {
    const NAME: &'static str = "role-storage";
    const VERSION: u32 = 1;

    fn initial() -> Self {
        RoleState {
            roles: system_roles(),
            members: Vec::new(),
        }
    }
}

/// Built-in roles present before any admin edits.
fn system_roles() -> Vec<Role> {
    let now = Utc::now();
    let all: Vec<PermissionKey> = PERMISSIONS.iter().map(|p| p.key.to_string()).collect();
    let role = |id: &str, name: &str, description: &str, permissions: Vec<PermissionKey>| Role {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        permissions,
        is_system: true,
        created_at: now,
    };

    vec![
        role("super-admin", "Super Admin", "Full access to every module", all),
        role(
            "admin",
            "Admin",
            "Manages companies, accounts and master data",
            PERMISSIONS
                .iter()
                .filter(|p| p.key != "roles.write")
                .map(|p| p.key.to_string())
                .collect(),
        ),
        role(
            "moderator",
            "Moderator",
            "Reviews flagged posts and video resumes",
            vec!["dashboard.view".to_string(), "moderation.review".to_string()],
        ),
    ]
}

/// Editable fields of a role, as submitted by the role dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<PermissionKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub role_id: String,
    /// Left unchanged on update when absent; new members start active.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Roles and the members assigned to them.
pub struct RoleStore {
    inner: Store<RoleState>,
}

impl RoleStore {
    pub fn open(persistence: Persistence) -> Self {
        Self {
            inner: Store::open(persistence),
        }
    }

    pub fn snapshot(&self) -> Arc<RoleState> {
        self.inner.snapshot()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.snapshot().roles.clone()
    }

    pub fn members(&self) -> Vec<Member> {
        self.snapshot().members.clone()
    }

    pub fn role(&self, id: &str) -> Option<Role> {
        self.snapshot().roles.iter().find(|r| r.id == id).cloned()
    }

    pub fn add_role(&self, draft: RoleDraft) -> Arc<RoleState> {
        self.inner.update(|state| {
            state.roles.push(Role {
                id: Uuid::new_v4().to_string(),
                name: draft.name,
                description: draft.description,
                permissions: draft.permissions,
                is_system: false,
                created_at: Utc::now(),
            });
        })
    }

    pub fn update_role(&self, id: &str, draft: RoleDraft) -> Result<Arc<RoleState>, StoreError> {
        self.inner.try_update(|state| {
            let role = state
                .roles
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| not_found("Role", id))?;
            role.name = draft.name;
            role.description = draft.description;
            role.permissions = draft.permissions;
            Ok(())
        })
    }

    /// Members that still reference the role are left untouched.
    pub fn remove_role(&self, id: &str) -> Result<Arc<RoleState>, StoreError> {
        self.inner.try_update(|state| {
            let before = state.roles.len();
            state.roles.retain(|r| r.id != id);
            if state.roles.len() == before {
                return Err(not_found("Role", id));
            }
            Ok(())
        })
    }

    pub fn add_member(&self, draft: MemberDraft) -> Arc<RoleState> {
        self.inner.update(|state| {
            state.members.push(Member {
                id: Uuid::new_v4().to_string(),
                name: draft.name,
                email: draft.email,
                role_id: draft.role_id,
                is_active: draft.is_active.unwrap_or(true),
                joined_at: Utc::now(),
            });
        })
    }

    pub fn update_member(&self, id: &str, draft: MemberDraft) -> Result<Arc<RoleState>, StoreError> {
        self.inner.try_update(|state| {
            let member = find_member(state, id)?;
            member.name = draft.name;
            member.email = draft.email;
            member.role_id = draft.role_id;
            if let Some(is_active) = draft.is_active {
                member.is_active = is_active;
            }
            Ok(())
        })
    }

    pub fn set_member_active(&self, id: &str, is_active: bool) -> Result<Arc<RoleState>, StoreError> {
        self.inner.try_update(|state| {
            find_member(state, id)?.is_active = is_active;
            Ok(())
        })
    }

    pub fn remove_member(&self, id: &str) -> Result<Arc<RoleState>, StoreError> {
        self.inner.try_update(|state| {
            let before = state.members.len();
            state.members.retain(|m| m.id != id);
            if state.members.len() == before {
                return Err(not_found("Member", id));
            }
            Ok(())
        })
    }

    pub fn members_with_role(&self, role_id: &str) -> Vec<Member> {
        self.snapshot()
            .members
            .iter()
            .filter(|m| m.role_id == role_id)
            .cloned()
            .collect()
    }

    pub fn filter_roles(&self, search: &str) -> Vec<Role> {
        self.snapshot()
            .roles
            .iter()
            .filter(|r| matches_search(&[&r.name, &r.description], search))
            .cloned()
            .collect()
    }

    pub fn filter_members(&self, search: &str, role_id: Option<&str>) -> Vec<Member> {
        self.snapshot()
            .members
            .iter()
            .filter(|m| role_id.map_or(true, |r| m.role_id == r))
            .filter(|m| matches_search(&[&m.name, &m.email], search))
            .cloned()
            .collect()
    }
}

fn find_member<'a>(state: &'a mut RoleState, id: &str) -> Result<&'a mut Member, StoreError> {
    state
        .members
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| not_found("Member", id))
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RoleStore {
        RoleStore::open(Persistence::in_memory())
    }

    fn draft(name: &str) -> RoleDraft {
        RoleDraft {
            name: name.to_string(),
            description: format!("{name} role"),
            permissions: vec!["companies.read".to_string()],
        }
    }

    fn member(name: &str, role_id: &str) -> MemberDraft {
        MemberDraft {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role_id: role_id.to_string(),
            is_active: None,
        }
    }

    #[test]
    fn test_seeds_system_roles() {
        let roles = store().roles();
        assert_eq!(roles.len(), 3);
        assert!(roles.iter().all(|r| r.is_system));
        let super_admin = roles.iter().find(|r| r.id == "super-admin").unwrap();
        assert_eq!(super_admin.permissions.len(), PERMISSIONS.len());
    }

    #[test]
    fn test_add_update_remove_role() {
        let store = store();
        let state = store.add_role(draft("Support"));
        let added = state.roles.last().unwrap().clone();
        assert!(!added.is_system);

        let mut edit = draft("Support Lead");
        edit.permissions.push("candidates.read".to_string());
        let state = store.update_role(&added.id, edit).unwrap();
        let updated = state.roles.iter().find(|r| r.id == added.id).unwrap();
        assert_eq!(updated.name, "Support Lead");
        assert_eq!(updated.permissions.len(), 2);

        store.remove_role(&added.id).unwrap();
        assert!(store.role(&added.id).is_none());
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let store = store();
        assert!(matches!(
            store.update_role("missing", draft("x")),
            Err(StoreError::NotFound { kind: "Role", .. })
        ));
        assert!(store.remove_member("missing").is_err());
        assert!(store.set_member_active("missing", false).is_err());
    }

    #[test]
    fn test_removing_role_leaves_members_referencing_it() {
        let store = store();
        store.add_member(member("Grace", "moderator"));
        store.remove_role("moderator").unwrap();
        assert_eq!(store.members_with_role("moderator").len(), 1);
    }

    #[test]
    fn test_member_lifecycle_and_filters() {
        let store = store();
        store.add_member(member("Grace", "moderator"));
        let state = store.add_member(member("Linus", "admin"));
        let linus = state.members.iter().find(|m| m.name == "Linus").unwrap().id.clone();

        store.set_member_active(&linus, false).unwrap();
        assert!(!store.members().iter().find(|m| m.id == linus).unwrap().is_active);

        assert_eq!(store.filter_members("grace", None).len(), 1);
        assert_eq!(store.filter_members("", Some("admin")).len(), 1);
        assert_eq!(store.filter_members("nobody", None).len(), 0);
        assert_eq!(store.filter_roles("moder").len(), 1);

        store.update_member(&linus, member("Linus T", "moderator")).unwrap();
        assert!(!store.members().iter().find(|m| m.id == linus).unwrap().is_active);

        let mut edit = member("Linus T", "moderator");
        edit.is_active = Some(true);
        store.update_member(&linus, edit).unwrap();
        assert_eq!(store.members_with_role("moderator").len(), 2);

        store.remove_member(&linus).unwrap();
        assert_eq!(store.members().len(), 1);
    }

    #[test]
    fn test_state_survives_reopen() {
        let persistence = Persistence::in_memory();
        RoleStore::open(persistence.clone()).add_role(draft("Auditor"));
        let reopened = RoleStore::open(persistence);
        assert!(reopened.roles().iter().any(|r| r.name == "Auditor"));
    }
}
