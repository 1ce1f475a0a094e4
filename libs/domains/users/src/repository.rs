use async_trait::async_trait;
use database::{AuditInterceptor, Change, Write};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};

/// Persistence of users, roles and role membership.
///
/// Every user write goes through the audit interceptor, so `delete` only ever
/// flips `is_deleted`. Lookups other than [`find_by_email`](Self::find_by_email)
/// skip soft-deleted users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create(&self, user: User) -> UserResult<User>;

    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, user: User) -> UserResult<()>;

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Case-insensitive; returns a soft-deleted user only when no live user
    /// holds the address.
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn list(&self) -> UserResult<Vec<User>>;

    /// Whether a live user other than `exclude` holds `email`.
    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool>;

    async fn roles_of(&self, user_id: Uuid) -> UserResult<Vec<Role>>;

    async fn find_role(&self, id: Uuid) -> UserResult<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> UserResult<Option<Role>>;

    /// Fails with `RoleAlreadyAssigned` when the user already holds a role.
    async fn add_to_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()>;

    async fn remove_from_all_roles(&self, user_id: Uuid) -> UserResult<()>;
}

#[derive(Debug, Default)]
struct Identities {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, Role>,
    memberships: HashMap<Uuid, Vec<Uuid>>,
}

/// In-memory implementation of IdentityStore (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryIdentityStore {
    inner: Arc<RwLock<Identities>>,
    interceptor: AuditInterceptor,
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityStore {
    /// Store seeded with the `Admin` and `User` roles.
    pub fn new() -> Self {
        Self::with_roles(vec![Role::new("Admin"), Role::new("User")])
    }

    pub fn with_roles(roles: Vec<Role>) -> Self {
        let identities = Identities {
            roles: roles.into_iter().map(|r| (r.id, r)).collect(),
            ..Default::default()
        };

        Self {
            inner: Arc::new(RwLock::new(identities)),
            interceptor: AuditInterceptor::default(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: AuditInterceptor) -> Self {
        self.interceptor = interceptor;
        self
    }

    /// Stored state of a user, soft-deleted or not.
    pub async fn snapshot(&self, id: Uuid) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    fn apply(identities: &mut Identities, write: Write<User>) -> Option<User> {
        match write {
            Write::Insert(user) | Write::Update(user) => {
                identities.users.insert(user.id, user.clone());
                Some(user)
            }
            Write::Remove(user) => {
                identities.users.remove(&user.id);
                identities.memberships.remove(&user.id);
                None
            }
        }
    }
}

fn live(user: &User) -> bool {
    !user.audit.is_deleted
}

fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut inner = self.inner.write().await;
        let write = self.interceptor.intercept(Change::Added(user));

        let created = Self::apply(&mut inner, write)
            .ok_or_else(|| UserError::Internal("Insert was rewritten".to_string()))?;

        tracing::info!(user_id = %created.id, "Created user");
        Ok(created)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut inner = self.inner.write().await;
        let original = inner
            .users
            .get(&user.id)
            .cloned()
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;

        let write = self.interceptor.intercept(Change::Modified {
            original,
            current: user,
        });

        Self::apply(&mut inner, write)
            .ok_or_else(|| UserError::Internal("Update was rewritten".to_string()))
    }

    async fn delete(&self, user: User) -> UserResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            return Err(UserError::NotFound("Could not find user.".to_string()));
        }

        let user_id = user.id;
        let write = self.interceptor.intercept(Change::Deleted(user));
        Self::apply(&mut inner, write);

        tracing::info!(user_id = %user_id, "Deleted user");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).filter(|u| live(u)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| same_email(&u.email, email))
            .min_by_key(|u| u.audit.is_deleted)
            .cloned())
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().filter(|u| live(u)).cloned().collect();
        users.sort_by(|a, b| a.audit.created_at.cmp(&b.audit.created_at));
        Ok(users)
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|u| live(u) && same_email(&u.email, email) && Some(u.id) != exclude))
    }

    async fn roles_of(&self, user_id: Uuid) -> UserResult<Vec<Role>> {
        let inner = self.inner.read().await;
        let role_ids = inner.memberships.get(&user_id).cloned().unwrap_or_default();
        Ok(role_ids
            .iter()
            .filter_map(|id| inner.roles.get(id).cloned())
            .collect())
    }

    async fn find_role(&self, id: Uuid) -> UserResult<Option<Role>> {
        let inner = self.inner.read().await;
        Ok(inner.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> UserResult<Option<Role>> {
        let inner = self.inner.read().await;
        Ok(inner.roles.values().find(|r| r.name == name).cloned())
    }

    async fn add_to_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.roles.contains_key(&role_id) {
            return Err(UserError::RoleAssignment);
        }

        let memberships = inner.memberships.entry(user_id).or_default();
        if !memberships.is_empty() {
            return Err(UserError::RoleAlreadyAssigned);
        }
        memberships.push(role_id);

        tracing::debug!(user_id = %user_id, role_id = %role_id, "Added user to role");
        Ok(())
    }

    async fn remove_from_all_roles(&self, user_id: Uuid) -> UserResult<()> {
        let mut inner = self.inner.write().await;
        inner.memberships.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            email.to_string(),
            String::new(),
            None,
        )
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let store = InMemoryIdentityStore::new();
        let created = store.create(user("ada@example.com")).await.unwrap();

        store.delete(created.clone()).await.unwrap();

        assert!(store.find_by_id(created.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
        let stored = store.snapshot(created.id).await.unwrap();
        assert!(stored.audit.is_deleted);
    }

    #[tokio::test]
    async fn test_update_cannot_rewrite_created_fields() {
        let store = InMemoryIdentityStore::new();
        let created = store.create(user("ada@example.com")).await.unwrap();

        let mut tampered = created.clone();
        tampered.audit.created_by = Some(Uuid::now_v7());
        tampered.first_name = "Augusta".to_string();
        let updated = store.update(tampered).await.unwrap();

        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.audit.created_by, None);
        assert_eq!(updated.audit.created_at, created.audit.created_at);
    }

    #[tokio::test]
    async fn test_find_by_email_prefers_live_user() {
        let store = InMemoryIdentityStore::new();
        let gone = store.create(user("ada@example.com")).await.unwrap();
        store.delete(gone).await.unwrap();
        let live = store.create(user("ADA@example.com")).await.unwrap();

        let found = store.find_by_email("ada@example.com").await.unwrap().unwrap();

        assert_eq!(found.id, live.id);
    }

    #[tokio::test]
    async fn test_email_taken_ignores_deleted_and_excluded() {
        let store = InMemoryIdentityStore::new();
        let ada = store.create(user("ada@example.com")).await.unwrap();

        assert!(store.email_taken("Ada@Example.com", None).await.unwrap());
        assert!(!store.email_taken("ada@example.com", Some(ada.id)).await.unwrap());

        store.delete(ada).await.unwrap();
        assert!(!store.email_taken("ada@example.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_role_is_rejected() {
        let store = InMemoryIdentityStore::new();
        let ada = store.create(user("ada@example.com")).await.unwrap();
        let admin = store.find_role_by_name("Admin").await.unwrap().unwrap();
        let member = store.find_role_by_name("User").await.unwrap().unwrap();

        store.add_to_role(ada.id, member.id).await.unwrap();
        let second = store.add_to_role(ada.id, admin.id).await;

        assert!(matches!(second, Err(UserError::RoleAlreadyAssigned)));
        assert_eq!(store.roles_of(ada.id).await.unwrap(), vec![member]);
    }

    #[tokio::test]
    async fn test_remove_from_all_roles_clears_membership() {
        let store = InMemoryIdentityStore::new();
        let ada = store.create(user("ada@example.com")).await.unwrap();
        let admin = store.find_role_by_name("Admin").await.unwrap().unwrap();
        store.add_to_role(ada.id, admin.id).await.unwrap();

        store.remove_from_all_roles(ada.id).await.unwrap();

        assert!(store.roles_of(ada.id).await.unwrap().is_empty());
    }
}
