use axum_helpers::{ADMIN_ROLE, Principal};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::credentials::{hash_password, is_strong_password, verify_password};
use crate::error::{UserError, UserResult};
use crate::models::{
    AuthenticatedUser, CreateUser, LoginRequest, RegisterUser, Role, UpdateProfile, UpdateUser,
    User, UserResponse,
};
use crate::repository::IdentityStore;

const SOMETHING_WENT_WRONG: &str = "Something went wrong.";
const COULD_NOT_UPDATE_PROFILE: &str = "Could not update profile.";

/// Service layer for user accounts, roles and credentials.
///
/// The caller is always passed in explicitly as a [`Principal`]; see
/// `axum_helpers::auth::principal` for how it is derived from the token.
#[derive(Clone)]
pub struct UserService<S: IdentityStore> {
    store: Arc<S>,
    registration_role: Option<String>,
}

impl<S: IdentityStore> UserService<S> {
    /// Self-registered users get the `Admin` role unless configured otherwise.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            registration_role: Some(ADMIN_ROLE.to_string()),
        }
    }

    /// Role assigned on self-registration; `None` registers users without a role.
    pub fn with_registration_role(mut self, role: Option<String>) -> Self {
        self.registration_role = role;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All live users with their role.
    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.store.list().await?;

        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            let role = self.primary_role(user.id).await?;
            responses.push(UserResponse::new(&user, role.as_ref()));
        }
        Ok(responses)
    }

    /// `None` when the user does not exist or the caller may not view it.
    pub async fn get_user_details(
        &self,
        id: Uuid,
        principal: &Principal,
    ) -> UserResult<Option<UserResponse>> {
        let Some(user) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        if !principal.can_access(Some(user.id), false).is_allowed() {
            tracing::debug!(user_id = %id, caller = %principal.user_id, "User details denied");
            return Ok(None);
        }

        let role = self.primary_role(user.id).await?;
        Ok(Some(UserResponse::new(&user, role.as_ref())))
    }

    /// Create a user on behalf of `actor`, assigning `role_id` when it resolves.
    pub async fn create_user(
        &self,
        input: CreateUser,
        actor: &Principal,
    ) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let user = self
            .create_account(
                input.first_name,
                input.last_name,
                &input.email,
                &input.password,
                Some(actor.user_id),
            )
            .await?;

        let mut role = None;
        if let Some(role_id) = input.role_id {
            if let Some(found) = self.store.find_role(role_id).await? {
                self.store.add_to_role(user.id, found.id).await?;
                role = Some(found);
            }
        }

        Ok(UserResponse::new(&user, role.as_ref()))
    }

    /// Public registration. Assigns the configured registration role if it exists.
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let user = self
            .create_account(
                input.first_name,
                input.last_name,
                &input.email,
                &input.password,
                None,
            )
            .await?;

        let mut role = None;
        if let Some(name) = &self.registration_role {
            if let Some(found) = self.store.find_role_by_name(name).await? {
                self.store.add_to_role(user.id, found.id).await?;
                role = Some(found);
            }
        }

        Ok(UserResponse::new(&user, role.as_ref()))
    }

    /// Check credentials. Every rejection is `Unauthenticated` with its reason.
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthenticatedUser> {
        let email = normalize_email(&input.email);
        let user = self.store.find_by_email(&email).await?.ok_or_else(|| {
            UserError::Unauthenticated("An accound with this email address does not exist.".to_string())
        })?;

        if user.audit.is_deleted {
            return Err(UserError::Unauthenticated("User no longer exists.".to_string()));
        }
        if !user.audit.is_active {
            return Err(UserError::Unauthenticated("User is no longer active.".to_string()));
        }
        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::Unauthenticated("Incorrect password.".to_string()));
        }

        let roles = self
            .store
            .roles_of(user.id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();

        Ok(AuthenticatedUser { user, roles })
    }

    /// Admin update of any user, including role change and password rotation.
    pub async fn update_user(&self, input: UpdateUser, principal: &Principal) -> UserResult<()> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        if !principal.can_access(None, true).is_allowed() {
            return Err(UserError::Unauthorized);
        }

        let user = self
            .store
            .find_by_id(input.id)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;

        let user = self
            .save_profile(
                user,
                input.first_name.as_deref(),
                input.last_name.as_deref(),
                input.email.as_deref(),
                principal,
            )
            .await?;

        if let Some(role_id) = input.role_id {
            self.change_role(user.id, role_id).await?;
        }

        if let (Some(old), Some(new)) = (input.old_password.as_deref(), input.password.as_deref()) {
            self.rotate_password(user, old, new, principal).await?;
        }

        tracing::info!(user_id = %input.id, "Updated user");
        Ok(())
    }

    /// Self-service update; only the user themselves or an Admin may call it.
    pub async fn update_profile(
        &self,
        input: UpdateProfile,
        principal: &Principal,
    ) -> UserResult<()> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let user = self
            .store
            .find_by_id(input.id)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;

        if !principal.can_access(Some(user.id), false).is_allowed() {
            tracing::info!(user_id = %input.id, caller = %principal.user_id, "Profile update denied");
            return Err(UserError::Unauthorized);
        }

        let user = self
            .save_profile(
                user,
                input.first_name.as_deref(),
                input.last_name.as_deref(),
                input.email.as_deref(),
                principal,
            )
            .await?;

        if let (Some(old), Some(new)) = (input.old_password.as_deref(), input.password.as_deref()) {
            self.rotate_password(user, old, new, principal).await?;
        }

        tracing::info!(user_id = %input.id, "Updated profile");
        Ok(())
    }

    /// Soft-delete a user. Admin only.
    pub async fn delete_user(&self, id: Uuid, principal: &Principal) -> UserResult<()> {
        if !principal.can_access(None, true).is_allowed() {
            return Err(UserError::Unauthorized);
        }

        let mut user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound("Could not find user.".to_string()))?;

        user.audit.touch(principal.user_id);
        self.store
            .delete(user)
            .await
            .map_err(|e| e.or_failed(SOMETHING_WENT_WRONG))
    }

    async fn create_account(
        &self,
        first_name: String,
        last_name: String,
        email: &str,
        password: &str,
        created_by: Option<Uuid>,
    ) -> UserResult<User> {
        let email = normalize_email(email);

        if self.store.email_taken(&email, None).await? {
            return Err(UserError::EmailTaken);
        }
        if !is_strong_password(password) {
            return Err(UserError::WeakPassword);
        }

        let user = User::new(
            first_name,
            last_name,
            email,
            hash_password(password)?,
            created_by,
        );

        self.store.create(user).await
    }

    async fn save_profile(
        &self,
        mut user: User,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        principal: &Principal,
    ) -> UserResult<User> {
        let email = email.map(normalize_email);

        if let Some(email) = &email {
            if self.store.email_taken(email, Some(user.id)).await? {
                return Err(UserError::DuplicateEmail);
            }
        }

        user.apply_profile(first_name, last_name, email.as_deref());
        user.audit.touch(principal.user_id);

        self.store
            .update(user)
            .await
            .map_err(|e| e.or_failed(COULD_NOT_UPDATE_PROFILE))
    }

    /// Replace every role assignment with `role_id`, unless it is already held.
    async fn change_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()> {
        let role = self
            .store
            .find_role(role_id)
            .await?
            .ok_or(UserError::RoleAssignment)?;

        let current = self.store.roles_of(user_id).await?;
        if current.iter().any(|r| r.id == role.id) {
            return Ok(());
        }

        self.store
            .remove_from_all_roles(user_id)
            .await
            .map_err(|e| e.or_failed(SOMETHING_WENT_WRONG))?;

        self.store.add_to_role(user_id, role.id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Role assignment failed");
            UserError::RoleAssignment
        })?;

        tracing::info!(user_id = %user_id, role = %role.name, "Changed user role");
        Ok(())
    }

    async fn rotate_password(
        &self,
        mut user: User,
        old_password: &str,
        new_password: &str,
        principal: &Principal,
    ) -> UserResult<()> {
        if !verify_password(old_password, &user.password_hash)?
            || !is_strong_password(new_password)
        {
            return Err(UserError::PasswordChangeRejected);
        }

        user.password_hash = hash_password(new_password)?;
        user.audit.touch(principal.user_id);

        self.store
            .update(user)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %principal.user_id, error = %e, "Password change failed");
                UserError::PasswordChangeRejected
            })?;
        Ok(())
    }

    async fn primary_role(&self, user_id: Uuid) -> UserResult<Option<Role>> {
        Ok(self.store.roles_of(user_id).await?.into_iter().next())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryIdentityStore, MockIdentityStore};

    const PASSWORD: &str = "Sup3r$ecret";

    fn registration(email: &str) -> RegisterUser {
        RegisterUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
        }
    }

    fn principal_of(user: &UserResponse) -> Principal {
        Principal::new(user.id, user.email.clone(), user.role_name.clone())
    }

    fn admin() -> Principal {
        Principal::new(Uuid::now_v7(), "root@example.com", Some("Admin".to_string()))
    }

    async fn member_service() -> UserService<InMemoryIdentityStore> {
        UserService::new(InMemoryIdentityStore::new()).with_registration_role(Some("User".to_string()))
    }

    #[tokio::test]
    async fn test_register_assigns_admin_by_default() {
        let service = UserService::new(InMemoryIdentityStore::new());

        let user = service.register(registration("ada@example.com")).await.unwrap();

        assert_eq!(user.role_name.as_deref(), Some("Admin"));
        assert_eq!(user.full_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_register_without_registration_role() {
        let service = UserService::new(InMemoryIdentityStore::new()).with_registration_role(None);

        let user = service.register(registration("ada@example.com")).await.unwrap();

        assert_eq!(user.role_name, None);
        assert_eq!(user.role_id, None);
    }

    #[tokio::test]
    async fn test_register_twice_with_same_email_fails() {
        let service = member_service().await;
        service.register(registration("ada@example.com")).await.unwrap();

        let err = service
            .register(registration("ADA@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Email address is taken.");
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let service = member_service().await;
        let mut input = registration("ada@example.com");
        input.password = "password".to_string();

        let err = service.register(input).await.unwrap_err();

        assert!(matches!(err, UserError::WeakPassword));
        assert!(service.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_records_creator_and_role() {
        let service = member_service().await;
        let actor = admin();
        let user_role = service.store().find_role_by_name("User").await.unwrap().unwrap();

        let created = service
            .create_user(
                CreateUser {
                    first_name: "Grace".to_string(),
                    last_name: "Hopper".to_string(),
                    email: "grace@example.com".to_string(),
                    password: PASSWORD.to_string(),
                    confirm_password: PASSWORD.to_string(),
                    role_id: Some(user_role.id),
                },
                &actor,
            )
            .await
            .unwrap();

        assert_eq!(created.role_id, Some(user_role.id));
        let stored = service.store().snapshot(created.id).await.unwrap();
        assert_eq!(stored.audit.created_by, Some(actor.user_id));
    }

    #[tokio::test]
    async fn test_login_reports_each_rejection() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();

        let missing = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), "An accound with this email address does not exist.");

        let wrong = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "Wr0ng$password".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), "Incorrect password.");

        let mut inactive = service.store().snapshot(ada.id).await.unwrap();
        inactive.audit.is_active = false;
        service.store().update(inactive.clone()).await.unwrap();
        let err = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User is no longer active.");

        service.store().delete(inactive).await.unwrap();
        let err = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User no longer exists.");
        assert!(matches!(err, UserError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_login_returns_role_names() {
        let service = member_service().await;
        service.register(registration("ada@example.com")).await.unwrap();

        let authenticated = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(authenticated.user.email, "ada@example.com");
        assert_eq!(authenticated.roles, vec!["User".to_string()]);
    }

    #[tokio::test]
    async fn test_login_trims_and_lowercases_email() {
        let service = member_service().await;
        service.register(registration("ada@example.com")).await.unwrap();

        let authenticated = service
            .login(LoginRequest {
                email: "  Ada@Example.com ".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(authenticated.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_role_change_leaves_exactly_one_role() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        let admin_role = service.store().find_role_by_name("Admin").await.unwrap().unwrap();

        service
            .update_user(
                UpdateUser {
                    id: ada.id,
                    role_id: Some(admin_role.id),
                    ..Default::default()
                },
                &admin(),
            )
            .await
            .unwrap();

        let roles = service.store().roles_of(ada.id).await.unwrap();
        assert_eq!(roles, vec![admin_role]);
    }

    #[tokio::test]
    async fn test_update_user_applies_only_given_fields() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        let actor = admin();

        service
            .update_user(
                UpdateUser {
                    id: ada.id,
                    last_name: Some("Byron".to_string()),
                    ..Default::default()
                },
                &actor,
            )
            .await
            .unwrap();

        let stored = service.store().snapshot(ada.id).await.unwrap();
        assert_eq!(stored.first_name, "Ada");
        assert_eq!(stored.last_name, "Byron");
        assert_eq!(stored.audit.updated_by, Some(actor.user_id));
        assert!(stored.audit.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_user_rejects_duplicate_email() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        service.register(registration("grace@example.com")).await.unwrap();

        let err = service
            .update_user(
                UpdateUser {
                    id: ada.id,
                    email: Some("grace@example.com".to_string()),
                    ..Default::default()
                },
                &admin(),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Another user with the same email address already exists"
        );
    }

    #[tokio::test]
    async fn test_update_user_of_missing_user() {
        let service = member_service().await;

        let err = service
            .update_user(
                UpdateUser {
                    id: Uuid::now_v7(),
                    ..Default::default()
                },
                &admin(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User not found.");
    }

    #[tokio::test]
    async fn test_update_profile_of_someone_else_is_unauthorized() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        let grace = service.register(registration("grace@example.com")).await.unwrap();

        let err = service
            .update_profile(
                UpdateProfile {
                    id: ada.id,
                    first_name: Some("Mallory".to_string()),
                    ..Default::default()
                },
                &principal_of(&grace),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Unauthorized));
        let stored = service.store().snapshot(ada.id).await.unwrap();
        assert_eq!(stored.first_name, "Ada");
        assert_eq!(stored.audit.updated_at, None);
    }

    #[tokio::test]
    async fn test_update_profile_rotates_password() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        let new_password = "N3w$ecret!";

        service
            .update_profile(
                UpdateProfile {
                    id: ada.id,
                    old_password: Some(PASSWORD.to_string()),
                    password: Some(new_password.to_string()),
                    confirm_password: Some(new_password.to_string()),
                    ..Default::default()
                },
                &principal_of(&ada),
            )
            .await
            .unwrap();

        let login = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: new_password.to_string(),
            })
            .await;
        assert!(login.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_wrong_old_password() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();

        let err = service
            .update_profile(
                UpdateProfile {
                    id: ada.id,
                    old_password: Some("Wr0ng$password".to_string()),
                    password: Some("N3w$ecret!".to_string()),
                    confirm_password: Some("N3w$ecret!".to_string()),
                    ..Default::default()
                },
                &principal_of(&ada),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::PasswordChangeRejected));
    }

    #[tokio::test]
    async fn test_password_store_failure_is_rejected_change() {
        let ada = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            hash_password(PASSWORD).unwrap(),
            None,
        );
        let ada_id = ada.id;
        let stored_hash = ada.password_hash.clone();

        let mut mock_store = MockIdentityStore::new();
        mock_store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(ada.clone())));
        mock_store
            .expect_update()
            .withf(move |user| user.password_hash == stored_hash)
            .times(1)
            .returning(Ok);
        mock_store
            .expect_update()
            .times(1)
            .returning(|_| Err(UserError::Internal("Database error: connection reset".to_string())));

        let service = UserService::new(mock_store);
        let caller = Principal::new(ada_id, "ada@example.com", Some("User".to_string()));
        let err = service
            .update_profile(
                UpdateProfile {
                    id: ada_id,
                    old_password: Some(PASSWORD.to_string()),
                    password: Some("N3w$ecret!".to_string()),
                    confirm_password: Some("N3w$ecret!".to_string()),
                    ..Default::default()
                },
                &caller,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::PasswordChangeRejected));
    }

    #[tokio::test]
    async fn test_delete_user_requires_admin() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();

        let err = service
            .delete_user(ada.id, &principal_of(&ada))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Unauthorized));
        assert!(service.store().find_by_id(ada.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_user_is_soft_and_not_repeatable() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        let actor = admin();

        service.delete_user(ada.id, &actor).await.unwrap();

        let stored = service.store().snapshot(ada.id).await.unwrap();
        assert!(stored.audit.is_deleted);
        assert!(service.list_users().await.unwrap().is_empty());

        let err = service.delete_user(ada.id, &actor).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find user.");
    }

    #[tokio::test]
    async fn test_user_details_visibility() {
        let service = member_service().await;
        let ada = service.register(registration("ada@example.com")).await.unwrap();
        let grace = service.register(registration("grace@example.com")).await.unwrap();

        assert!(service.get_user_details(ada.id, &principal_of(&ada)).await.unwrap().is_some());
        assert!(service.get_user_details(ada.id, &principal_of(&grace)).await.unwrap().is_none());
        assert!(service.get_user_details(ada.id, &admin()).await.unwrap().is_some());
        assert!(service.get_user_details(Uuid::now_v7(), &admin()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_store_failure_is_generic() {
        let mut mock_store = MockIdentityStore::new();
        mock_store
            .expect_list()
            .returning(|| Err(UserError::Internal("Database error: connection reset".to_string())));

        let service = UserService::new(mock_store);
        let err = service.list_users().await.unwrap_err();

        assert_eq!(err.to_string(), "Something went wrong.");
    }

    #[tokio::test]
    async fn test_details_of_missing_user_skips_role_lookup() {
        let mut mock_store = MockIdentityStore::new();
        let id = Uuid::now_v7();
        mock_store
            .expect_find_by_id()
            .with(mockall::predicate::eq(id))
            .returning(|_| Ok(None));
        mock_store.expect_roles_of().never();

        let service = UserService::new(mock_store);
        let details = service.get_user_details(id, &admin()).await.unwrap();

        assert!(details.is_none());
    }
}
