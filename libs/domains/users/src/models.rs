use chrono::{DateTime, NaiveDate, Utc};
use database::{AuditFields, Auditable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A named role. The seeded set is `Admin` and `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
        }
    }
}

/// User entity. The email doubles as the login name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            first_name,
            last_name,
            email,
            password_hash,
            audit: AuditFields::new(created_by),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply the non-empty name/email fields of an update.
    pub fn apply_profile(
        &mut self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
    ) {
        if let Some(first_name) = first_name {
            self.first_name = first_name.to_string();
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name.to_string();
        }
        if let Some(email) = email {
            self.email = email.to_string();
        }
    }
}

impl Auditable for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

/// User read model with the user's single role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub created_on: NaiveDate,
    pub updated_on: Option<NaiveDate>,
    pub role_name: Option<String>,
    pub role_id: Option<Uuid>,
}

impl UserResponse {
    pub fn new(user: &User, role: Option<&Role>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            created_on: user.audit.created_at.date_naive(),
            updated_on: user.audit.updated_at.map(|at| at.date_naive()),
            role_name: role.map(|r| r.name.clone()),
            role_id: role.map(|r| r.id),
        }
    }
}

/// Form for creating a user from the admin surface
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(
        min = 1,
        max = 100,
        message = "The first name must contain between 1 and 100 characters."
    ))]
    pub first_name: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "The last name must contain between 1 and 100 characters."
    ))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "The password must contain at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(
        other = "password",
        message = "Password and Confirm Password must match."
    ))]
    pub confirm_password: String,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    pub role_id: Option<Uuid>,
}

/// Public self-registration body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(length(
        min = 1,
        max = 100,
        message = "The first name must contain between 1 and 100 characters."
    ))]
    pub first_name: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "The last name must contain between 1 and 100 characters."
    ))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    pub password: String,
}

/// A new password and its confirmation must both be absent or equal.
fn confirmation_matches(
    password: &Option<String>,
    confirm_password: &Option<String>,
) -> Result<(), ValidationError> {
    if password != confirm_password {
        return Err(ValidationError::new("must_match")
            .with_message("Password and Confirm Password must match.".into()));
    }
    Ok(())
}

fn validate_update_user(input: &UpdateUser) -> Result<(), ValidationError> {
    confirmation_matches(&input.password, &input.confirm_password)
}

fn validate_update_profile(input: &UpdateProfile) -> Result<(), ValidationError> {
    confirmation_matches(&input.password, &input.confirm_password)
}

/// Admin update of any user. Empty fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_user"))]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub id: Uuid,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(max = 100, message = "The first name cannot contain more than 100 characters."))]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(max = 100, message = "The last name field cannot contain more than 100 characters."))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    pub role_id: Option<Uuid>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    pub old_password: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(min = 8, message = "The password must contain at least 8 characters"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    pub confirm_password: Option<String>,
}

/// Self-service profile update; same as [`UpdateUser`] without the role.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_profile"))]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(max = 100, message = "The first name cannot contain more than 100 characters."))]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(max = 100, message = "The last name field cannot contain more than 100 characters."))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    pub old_password: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(min = 8, message = "The password must contain at least 8 characters"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// Outcome of a successful login: the user and the names of their roles.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_names() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            String::new(),
            None,
        );
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            "$argon2id$secret".to_string(),
            None,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_user_response_uses_camel_case_and_role() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            String::new(),
            None,
        );
        let role = Role::new("Admin");

        let json = serde_json::to_value(UserResponse::new(&user, Some(&role))).unwrap();

        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["roleName"], "Admin");
        assert_eq!(json["roleId"], role.id.to_string());
        assert!(json["updatedOn"].is_null());
    }

    #[test]
    fn test_update_user_treats_empty_fields_as_absent() {
        let id = Uuid::now_v7();
        let input: UpdateUser = serde_json::from_value(serde_json::json!({
            "id": id,
            "firstName": "",
            "lastName": "Byron",
            "roleId": "",
        }))
        .unwrap();

        assert_eq!(input.id, id);
        assert_eq!(input.first_name, None);
        assert_eq!(input.last_name.as_deref(), Some("Byron"));
        assert_eq!(input.role_id, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_confirm_password_must_match() {
        let input = UpdateProfile {
            id: Uuid::now_v7(),
            password: Some("Sup3r$ecret".to_string()),
            confirm_password: Some("different".to_string()),
            ..Default::default()
        };

        let errors = input.validate().unwrap_err();
        assert!(errors.to_string().contains("Password and Confirm Password must match."));
    }

    #[test]
    fn test_update_user_confirmation_must_match() {
        let input: UpdateUser = serde_json::from_value(serde_json::json!({
            "id": Uuid::now_v7(),
            "password": "Sup3r$ecret",
            "confirmPassword": "Sup3r$ecreT",
        }))
        .unwrap();

        let errors = input.validate().unwrap_err();
        assert!(errors.to_string().contains("Password and Confirm Password must match."));

        let missing = UpdateUser {
            password: Some("Sup3r$ecret".to_string()),
            ..Default::default()
        };
        assert!(missing.validate().is_err());

        let matching = UpdateUser {
            password: Some("Sup3r$ecret".to_string()),
            confirm_password: Some("Sup3r$ecret".to_string()),
            ..Default::default()
        };
        assert!(matching.validate().is_ok());
    }

    #[test]
    fn test_create_user_requires_confirmation() {
        let input: CreateUser = serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "Sup3r$ecret",
        }))
        .unwrap();

        assert!(input.validate().is_err());
    }
}
