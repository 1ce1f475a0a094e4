//! The authenticated caller, derived from verified token claims.
//!
//! Handlers extract a [`Principal`] (any authenticated user) or an
//! [`AdminPrincipal`] (Admin role required) and pass it explicitly into the
//! services, which consult [`Principal::can_access`] for row-level checks.

use super::jwt::JwtClaims;
use super::policy::{ADMIN_ROLE, Access, can_access};
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Administrator role required")]
    AdminRequired,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => AppError::Unauthorized(err.to_string()),
            AuthError::AdminRequired => AppError::Forbidden(err.to_string()),
        }
    }
}

/// Id of the caller, or `Unauthenticated` when no verified claims are present.
pub fn current_user_id(claims: Option<&JwtClaims>) -> Result<Uuid, AuthError> {
    let claims = claims.ok_or(AuthError::Unauthenticated)?;
    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthenticated)
}

/// The caller's single effective role (`None` when no role is assigned).
pub fn current_user_role(claims: Option<&JwtClaims>) -> Result<Option<String>, AuthError> {
    let claims = claims.ok_or(AuthError::Unauthenticated)?;
    Ok(claims.roles.first().cloned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub role: Option<String>,
}

impl Principal {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Option<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Result<Self, AuthError> {
        Ok(Self {
            user_id: current_user_id(Some(claims))?,
            username: claims.username.clone(),
            role: current_user_role(Some(claims))?,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    pub fn can_access(&self, owner: Option<Uuid>, admin_only: bool) -> Access {
        can_access(self.user_id, self.role.as_deref(), owner, admin_only)
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<JwtClaims>();
        Ok(Principal::from_claims(claims.ok_or(AuthError::Unauthenticated)?)?)
    }
}

/// A [`Principal`] holding the Admin role. Other callers get 403.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            tracing::info!(user_id = %principal.user_id, "Admin route denied");
            return Err(AuthError::AdminRequired.into());
        }
        Ok(AdminPrincipal(principal))
    }
}
