//! Public `/authentication` routes: self-registration and token login.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, JwtAuth, ValidatedJson,
    errors::responses::{BadRequestValidationResponse, OperationFailedResponse, UnauthorizedResponse},
};
use serde_json::json;
use utoipa::OpenApi;

use crate::error::UserError;
use crate::models::{LoginRequest, LoginResponse, RegisterUser, UserResponse};
use crate::repository::IdentityStore;
use crate::service::UserService;

pub const TAG: &str = "authentication";

#[derive(OpenApi)]
#[openapi(
    paths(register, login),
    components(
        schemas(RegisterUser, LoginRequest, LoginResponse),
        responses(BadRequestValidationResponse, OperationFailedResponse, UnauthorizedResponse)
    ),
    tags((name = TAG, description = "Registration and login"))
)]
pub struct AuthApiDoc;

/// State for the authentication handlers
#[derive(Clone)]
pub struct AuthState<S: IdentityStore> {
    pub service: UserService<S>,
    pub jwt_auth: JwtAuth,
}

/// Authentication routes, to be nested under `/authentication` without auth.
pub fn router<S: IdentityStore + Clone + 'static>(state: AuthState<S>) -> Router {
    Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
        .with_state(state)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 400, response = OperationFailedResponse)
    )
)]
async fn register<S: IdentityStore + Clone>(
    State(state): State<AuthState<S>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> Result<impl IntoResponse, UserError> {
    let email = input.email.clone();

    let user = match state.service.register(input).await {
        Ok(user) => user,
        Err(e) => {
            AuditEvent::new(None, "user.register", None, AuditOutcome::Failure)
                .with_request(&headers)
                .with_details(json!({ "email": email, "reason": e.to_string() }))
                .log();
            return Err(e);
        }
    };

    AuditEvent::new(
        Some(user.id),
        "user.register",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "role": user.role_name }))
    .log();

    Ok(Json(user))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn login<S: IdentityStore + Clone>(
    State(state): State<AuthState<S>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, UserError> {
    let email = input.email.clone();

    let authenticated = match state.service.login(input).await {
        Ok(authenticated) => authenticated,
        Err(e) => {
            AuditEvent::new(None, "user.login", None, AuditOutcome::Failure)
                .with_request(&headers)
                .with_details(json!({ "email": email, "reason": e.to_string() }))
                .log();
            return Err(e);
        }
    };

    let user = &authenticated.user;
    let issued = state
        .jwt_auth
        .create_token(user.id, &user.email, &authenticated.roles)
        .map_err(|e| UserError::Internal(format!("Failed to create token: {}", e)))?;

    AuditEvent::new(
        Some(user.id),
        "user.login",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "roles": authenticated.roles }))
    .log();

    Ok(Json(LoginResponse {
        token: issued.token,
        expiration: issued.expiration,
    }))
}
