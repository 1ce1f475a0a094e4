use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_helpers::{
    AdminPrincipal, AuditEvent, AuditOutcome, Principal, UuidPath, ValidatedForm,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, OperationFailedResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateProfile, UpdateUser, UserResponse};
use crate::repository::IdentityStore;
use crate::service::UserService;

pub const TAG: &str = "user";

/// OpenAPI documentation for the user management API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, get_user, create_user, update_user, update_profile, delete_user),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, UpdateProfile),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            OperationFailedResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "User management endpoints"))
)]
pub struct ApiDoc;

/// User management routes, to be nested under `/user` behind the JWT middleware.
pub fn router<S: IdentityStore + 'static>(service: UserService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/index", get(list_users))
        .route("/create", post(create_user))
        .route("/update", post(update_user))
        .route("/updateprofile", post(update_profile))
        .route("/delete/{id}", delete(delete_user))
        .route("/{id}", get(get_user))
        .with_state(shared_service)
}

/// List all users
#[utoipa::path(
    get,
    path = "/index",
    tag = TAG,
    responses(
        (status = 200, description = "All live users", body = Vec<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 400, response = OperationFailedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_users<S: IdentityStore>(
    State(service): State<Arc<UserService<S>>>,
    _admin: AdminPrincipal,
) -> UserResult<Json<Vec<UserResponse>>> {
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// Get details of a user
///
/// Visible to the user themselves and to admins. Anything else, including an
/// unknown id, is reported as 401.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_user<S: IdentityStore>(
    State(service): State<Arc<UserService<S>>>,
    principal: Principal,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    service
        .get_user_details(id, &principal)
        .await?
        .map(Json)
        .ok_or(UserError::Unauthorized)
}

/// Create a user
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body(content = CreateUser, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, response = OperationFailedResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_user<S: IdentityStore>(
    State(service): State<Arc<UserService<S>>>,
    AdminPrincipal(principal): AdminPrincipal,
    headers: HeaderMap,
    ValidatedForm(input): ValidatedForm<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input, &principal).await?;

    AuditEvent::new(
        Some(principal.user_id),
        "user.create",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "role": user.role_name }))
    .log();

    Ok(Json(user))
}

/// Update any user (admin)
#[utoipa::path(
    post,
    path = "/update",
    tag = TAG,
    request_body(content = UpdateUser, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User updated"),
        (status = 400, response = OperationFailedResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_user<S: IdentityStore>(
    State(service): State<Arc<UserService<S>>>,
    AdminPrincipal(principal): AdminPrincipal,
    headers: HeaderMap,
    ValidatedForm(input): ValidatedForm<UpdateUser>,
) -> UserResult<impl IntoResponse> {
    let target = input.id;
    let role_change = input.role_id;
    service.update_user(input, &principal).await?;

    AuditEvent::new(
        Some(principal.user_id),
        "user.update",
        Some(format!("user:{}", target)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "role_id": role_change }))
    .log();

    Ok(StatusCode::OK)
}

/// Update one's own profile
#[utoipa::path(
    post,
    path = "/updateprofile",
    tag = TAG,
    request_body(content = UpdateProfile, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, response = OperationFailedResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_profile<S: IdentityStore>(
    State(service): State<Arc<UserService<S>>>,
    principal: Principal,
    headers: HeaderMap,
    ValidatedForm(input): ValidatedForm<UpdateProfile>,
) -> UserResult<impl IntoResponse> {
    let target = input.id;
    let result = service.update_profile(input, &principal).await;

    let outcome = match &result {
        Ok(()) => AuditOutcome::Success,
        Err(UserError::Unauthorized) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new(
        Some(principal.user_id),
        "user.update_profile",
        Some(format!("user:{}", target)),
        outcome,
    )
    .with_request(&headers)
    .log();

    result?;
    Ok(StatusCode::OK)
}

/// Soft-delete a user
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, response = OperationFailedResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_user<S: IdentityStore>(
    State(service): State<Arc<UserService<S>>>,
    AdminPrincipal(principal): AdminPrincipal,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    service.delete_user(id, &principal).await?;

    AuditEvent::new(
        Some(principal.user_id),
        "user.delete",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .log();

    Ok(StatusCode::OK)
}
