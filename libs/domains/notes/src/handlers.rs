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

use crate::error::{NoteError, NoteResult};
use crate::models::{CreateNote, NoteView, UpdateNote};
use crate::repository::NoteRepository;
use crate::service::NoteService;

pub const TAG: &str = "note";

/// OpenAPI documentation for the notes API
#[derive(OpenApi)]
#[openapi(
    paths(list_notes, list_notes_for_user, get_note, create_note, update_note, delete_note),
    components(
        schemas(NoteView, CreateNote, UpdateNote),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            OperationFailedResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Note management endpoints"))
)]
pub struct ApiDoc;

/// Note routes, to be nested under `/note` behind the JWT middleware.
pub fn router<R: NoteRepository + 'static>(service: NoteService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/index", get(list_notes))
        .route("/notesforuser/{userId}", get(list_notes_for_user))
        .route("/create", post(create_note))
        .route("/update", post(update_note))
        .route("/delete/{id}", delete(delete_note))
        .route("/{id}", get(get_note))
        .with_state(shared_service)
}

fn audit_outcome<T>(result: &NoteResult<T>) -> AuditOutcome {
    match result {
        Ok(_) => AuditOutcome::Success,
        Err(NoteError::Unauthorized) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    }
}

/// List every live note
#[utoipa::path(
    get,
    path = "/index",
    tag = TAG,
    responses(
        (status = 200, description = "All live notes", body = Vec<NoteView>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_notes<R: NoteRepository>(
    State(service): State<Arc<NoteService<R>>>,
    AdminPrincipal(principal): AdminPrincipal,
) -> NoteResult<Json<Vec<NoteView>>> {
    service
        .list_notes(&principal, None)
        .await?
        .map(Json)
        .ok_or(NoteError::Unauthorized)
}

/// List the notes of one user
#[utoipa::path(
    get,
    path = "/notesforuser/{userId}",
    tag = TAG,
    params(("userId" = Uuid, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "Notes of the user", body = Vec<NoteView>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_notes_for_user<R: NoteRepository>(
    State(service): State<Arc<NoteService<R>>>,
    principal: Principal,
    UuidPath(user_id): UuidPath,
) -> NoteResult<Json<Vec<NoteView>>> {
    service
        .list_notes(&principal, Some(user_id))
        .await?
        .map(Json)
        .ok_or(NoteError::Unauthorized)
}

/// Get a note by ID
///
/// Unknown, deleted and foreign notes are all reported as 401.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note found", body = NoteView),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_note<R: NoteRepository>(
    State(service): State<Arc<NoteService<R>>>,
    principal: Principal,
    UuidPath(id): UuidPath,
) -> NoteResult<Json<NoteView>> {
    service
        .get_note_by_id(id, &principal)
        .await?
        .map(Json)
        .ok_or(NoteError::Unauthorized)
}

/// Create a note owned by the caller
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body(content = CreateNote, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Note created", body = NoteView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_note<R: NoteRepository>(
    State(service): State<Arc<NoteService<R>>>,
    principal: Principal,
    headers: HeaderMap,
    ValidatedForm(input): ValidatedForm<CreateNote>,
) -> NoteResult<impl IntoResponse> {
    let note = service.create_note(input, &principal).await?;

    AuditEvent::new(
        Some(principal.user_id),
        "note.create",
        Some(format!("note:{}", note.id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "title": note.title }))
    .log();

    let view = service
        .get_note_by_id(note.id, &principal)
        .await?
        .ok_or_else(|| NoteError::Internal(format!("Created note {} is not readable", note.id)))?;

    Ok(Json(view))
}

/// Update a note
#[utoipa::path(
    post,
    path = "/update",
    tag = TAG,
    request_body(content = UpdateNote, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Note updated"),
        (status = 400, response = OperationFailedResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_note<R: NoteRepository>(
    State(service): State<Arc<NoteService<R>>>,
    principal: Principal,
    headers: HeaderMap,
    ValidatedForm(input): ValidatedForm<UpdateNote>,
) -> NoteResult<impl IntoResponse> {
    let target = input.id;
    let result = service.update_note(input, &principal).await;

    AuditEvent::new(
        Some(principal.user_id),
        "note.update",
        Some(format!("note:{}", target)),
        audit_outcome(&result),
    )
    .with_request(&headers)
    .log();

    result?;
    Ok(StatusCode::OK)
}

/// Soft-delete a note
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted"),
        (status = 400, response = OperationFailedResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_note<R: NoteRepository>(
    State(service): State<Arc<NoteService<R>>>,
    principal: Principal,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> NoteResult<impl IntoResponse> {
    let result = service.delete_note(id, &principal).await;

    AuditEvent::new(
        Some(principal.user_id),
        "note.delete",
        Some(format!("note:{}", id)),
        audit_outcome(&result),
    )
    .with_request(&headers)
    .log();

    result?;
    Ok(StatusCode::OK)
}
