use axum_helpers::Principal;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{NoteError, NoteResult};
use crate::models::{CreateNote, Note, NoteFilter, NoteView, UpdateNote};
use crate::repository::NoteRepository;

const COULD_NOT_CREATE: &str = "Could not create note.";
const COULD_NOT_UPDATE: &str = "Could not update note.";
const COULD_NOT_DELETE: &str = "Could not delete note.";

/// Service layer for note business logic
///
/// Every operation takes the caller as a [`Principal`]. Reads report a denial
/// as `None`; mutations report it as [`NoteError::Unauthorized`].
#[derive(Clone)]
pub struct NoteService<R: NoteRepository> {
    repository: Arc<R>,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Notes of `target`, or of everyone when `target` is `None`.
    ///
    /// Non-admins may only list their own notes; anything else is `None`.
    pub async fn list_notes(
        &self,
        principal: &Principal,
        target: Option<Uuid>,
    ) -> NoteResult<Option<Vec<NoteView>>> {
        let filter = match target {
            Some(owner_id) => NoteFilter::owned_by(owner_id),
            None => NoteFilter::default(),
        };

        let allowed = match target {
            Some(owner_id) => principal.can_access(Some(owner_id), false),
            None => principal.can_access(None, true),
        };
        if !allowed.is_allowed() {
            tracing::debug!(caller = %principal.user_id, target = ?target, "Note listing denied");
            return Ok(None);
        }

        let notes = self.repository.list(filter).await?;
        Ok(Some(notes))
    }

    /// `None` when the note does not exist, is deleted, or the caller may not view it.
    pub async fn get_note_by_id(
        &self,
        id: Uuid,
        principal: &Principal,
    ) -> NoteResult<Option<NoteView>> {
        let Some(view) = self.repository.get_view(id).await? else {
            return Ok(None);
        };

        if !principal.can_access(Some(view.created_by_id), false).is_allowed() {
            tracing::debug!(note_id = %id, caller = %principal.user_id, "Note view denied");
            return Ok(None);
        }

        Ok(Some(view))
    }

    pub async fn create_note(&self, input: CreateNote, principal: &Principal) -> NoteResult<Note> {
        input
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;

        let note = Note::new(input, principal.user_id);
        self.repository
            .insert(note)
            .await
            .map_err(|e| e.or_failed(COULD_NOT_CREATE))
    }

    pub async fn update_note(&self, input: UpdateNote, principal: &Principal) -> NoteResult<Note> {
        input
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;

        let mut note = self
            .repository
            .get_by_id(input.id)
            .await?
            .ok_or_else(|| NoteError::NotFound("This note does not exist.".to_string()))?;

        if !principal.can_access(note.owner(), false).is_allowed() {
            tracing::info!(note_id = %note.id, caller = %principal.user_id, "Note update denied");
            return Err(NoteError::Unauthorized);
        }

        note.apply_update(input);
        note.audit.touch(principal.user_id);

        let updated = self
            .repository
            .update(note)
            .await
            .map_err(|e| e.or_failed(COULD_NOT_UPDATE))?;

        tracing::info!(note_id = %updated.id, "Updated note");
        Ok(updated)
    }

    /// Soft-delete a note. Deleting it twice is `NotFound`.
    pub async fn delete_note(&self, id: Uuid, principal: &Principal) -> NoteResult<()> {
        let mut note = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| NoteError::NotFound("Could not find note.".to_string()))?;

        if !principal.can_access(note.owner(), false).is_allowed() {
            tracing::info!(note_id = %id, caller = %principal.user_id, "Note delete denied");
            return Err(NoteError::Unauthorized);
        }

        note.audit.touch(principal.user_id);
        self.repository
            .delete(note)
            .await
            .map_err(|e| e.or_failed(COULD_NOT_DELETE))
    }
}
