use async_trait::async_trait;
use database::{AuditInterceptor, Change, Write};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NoteError, NoteResult};
use crate::models::{Note, NoteFilter, NoteView};

/// Repository trait for Note persistence
///
/// Writes go through the audit interceptor; reads never return soft-deleted
/// notes. Views join the creator's full name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert(&self, note: Note) -> NoteResult<Note>;

    async fn update(&self, note: Note) -> NoteResult<Note>;

    /// Submit a delete; the interceptor turns it into `is_deleted = true`.
    async fn delete(&self, note: Note) -> NoteResult<()>;

    async fn get_by_id(&self, id: Uuid) -> NoteResult<Option<Note>>;

    async fn get_view(&self, id: Uuid) -> NoteResult<Option<NoteView>>;

    /// Oldest first
    async fn list(&self, filter: NoteFilter) -> NoteResult<Vec<NoteView>>;
}

/// In-memory implementation of NoteRepository (for development/testing)
///
/// Creator names are not joined from a user table; register them with
/// [`register_creator`](Self::register_creator).
#[derive(Debug, Clone, Default)]
pub struct InMemoryNoteRepository {
    notes: Arc<RwLock<HashMap<Uuid, Note>>>,
    creators: Arc<RwLock<HashMap<Uuid, String>>>,
    interceptor: AuditInterceptor,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interceptor(mut self, interceptor: AuditInterceptor) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub async fn register_creator(&self, user_id: Uuid, full_name: impl Into<String>) {
        self.creators.write().await.insert(user_id, full_name.into());
    }

    /// Stored state of a note, soft-deleted or not.
    pub async fn snapshot(&self, id: Uuid) -> Option<Note> {
        self.notes.read().await.get(&id).cloned()
    }

    async fn view(&self, note: &Note) -> NoteView {
        let creators = self.creators.read().await;
        let created_by = note
            .owner()
            .and_then(|owner| creators.get(&owner).cloned())
            .unwrap_or_default();
        NoteView::new(note, created_by)
    }

    fn apply(notes: &mut HashMap<Uuid, Note>, write: Write<Note>) -> Option<Note> {
        match write {
            Write::Insert(note) | Write::Update(note) => {
                notes.insert(note.id, note.clone());
                Some(note)
            }
            Write::Remove(note) => {
                notes.remove(&note.id);
                None
            }
        }
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn insert(&self, note: Note) -> NoteResult<Note> {
        let mut notes = self.notes.write().await;
        let write = self.interceptor.intercept(Change::Added(note));

        let inserted = Self::apply(&mut notes, write)
            .ok_or_else(|| NoteError::Internal("Insert was rewritten".to_string()))?;

        tracing::info!(note_id = %inserted.id, "Created note");
        Ok(inserted)
    }

    async fn update(&self, note: Note) -> NoteResult<Note> {
        let mut notes = self.notes.write().await;
        let original = notes
            .get(&note.id)
            .filter(|stored| !stored.audit.is_deleted)
            .cloned()
            .ok_or_else(|| NoteError::NotFound("This note does not exist.".to_string()))?;

        let write = self.interceptor.intercept(Change::Modified {
            original,
            current: note,
        });

        Self::apply(&mut notes, write)
            .ok_or_else(|| NoteError::Internal("Update was rewritten".to_string()))
    }

    async fn delete(&self, note: Note) -> NoteResult<()> {
        let mut notes = self.notes.write().await;
        if !notes.contains_key(&note.id) {
            return Err(NoteError::NotFound("Could not find note.".to_string()));
        }

        let note_id = note.id;
        let write = self.interceptor.intercept(Change::Deleted(note));
        Self::apply(&mut notes, write);

        tracing::info!(note_id = %note_id, "Deleted note");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> NoteResult<Option<Note>> {
        let notes = self.notes.read().await;
        Ok(notes.get(&id).filter(|n| !n.audit.is_deleted).cloned())
    }

    async fn get_view(&self, id: Uuid) -> NoteResult<Option<NoteView>> {
        let Some(note) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.view(&note).await))
    }

    async fn list(&self, filter: NoteFilter) -> NoteResult<Vec<NoteView>> {
        let mut matching: Vec<Note> = {
            let notes = self.notes.read().await;
            notes
                .values()
                .filter(|n| !n.audit.is_deleted)
                .filter(|n| filter.owner_id.is_none() || n.owner() == filter.owner_id)
                .cloned()
                .collect()
        };
        matching.sort_by(|a, b| a.audit.created_at.cmp(&b.audit.created_at));

        let mut views = Vec::with_capacity(matching.len());
        for note in &matching {
            views.push(self.view(note).await);
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateNote;

    fn note(owner: Uuid, title: &str) -> Note {
        Note::new(
            CreateNote {
                title: title.to_string(),
                description: "description".to_string(),
                tags: "tag".to_string(),
            },
            owner,
        )
    }

    #[tokio::test]
    async fn test_delete_keeps_row_flagged() {
        let repo = InMemoryNoteRepository::new();
        let inserted = repo.insert(note(Uuid::now_v7(), "Groceries")).await.unwrap();

        repo.delete(inserted.clone()).await.unwrap();

        assert!(repo.get_by_id(inserted.id).await.unwrap().is_none());
        assert!(repo.get_view(inserted.id).await.unwrap().is_none());
        assert!(repo.snapshot(inserted.id).await.unwrap().audit.is_deleted);
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_joins_creator() {
        let repo = InMemoryNoteRepository::new();
        let ada = Uuid::now_v7();
        let grace = Uuid::now_v7();
        repo.register_creator(ada, "Ada Lovelace").await;
        repo.insert(note(ada, "Groceries")).await.unwrap();
        repo.insert(note(grace, "Compiler")).await.unwrap();

        let views = repo.list(NoteFilter::owned_by(ada)).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].title, "Groceries");
        assert_eq!(views[0].created_by, "Ada Lovelace");
        assert_eq!(repo.list(NoteFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_of_deleted_note_is_not_found() {
        let repo = InMemoryNoteRepository::new();
        let inserted = repo.insert(note(Uuid::now_v7(), "Groceries")).await.unwrap();
        repo.delete(inserted.clone()).await.unwrap();

        let mut stale = inserted.clone();
        stale.title = "Groceries (edited)".to_string();
        let result = repo.update(stale).await;

        assert!(matches!(result, Err(NoteError::NotFound(_))));
        let stored = repo.snapshot(inserted.id).await.unwrap();
        assert!(stored.audit.is_deleted);
        assert_eq!(stored.title, "Groceries");
    }

    #[tokio::test]
    async fn test_update_restores_created_fields() {
        let repo = InMemoryNoteRepository::new();
        let owner = Uuid::now_v7();
        let inserted = repo.insert(note(owner, "Groceries")).await.unwrap();

        let mut tampered = inserted.clone();
        tampered.audit.created_by = Some(Uuid::now_v7());
        let updated = repo.update(tampered).await.unwrap();

        assert_eq!(updated.owner(), Some(owner));
        assert_eq!(updated.audit.created_at, inserted.audit.created_at);
    }
}
