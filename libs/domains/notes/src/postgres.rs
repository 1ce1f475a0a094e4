use async_trait::async_trait;
use database::{BaseRepository, Change};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    Statement, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{NoteError, NoteResult},
    models::{Note, NoteFilter, NoteView},
    repository::NoteRepository,
};

const VIEW_SELECT: &str = r#"
SELECT n.id, n.title, n.description, n.tags, n.created_by, n.created_at,
       COALESCE(u.first_name || ' ' || u.last_name, '') AS creator_name
FROM notes n
LEFT JOIN users u ON u.id = n.created_by
WHERE n.is_deleted = false"#;

/// Row of the note/creator join
#[derive(Debug, FromQueryResult)]
struct NoteViewRow {
    id: Uuid,
    title: String,
    description: String,
    tags: String,
    created_by: Option<Uuid>,
    created_at: DateTimeWithTimeZone,
    creator_name: String,
}

impl From<NoteViewRow> for NoteView {
    fn from(row: NoteViewRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            created_by_id: row.created_by.unwrap_or_default(),
            created: row.created_at.into(),
            created_by: row.creator_name,
        }
    }
}

/// Postgres note repository. Views join the `users` table for the creator name.
#[derive(Clone)]
pub struct PgNoteRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgNoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn commit_one(&self, change: Change<Note>) -> NoteResult<Option<Note>> {
        let written = self.base.commit(vec![change]).await.map_err(db_error)?;
        Ok(written.into_iter().next())
    }
}

fn db_error(e: DbErr) -> NoteError {
    NoteError::Internal(format!("Database error: {}", e))
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, note: Note) -> NoteResult<Note> {
        let created = self
            .commit_one(Change::Added(note))
            .await?
            .ok_or_else(|| NoteError::Internal("Insert was rewritten".to_string()))?;

        tracing::info!(note_id = %created.id, "Created note");
        Ok(created)
    }

    async fn update(&self, note: Note) -> NoteResult<Note> {
        let change = self
            .base
            .tracked(note)
            .await
            .map_err(db_error)?
            .ok_or_else(|| NoteError::NotFound("This note does not exist.".to_string()))?;
        if let Change::Modified { original, .. } = &change
            && original.audit.is_deleted
        {
            return Err(NoteError::NotFound("This note does not exist.".to_string()));
        }

        self.commit_one(change)
            .await?
            .ok_or_else(|| NoteError::Internal("Update was rewritten".to_string()))
    }

    async fn delete(&self, note: Note) -> NoteResult<()> {
        let note_id = note.id;
        self.commit_one(Change::Deleted(note)).await?;

        tracing::info!(note_id = %note_id, "Deleted note");
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> NoteResult<Option<Note>> {
        let model = entity::Entity::find_by_id(id)
            .filter(entity::Column::IsDeleted.eq(false))
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn get_view(&self, id: Uuid) -> NoteResult<Option<NoteView>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("{VIEW_SELECT} AND n.id = $1"),
            [id.into()],
        );

        let row = NoteViewRow::find_by_statement(stmt)
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: NoteFilter) -> NoteResult<Vec<NoteView>> {
        let stmt = match filter.owner_id {
            Some(owner_id) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!("{VIEW_SELECT} AND n.created_by = $1 ORDER BY n.created_at"),
                [owner_id.into()],
            ),
            None => Statement::from_string(
                DbBackend::Postgres,
                format!("{VIEW_SELECT} ORDER BY n.created_at"),
            ),
        };

        let rows = NoteViewRow::find_by_statement(stmt)
            .all(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
