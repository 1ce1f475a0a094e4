use chrono::{DateTime, Utc};
use database::{AuditFields, Auditable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Note entity. The owner is the user recorded in `audit.created_by`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Note {
    pub fn new(input: CreateNote, owner: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            tags: input.tags,
            audit: AuditFields::new(Some(owner)),
        }
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.audit.created_by
    }

    /// Apply the present fields of an update.
    pub fn apply_update(&mut self, update: UpdateNote) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
    }
}

impl Auditable for Note {
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

/// Note read model with the creator's full name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub created_by_id: Uuid,
    pub created: DateTime<Utc>,
    pub created_by: String,
}

impl NoteView {
    pub fn new(note: &Note, created_by: impl Into<String>) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            description: note.description.clone(),
            tags: note.tags.clone(),
            created_by_id: note.owner().unwrap_or_default(),
            created: note.audit.created_at,
            created_by: created_by.into(),
        }
    }
}

/// Form for creating a note
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Please enter the title of the note (at most 100 characters)"
    ))]
    pub title: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Please enter the description of the note (at most 2000 characters)"
    ))]
    pub description: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Please enter the tags for the note (at most 100 characters)"
    ))]
    pub tags: String,
}

/// Form for updating a note. Empty fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    pub id: Uuid,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(
        max = 100,
        message = "The title of the note cannot contain more than 100 characters"
    ))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(
        max = 2000,
        message = "The description of the note cannot contain more than 2000 characters"
    ))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "axum_helpers::empty_string_as_none")]
    #[validate(length(
        max = 100,
        message = "The tags of the note cannot contain more than 100 characters"
    ))]
    pub tags: Option<String>,
}

/// Query filter for note listings. Soft-deleted notes are never returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub owner_id: Option<Uuid>,
}

impl NoteFilter {
    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groceries() -> CreateNote {
        CreateNote {
            title: "Groceries".to_string(),
            description: "Milk, eggs".to_string(),
            tags: "home".to_string(),
        }
    }

    #[test]
    fn test_new_note_is_owned_by_creator() {
        let owner = Uuid::now_v7();
        let note = Note::new(groceries(), owner);

        assert_eq!(note.owner(), Some(owner));
        assert!(note.audit.is_active);
        assert!(!note.audit.is_deleted);
    }

    #[test]
    fn test_apply_update_keeps_absent_fields() {
        let mut note = Note::new(groceries(), Uuid::now_v7());

        note.apply_update(UpdateNote {
            id: note.id,
            description: Some("Milk, eggs, bread".to_string()),
            ..Default::default()
        });

        assert_eq!(note.title, "Groceries");
        assert_eq!(note.description, "Milk, eggs, bread");
        assert_eq!(note.tags, "home");
    }

    #[test]
    fn test_create_note_limits() {
        let mut input = groceries();
        assert!(input.validate().is_ok());

        input.title = "x".repeat(101);
        assert!(input.validate().is_err());

        let mut input = groceries();
        input.tags = String::new();
        assert!(input.validate().is_err());

        let mut input = groceries();
        input.description = "x".repeat(2001);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_note_view_is_camel_case() {
        let note = Note::new(groceries(), Uuid::now_v7());
        let json = serde_json::to_value(NoteView::new(&note, "Ada Lovelace")).unwrap();

        assert_eq!(json["createdBy"], "Ada Lovelace");
        assert_eq!(json["createdById"], note.owner().unwrap().to_string());
    }
}
