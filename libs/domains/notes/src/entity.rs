use database::AuditFields;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub tags: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTimeWithTimeZone>,
    pub updated_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Note {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            tags: model.tags,
            audit: AuditFields {
                created_at: model.created_at.into(),
                created_by: model.created_by,
                updated_at: model.updated_at.map(Into::into),
                updated_by: model.updated_by,
                is_active: model.is_active,
                is_deleted: model.is_deleted,
            },
        }
    }
}

impl From<crate::models::Note> for ActiveModel {
    fn from(note: crate::models::Note) -> Self {
        ActiveModel {
            id: Set(note.id),
            title: Set(note.title),
            description: Set(note.description),
            tags: Set(note.tags),
            is_active: Set(note.audit.is_active),
            is_deleted: Set(note.audit.is_deleted),
            created_at: Set(note.audit.created_at.into()),
            created_by: Set(note.audit.created_by),
            updated_at: Set(note.audit.updated_at.map(Into::into)),
            updated_by: Set(note.audit.updated_by),
        }
    }
}
