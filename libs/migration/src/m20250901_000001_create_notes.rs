use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250901_000000_create_identity::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(pk_uuid(Notes::Id))
                    .col(string_len(Notes::Title, 100))
                    .col(text(Notes::Description))
                    .col(string_len(Notes::Tags, 100))
                    .col(boolean(Notes::IsActive).default(true))
                    .col(boolean(Notes::IsDeleted).default(false))
                    .col(
                        timestamp_with_time_zone(Notes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(uuid_null(Notes::CreatedBy))
                    .col(timestamp_with_time_zone_null(Notes::UpdatedAt))
                    .col(uuid_null(Notes::UpdatedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notes_created_by")
                            .from(Notes::Table, Notes::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notes_created_by")
                    .table(Notes::Table)
                    .col(Notes::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notes_is_deleted")
                    .table(Notes::Table)
                    .col(Notes::IsDeleted)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Notes {
    Table,
    Id,
    Title,
    Description,
    Tags,
    IsActive,
    IsDeleted,
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    UpdatedBy,
}
