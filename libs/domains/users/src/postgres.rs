use async_trait::async_trait;
use database::{BaseRepository, Change};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::{
    entity::{roles, user_roles, users},
    error::{UserError, UserResult},
    models::{Role, User},
    repository::IdentityStore,
};

/// Postgres identity store. Emails are stored lowercased by the service, so
/// lookups compare them directly.
#[derive(Clone)]
pub struct PgIdentityStore {
    base: BaseRepository<users::Entity>,
}

impl PgIdentityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn commit_one(&self, change: Change<User>) -> UserResult<Option<User>> {
        let written = self.base.commit(vec![change]).await.map_err(db_error)?;
        Ok(written.into_iter().next())
    }
}

fn db_error(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create(&self, user: User) -> UserResult<User> {
        let created = self
            .commit_one(Change::Added(user))
            .await?
            .ok_or_else(|| UserError::Internal("Insert was rewritten".to_string()))?;

        tracing::info!(user_id = %created.id, "Created user");
        Ok(created)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let change = self
            .base
            .tracked(user)
            .await
            .map_err(db_error)?
            .ok_or_else(|| UserError::NotFound("User not found.".to_string()))?;

        self.commit_one(change)
            .await?
            .ok_or_else(|| UserError::Internal("Update was rewritten".to_string()))
    }

    async fn delete(&self, user: User) -> UserResult<()> {
        let user_id = user.id;
        self.commit_one(Change::Deleted(user)).await?;

        tracing::info!(user_id = %user_id, "Deleted user");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = users::Entity::find_by_id(id)
            .filter(users::Column::IsDeleted.eq(false))
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .order_by_asc(users::Column::IsDeleted)
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let models = users::Entity::find()
            .filter(users::Column::IsDeleted.eq(false))
            .order_by_asc(users::Column::CreatedAt)
            .all(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let mut query = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .filter(users::Column::IsDeleted.eq(false));

        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }

        let taken = query
            .one(self.base.db())
            .await
            .map_err(db_error)?
            .is_some();

        Ok(taken)
    }

    async fn roles_of(&self, user_id: Uuid) -> UserResult<Vec<Role>> {
        let role_ids: Vec<Uuid> = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(self.base.db())
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|m| m.role_id)
            .collect();

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = roles::Entity::find()
            .filter(roles::Column::Id.is_in(role_ids))
            .order_by_asc(roles::Column::Name)
            .all(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_role(&self, id: Uuid) -> UserResult<Option<Role>> {
        let model = roles::Entity::find_by_id(id)
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_role_by_name(&self, name: &str) -> UserResult<Option<Role>> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn add_to_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()> {
        let existing = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .one(self.base.db())
            .await
            .map_err(db_error)?;

        if existing.is_some() {
            return Err(UserError::RoleAlreadyAssigned);
        }

        user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        }
        .insert(self.base.db())
        .await
        .map_err(db_error)?;

        tracing::debug!(user_id = %user_id, role_id = %role_id, "Added user to role");
        Ok(())
    }

    async fn remove_from_all_roles(&self, user_id: Uuid) -> UserResult<()> {
        user_roles::Entity::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(())
    }
}
