//! Shared SeaORM repository plumbing.
//!
//! Domain repositories wrap a [`BaseRepository`] and route every write through
//! [`BaseRepository::commit`], so the [`AuditInterceptor`] runs on all of them.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait, TransactionTrait,
};
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

use crate::audit::{AuditInterceptor, Auditable, Change, Write};

pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    interceptor: AuditInterceptor,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> Clone for BaseRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            interceptor: self.interceptor.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: EntityTrait> BaseRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_interceptor(db, AuditInterceptor::default())
    }

    pub fn with_interceptor(db: DatabaseConnection, interceptor: AuditInterceptor) -> Self {
        Self {
            db,
            interceptor,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn interceptor(&self) -> &AuditInterceptor {
        &self.interceptor
    }
}

impl<E> BaseRepository<E>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    /// Pair `current` with its stored state so the interceptor can protect the
    /// created fields. `None` when the row does not exist.
    pub async fn tracked<D>(&self, current: D) -> Result<Option<Change<D>>, DbErr>
    where
        D: Auditable + From<E::Model>,
    {
        let Some(stored) = self.find_by_id(current.id()).await? else {
            return Ok(None);
        };

        Ok(Some(Change::Modified {
            original: D::from(stored),
            current,
        }))
    }
}

impl<E> BaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelBehavior + Send,
{
    /// Intercept `changes` and apply the resulting writes in one transaction.
    ///
    /// Returns the entities as written, minus anything physically removed.
    pub async fn commit<D>(&self, changes: Vec<Change<D>>) -> Result<Vec<D>, DbErr>
    where
        D: Auditable + Into<E::ActiveModel>,
    {
        let writes = self.interceptor.before_commit(changes);
        let txn = self.db.begin().await?;
        let mut written = Vec::with_capacity(writes.len());

        for write in writes {
            match write {
                Write::Insert(entity) => {
                    let model: E::ActiveModel = entity.clone().into();
                    model.insert(&txn).await?;
                    written.push(entity);
                }
                Write::Update(entity) => {
                    let model: E::ActiveModel = entity.clone().into();
                    model.update(&txn).await?;
                    written.push(entity);
                }
                Write::Remove(entity) => {
                    let model: E::ActiveModel = entity.into();
                    model.delete(&txn).await?;
                }
            }
        }

        txn.commit().await?;
        debug!(count = written.len(), "Committed audited changes");
        Ok(written)
    }
}
