//! Audit interceptor applied to every repository commit.
//!
//! Repositories never write entities directly. They describe the pending commit
//! as a list of [`Change`]s and hand it to [`AuditInterceptor::before_commit`],
//! which returns the [`Write`]s that are actually executed:
//!
//! | pending change            | write                                  |
//! |---------------------------|----------------------------------------|
//! | `Added`                   | `Insert`, `created_at` stamped         |
//! | `Modified`                | `Update`, created fields reverted      |
//! | `Modified` (deleted row)  | `Update`, `is_deleted` stays `true`    |
//! | `Deleted` (soft-delete)   | `Update` with `is_deleted = true`      |
//! | `Deleted` (hard-delete)   | `Remove`                               |
//!
//! `created_by` is never inferred here: the service that initiates a create sets it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Created/updated bookkeeping carried by every audited entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl AuditFields {
    /// Fresh, active, not-deleted fields. `created_at` is provisional until the
    /// interceptor stamps it on insert.
    pub fn new(created_by: Option<Uuid>) -> Self {
        Self {
            created_at: Utc::now(),
            created_by,
            updated_at: None,
            updated_by: None,
            is_active: true,
            is_deleted: false,
        }
    }

    /// Record `actor` as the last modifier.
    pub fn touch(&mut self, actor: Uuid) {
        self.updated_at = Some(Utc::now());
        self.updated_by = Some(actor);
    }
}

/// An entity whose writes go through the [`AuditInterceptor`].
pub trait Auditable: Clone + Send + Sync {
    /// Whether a requested delete becomes an `is_deleted` flag flip.
    const SOFT_DELETE: bool = true;

    fn id(&self) -> Uuid;
    fn audit(&self) -> &AuditFields;
    fn audit_mut(&mut self) -> &mut AuditFields;
}

/// A pending change inside one commit.
#[derive(Debug, Clone)]
pub enum Change<E> {
    Added(E),
    /// `original` is the stored state the update was tracked against.
    Modified { original: E, current: E },
    Deleted(E),
}

/// The write a repository executes after interception.
#[derive(Debug, Clone, PartialEq)]
pub enum Write<E> {
    Insert(E),
    Update(E),
    Remove(E),
}

impl<E> Write<E> {
    pub fn entity(&self) -> &E {
        match self {
            Write::Insert(e) | Write::Update(e) | Write::Remove(e) => e,
        }
    }

    pub fn into_entity(self) -> E {
        match self {
            Write::Insert(e) | Write::Update(e) | Write::Remove(e) => e,
        }
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Stamps audit fields and enforces soft delete before a commit is written.
#[derive(Clone)]
pub struct AuditInterceptor {
    clock: Clock,
}

impl AuditInterceptor {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Use a fixed or fake clock (tests).
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Intercept every change of a commit, preserving order.
    pub fn before_commit<E: Auditable>(&self, changes: Vec<Change<E>>) -> Vec<Write<E>> {
        changes
            .into_iter()
            .map(|change| self.intercept(change))
            .collect()
    }

    pub fn intercept<E: Auditable>(&self, change: Change<E>) -> Write<E> {
        let change = match change {
            Change::Deleted(entity) if E::SOFT_DELETE => {
                tracing::debug!(entity_id = %entity.id(), "Rewriting delete as soft delete");
                let mut current = entity.clone();
                current.audit_mut().is_deleted = true;
                Change::Modified {
                    original: entity,
                    current,
                }
            }
            other => other,
        };

        match change {
            Change::Added(mut entity) => {
                entity.audit_mut().created_at = self.now();
                Write::Insert(entity)
            }
            Change::Modified {
                original,
                mut current,
            } => {
                let stored = original.audit();
                let audit = current.audit_mut();
                if audit.created_by != stored.created_by || audit.created_at != stored.created_at {
                    tracing::warn!(
                        entity_id = %original.id(),
                        "Discarding change to immutable created fields"
                    );
                }
                audit.created_at = stored.created_at;
                audit.created_by = stored.created_by;
                if stored.is_deleted && !audit.is_deleted {
                    tracing::warn!(
                        entity_id = %original.id(),
                        "Discarding undelete of a soft-deleted entity"
                    );
                    audit.is_deleted = true;
                }
                Write::Update(current)
            }
            Change::Deleted(entity) => Write::Remove(entity),
        }
    }
}

impl Default for AuditInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuditInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditInterceptor").finish_non_exhaustive()
    }
}
