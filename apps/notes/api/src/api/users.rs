use axum::Router;
use domain_users::{PgIdentityStore, UserService, handlers};

/// User service over Postgres, shared by `/user` and `/authentication`.
pub fn service(state: &crate::state::AppState) -> UserService<PgIdentityStore> {
    UserService::new(PgIdentityStore::new(state.db.clone()))
        .with_registration_role(state.config.register_default_role.clone())
}

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::router(service(state))
}
