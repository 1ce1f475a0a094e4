use axum::{Router, middleware};
use axum_helpers::jwt_auth_middleware;

pub mod auth;
pub mod health;
pub mod notes;
pub mod users;

/// Creates the API routes, mounted at the root by `create_router`.
///
/// `/authentication` is public; `/user` and `/note` require a bearer token.
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes(state: &crate::state::AppState) -> Router {
    let users = users::router(state).layer(middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        jwt_auth_middleware,
    ));
    let notes = notes::router(state).layer(middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        jwt_auth_middleware,
    ));

    Router::new()
        .nest("/authentication", auth::router(state))
        .nest("/user", users)
        .nest("/note", notes)
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
