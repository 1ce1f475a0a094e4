use axum::Router;
use domain_users::{AuthState, auth_handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let auth_state = AuthState {
        service: super::users::service(state),
        jwt_auth: state.jwt_auth.clone(),
    };

    auth_handlers::router(auth_state)
}
