use axum::Router;
use domain_notes::{NoteService, PgNoteRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgNoteRepository::new(state.db.clone());
    handlers::router(NoteService::new(repository))
}
