//! Route definitions for taking quizzes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quizzes;
use crate::state::AppState;

/// Routes mounted at `/quizzes`.
///
/// ```text
/// GET    /{id}               -> get_quiz
/// POST   /{id}/submit        -> submit_quiz
/// GET    /{id}/submissions   -> list_submissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(quizzes::get_quiz))
        .route("/{id}/submit", post(quizzes::submit_quiz))
        .route("/{id}/submissions", get(quizzes::list_submissions))
}
