//! Route definitions for lesson comments.
//!
//! Two routers are provided:
//! - `lesson_router()` for the discussion of a lesson, mounted at `/lessons`
//! - `router()` for acting on a single comment, mounted at `/comments`

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// GET    /{lesson_id}/comments   -> list_comments
/// POST   /{lesson_id}/comments   -> create_comment
/// ```
pub fn lesson_router() -> Router<AppState> {
    Router::new().route(
        "/{lesson_id}/comments",
        get(comments::list_comments).post(comments::create_comment),
    )
}

/// Routes mounted at `/comments`.
///
/// ```text
/// POST   /{id}/moderate   -> moderate_comment
/// DELETE /{id}            -> delete_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/moderate", post(comments::moderate_comment))
        .route("/{id}", delete(comments::delete_comment))
}
