//! Route definitions for instructor verification requests.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::verifications;
use crate::state::AppState;

/// Routes mounted at `/instructor-verifications`.
///
/// ```text
/// POST   /      -> apply
/// GET    /me    -> list_mine
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(verifications::apply))
        .route("/me", get(verifications::list_mine))
}
