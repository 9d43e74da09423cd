//! Route definitions for the admin surface. Every handler requires the
//! `admin` role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /instructor-verifications                -> list_verifications
/// POST   /instructor-verifications/{id}/review    -> review_verification
/// GET    /comments                                -> list_pending_comments
/// GET    /dashboard                               -> dashboard
/// GET    /audit-logs                              -> query_audit_logs
/// GET    /users                                   -> list_users
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/instructor-verifications",
            get(admin::list_verifications),
        )
        .route(
            "/instructor-verifications/{id}/review",
            post(admin::review_verification),
        )
        .route("/comments", get(admin::list_pending_comments))
        .route("/dashboard", get(admin::dashboard))
        .route("/audit-logs", get(admin::query_audit_logs))
        .route("/users", get(admin::list_users))
}
