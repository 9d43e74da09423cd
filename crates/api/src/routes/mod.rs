pub mod admin;
pub mod certificates;
pub mod comments;
pub mod courses;
pub mod health;
pub mod quizzes;
pub mod verifications;
pub mod workshops;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /courses                                         catalog, authoring
/// /courses/{id}/publish, /unpublish                visibility
/// /courses/{id}/enroll                             enrollment
/// /courses/{id}/curriculum, /progress              learner views
/// /courses/{id}/modules/...                        modules, module lock
/// /courses/{id}/lessons/{lesson_id}/...            lesson detail, complete, quiz authoring
/// /courses/{id}/certificate                        course certificate
/// /courses/{id}/reviews                            reviews
///
/// /quizzes/{id}, /submit, /submissions             quiz taking
///
/// /lessons/{lesson_id}/comments                    discussion
/// /comments/{id}, /moderate                        comment actions
///
/// /workshops                                       list, schedule
/// /workshops/{id}, /start, /join                   session
/// /workshops/{id}/reservations                     reserve, cancel
/// /workshops/{id}/calendar.ics                     calendar export
///
/// /certificates, /verify/{code}                    my certificates, public check
///
/// /instructor-verifications, /me                   apply, my requests
///
/// /admin/instructor-verifications[/{id}/review]    review requests
/// /admin/comments                                  moderation queue
/// /admin/dashboard                                 analytics
/// /admin/audit-logs                                audit trail
/// /admin/users                                     user listing
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/courses", courses::router())
        .nest("/quizzes", quizzes::router())
        .nest("/lessons", comments::lesson_router())
        .nest("/comments", comments::router())
        .nest("/workshops", workshops::router())
        .nest("/certificates", certificates::router())
        .nest("/instructor-verifications", verifications::router())
        .nest("/admin", admin::router())
}
