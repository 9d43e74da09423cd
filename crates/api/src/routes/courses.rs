//! Route definitions for courses and everything nested under a course.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{certificates, courses, curriculum, enrollment, reviews};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                                      -> list_courses
/// POST   /                                      -> create_course
/// GET    /{id}                                  -> get_course
/// PUT    /{id}                                  -> update_course
/// DELETE /{id}                                  -> delete_course
/// POST   /{id}/publish                          -> publish_course
/// POST   /{id}/unpublish                        -> unpublish_course
/// POST   /{id}/enroll                           -> enroll
/// GET    /{id}/curriculum                       -> get_curriculum
/// GET    /{id}/progress                         -> get_progress
/// POST   /{id}/modules                          -> create_module
/// PUT    /{id}/modules/{module_id}              -> update_module
/// DELETE /{id}/modules/{module_id}              -> delete_module
/// GET    /{id}/modules/{module_id}/lock         -> get_module_lock
/// POST   /{id}/modules/{module_id}/lessons      -> create_lesson
/// GET    /{id}/lessons/{lesson_id}              -> get_lesson
/// PUT    /{id}/lessons/{lesson_id}              -> update_lesson
/// DELETE /{id}/lessons/{lesson_id}              -> delete_lesson
/// POST   /{id}/lessons/{lesson_id}/complete     -> complete_lesson
/// PUT    /{id}/lessons/{lesson_id}/quiz         -> upsert_quiz
/// DELETE /{id}/lessons/{lesson_id}/quiz         -> delete_quiz
/// GET    /{id}/certificate                      -> get_course_certificate
/// POST   /{id}/certificate                      -> issue_certificate
/// GET    /{id}/reviews                          -> list_reviews
/// POST   /{id}/reviews                          -> create_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses).post(courses::create_course))
        .route(
            "/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/{id}/publish", post(courses::publish_course))
        .route("/{id}/unpublish", post(courses::unpublish_course))
        .route("/{id}/enroll", post(enrollment::enroll))
        .route("/{id}/curriculum", get(curriculum::get_curriculum))
        .route("/{id}/progress", get(curriculum::get_progress))
        .route("/{id}/modules", post(curriculum::create_module))
        .route(
            "/{id}/modules/{module_id}",
            put(curriculum::update_module).delete(curriculum::delete_module),
        )
        .route(
            "/{id}/modules/{module_id}/lock",
            get(curriculum::get_module_lock),
        )
        .route(
            "/{id}/modules/{module_id}/lessons",
            post(curriculum::create_lesson),
        )
        .route(
            "/{id}/lessons/{lesson_id}",
            get(curriculum::get_lesson)
                .put(curriculum::update_lesson)
                .delete(curriculum::delete_lesson),
        )
        .route(
            "/{id}/lessons/{lesson_id}/complete",
            post(curriculum::complete_lesson),
        )
        .route(
            "/{id}/lessons/{lesson_id}/quiz",
            put(curriculum::upsert_quiz).delete(curriculum::delete_quiz),
        )
        .route(
            "/{id}/certificate",
            get(certificates::get_course_certificate).post(certificates::issue_certificate),
        )
        .route(
            "/{id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
}
