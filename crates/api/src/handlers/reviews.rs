//! Handlers for course reviews. One review per learner per course.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::error::CoreError;
use gurmania_core::types::DbId;
use gurmania_db::models::review::CreateCourseReview;
use gurmania_db::repositories::ReviewRepo;

use crate::error::{validate_input, AppError, AppResult};
use crate::handlers::access::{ensure_course_learner, ensure_course_visible};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/courses/{id}/reviews
pub async fn list_reviews(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_course_visible(&state.pool, &auth, course_id).await?;
    let (limit, offset) = params.resolve();

    let reviews = ReviewRepo::list_for_course(&state.pool, course_id, limit, offset).await?;

    Ok(Json(DataResponse { data: reviews }))
}

/// POST /api/v1/courses/{id}/reviews
///
/// Enrolled learners only. A second review of the same course is a 409.
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateCourseReview>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;

    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;
    if access.course.instructor_id == auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Instructors cannot review their own course".into(),
        )));
    }

    let review = ReviewRepo::create(&state.pool, auth.user_id, course_id, &input).await?;

    tracing::info!(
        course_id,
        user_id = auth.user_id,
        rating = review.rating,
        "Course reviewed",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}
