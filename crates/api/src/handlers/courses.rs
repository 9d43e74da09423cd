//! Handlers for the course catalog and course authoring.
//!
//! Learners see published courses only. Instructors see their own drafts,
//! admins see everything.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::error::CoreError;
use gurmania_core::pagination::page_bounds;
use gurmania_core::types::DbId;
use gurmania_db::models::course::{Course, CourseListParams, CreateCourse, UpdateCourse};
use gurmania_db::repositories::CourseRepo;

use crate::error::{validate_input, AppError, AppResult};
use crate::handlers::access::{ensure_course_staff, ensure_course_visible, record_audit};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/courses
///
/// Catalog listing with optional `instructor_id` and `search` filters.
pub async fn list_courses(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_bounds(params.limit, params.offset);

    let courses = CourseRepo::list_summaries(
        &state.pool,
        &params,
        Some(auth.user_id),
        auth.is_admin(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: courses }))
}

/// POST /api/v1/courses
pub async fn create_course(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;

    let course = CourseRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(course_id = course.id, user_id = user.user_id, "Course created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let access = ensure_course_visible(&state.pool, &auth, course_id).await?;
    Ok(Json(DataResponse {
        data: access.course,
    }))
}

/// PUT /api/v1/courses/{id}
pub async fn update_course(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    ensure_course_staff(&state.pool, &auth, course_id).await?;

    let course = CourseRepo::update(&state.pool, course_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    tracing::info!(course_id, user_id = auth.user_id, "Course updated");

    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
///
/// Soft delete. The course disappears from every listing and its lessons
/// stop resolving.
pub async fn delete_course(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_course_staff(&state.pool, &auth, course_id).await?;

    if !CourseRepo::soft_delete(&state.pool, course_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }));
    }

    tracing::info!(course_id, user_id = auth.user_id, "Course deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/courses/{id}/publish
pub async fn publish_course(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    set_published(auth, state, course_id, true).await
}

/// POST /api/v1/courses/{id}/unpublish
pub async fn unpublish_course(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    set_published(auth, state, course_id, false).await
}

async fn set_published(
    auth: AuthUser,
    state: AppState,
    course_id: DbId,
    published: bool,
) -> AppResult<Json<DataResponse<Course>>> {
    ensure_course_staff(&state.pool, &auth, course_id).await?;

    let course = CourseRepo::set_published(&state.pool, course_id, published)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::CoursePublished {
            course_id,
            published,
        },
    )
    .await;

    tracing::info!(course_id, published, user_id = auth.user_id, "Course visibility changed");

    Ok(Json(DataResponse { data: course }))
}
