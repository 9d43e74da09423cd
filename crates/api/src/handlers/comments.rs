//! Handlers for lesson comments and their moderation.
//!
//! New comments start `pending`. The course instructor and admins moderate;
//! everyone else sees approved comments plus their own.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::error::CoreError;
use gurmania_core::gating::ensure_lesson_accessible;
use gurmania_core::moderation::{validate_comment_body, ModerationDecision, COMMENT_PENDING};
use gurmania_core::types::DbId;
use gurmania_db::models::comment::{CreateLessonComment, LessonComment};
use gurmania_db::models::lesson::LessonLocation;
use gurmania_db::repositories::{CommentRepo, LessonRepo};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{
    ensure_course_exists, ensure_course_learner, load_gate, record_audit, CourseAccess,
};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ModerateCommentRequest {
    pub decision: ModerationDecision,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_lesson_location(pool: &PgPool, lesson_id: DbId) -> AppResult<LessonLocation> {
    LessonRepo::find_location(pool, lesson_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))
}

async fn ensure_comment_exists(pool: &PgPool, id: DbId) -> AppResult<LessonComment> {
    CommentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))
}

/// Course access for a lesson's discussion. Learners must be able to open
/// the lesson itself.
async fn ensure_discussion_access(
    state: &AppState,
    auth: &AuthUser,
    location: &LessonLocation,
) -> AppResult<CourseAccess> {
    let access = ensure_course_learner(&state.pool, auth, location.course_id).await?;
    if !access.is_staff {
        let (outline, progress) = load_gate(&state.pool, location.course_id, auth.user_id).await?;
        ensure_lesson_accessible(
            &outline,
            &progress,
            state.config.gating_policy,
            location.lesson_id,
        )?;
    }
    Ok(access)
}

/// Whether `auth` moderates comments on `lesson_id`'s course.
async fn moderates_lesson(pool: &PgPool, auth: &AuthUser, lesson_id: DbId) -> AppResult<bool> {
    if auth.is_admin() {
        return Ok(true);
    }
    let location = ensure_lesson_location(pool, lesson_id).await?;
    let course = ensure_course_exists(pool, location.course_id).await?;
    Ok(course.instructor_id == auth.user_id)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/lessons/{lesson_id}/comments
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let location = ensure_lesson_location(&state.pool, lesson_id).await?;
    let access = ensure_discussion_access(&state, &auth, &location).await?;
    let (limit, offset) = params.resolve();

    let comments = CommentRepo::list_visible(
        &state.pool,
        lesson_id,
        auth.user_id,
        access.is_staff,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/lessons/{lesson_id}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<CreateLessonComment>,
) -> AppResult<impl IntoResponse> {
    let body =
        validate_comment_body(&input.body).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let location = ensure_lesson_location(&state.pool, lesson_id).await?;
    ensure_discussion_access(&state, &auth, &location).await?;

    let comment =
        CommentRepo::create(&state.pool, lesson_id, auth.user_id, &body, COMMENT_PENDING).await?;

    tracing::info!(
        comment_id = comment.id,
        lesson_id,
        user_id = auth.user_id,
        "Comment submitted for moderation",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// POST /api/v1/comments/{id}/moderate
pub async fn moderate_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(input): Json<ModerateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let comment = ensure_comment_exists(&state.pool, comment_id).await?;
    if !moderates_lesson(&state.pool, &auth, comment.lesson_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the course instructor or an admin may moderate comments".into(),
        )));
    }

    let comment = CommentRepo::moderate(
        &state.pool,
        comment_id,
        auth.user_id,
        input.decision.resulting_status(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Comment",
        id: comment_id,
    }))?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::CommentModerated {
            comment_id,
            decision: input.decision,
        },
    )
    .await;

    tracing::info!(
        comment_id,
        status = %comment.status,
        user_id = auth.user_id,
        "Comment moderated",
    );

    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/comments/{id}
///
/// The author or a moderator may delete a comment.
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comment = ensure_comment_exists(&state.pool, comment_id).await?;
    if comment.user_id != auth.user_id
        && !moderates_lesson(&state.pool, &auth, comment.lesson_id).await?
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or a moderator may delete this comment".into(),
        )));
    }

    CommentRepo::delete(&state.pool, comment_id).await?;

    tracing::info!(comment_id, user_id = auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
