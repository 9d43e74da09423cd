//! Handler for enrolling in a course.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::error::CoreError;
use gurmania_core::types::DbId;
use gurmania_db::repositories::EnrollmentRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{ensure_course_exists, record_audit};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/courses/{id}/enroll
///
/// Enroll the caller in a published course. Enrolling twice is a 409.
pub async fn enroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    if !course.is_published {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }));
    }

    let enrollment = EnrollmentRepo::create(&state.pool, auth.user_id, course_id).await?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::CourseEnrolled { course_id },
    )
    .await;

    tracing::info!(course_id, user_id = auth.user_id, "Learner enrolled");

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}
