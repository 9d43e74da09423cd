//! Handlers for students applying to become instructors.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::error::CoreError;
use gurmania_core::roles::ROLE_STUDENT;
use gurmania_core::verification::VERIFICATION_PENDING;
use gurmania_db::models::verification::CreateInstructorVerification;
use gurmania_db::repositories::VerificationRepo;

use crate::error::{validate_input, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/instructor-verifications
///
/// Students only, one pending request at a time.
pub async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInstructorVerification>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;

    if auth.role != ROLE_STUDENT {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Role '{}' cannot apply for instructor verification",
            auth.role
        ))));
    }

    let existing = VerificationRepo::list_for_user(&state.pool, auth.user_id).await?;
    if existing.iter().any(|v| v.status == VERIFICATION_PENDING) {
        return Err(AppError::Core(CoreError::Conflict(
            "A verification request is already pending".into(),
        )));
    }

    let request = VerificationRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        verification_id = request.id,
        user_id = auth.user_id,
        "Instructor verification requested",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/instructor-verifications/me
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = VerificationRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}
