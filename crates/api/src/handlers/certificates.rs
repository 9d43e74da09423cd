//! Handlers for course certificates.
//!
//! Certificates are normally issued by the completion flow. The explicit
//! POST exists for clients that want to claim one after the fact and
//! reports 409 when the certificate already exists.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::certificate::{certificate_code, normalize_code};
use gurmania_core::completion::course_completion;
use gurmania_core::error::CoreError;
use gurmania_core::types::DbId;
use gurmania_db::repositories::CertificateRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{ensure_course_learner, load_gate, record_audit};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/courses/{id}/certificate
pub async fn get_course_certificate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let certificate = CertificateRepo::find_for_user_course(&state.pool, auth.user_id, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Certificate for course",
            id: course_id,
        }))?;

    Ok(Json(DataResponse { data: certificate }))
}

/// POST /api/v1/courses/{id}/certificate
///
/// Issue the certificate for a finished course. 400 while lessons remain,
/// 409 when one was already issued.
pub async fn issue_certificate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_course_learner(&state.pool, &auth, course_id).await?;

    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;
    let completion = course_completion(&outline, &progress);
    if !completion.is_complete {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Course is not complete yet ({} of {} lessons)",
            completion.completed_lessons, completion.total_lessons
        ))));
    }

    let issued_at = chrono::Utc::now();
    let code = certificate_code(auth.user_id, course_id, issued_at);
    let certificate =
        CertificateRepo::create(&state.pool, auth.user_id, course_id, &code, issued_at).await?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::CertificateIssued {
            certificate_id: certificate.id,
            course_id,
            code: certificate.code.clone(),
        },
    )
    .await;

    tracing::info!(
        course_id,
        user_id = auth.user_id,
        certificate_id = certificate.id,
        "Certificate issued on request",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: certificate })))
}

/// GET /api/v1/certificates
pub async fn list_my_certificates(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let certificates = CertificateRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: certificates }))
}

/// GET /api/v1/certificates/verify/{code}
///
/// Public. Codes are matched case-insensitively.
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let code = normalize_code(&code).map_err(AppError::BadRequest)?;

    let verification = CertificateRepo::verify(&state.pool, &code)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    Ok(Json(DataResponse { data: verification }))
}
