//! Admin-only handlers: verification review, the comment moderation queue,
//! the analytics dashboard, the audit trail, and user listing.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::error::CoreError;
use gurmania_core::pagination::page_bounds;
use gurmania_core::roles::validate_role;
use gurmania_core::types::DbId;
use gurmania_core::verification::{
    check_review, VerificationDecision, VERIFICATION_APPROVED, VERIFICATION_PENDING,
    VERIFICATION_REJECTED,
};
use gurmania_db::models::analytics::Dashboard;
use gurmania_db::models::audit::{AuditLogPage, AuditQuery};
use gurmania_db::models::verification::VerificationListParams;
use gurmania_db::repositories::{AnalyticsRepo, AuditLogRepo, CommentRepo, UserRepo, VerificationRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::access::record_audit;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Courses shown in the dashboard's per-course table.
const DASHBOARD_COURSE_LIMIT: i64 = 20;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReviewVerificationRequest {
    pub decision: VerificationDecision,
    pub note: Option<String>,
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Instructor verification
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/instructor-verifications
///
/// Optional `?status=pending|approved|rejected`.
pub async fn list_verifications(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<VerificationListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = params.status.as_deref() {
        if ![VERIFICATION_PENDING, VERIFICATION_APPROVED, VERIFICATION_REJECTED].contains(&status) {
            return Err(AppError::BadRequest(format!(
                "Unknown verification status '{status}'"
            )));
        }
    }
    let (limit, offset) = page_bounds(params.limit, params.offset);

    let requests =
        VerificationRepo::list(&state.pool, params.status.as_deref(), limit, offset).await?;

    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/admin/instructor-verifications/{id}/review
///
/// Approving promotes the applicant to `instructor`. Rejections need a note.
pub async fn review_verification(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(verification_id): Path<DbId>,
    Json(input): Json<ReviewVerificationRequest>,
) -> AppResult<impl IntoResponse> {
    let current = VerificationRepo::find_by_id(&state.pool, verification_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "InstructorVerification",
            id: verification_id,
        }))?;

    let note = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    check_review(&current.status, input.decision, note)?;

    // A concurrent review may have decided it between the read and the update.
    let reviewed = VerificationRepo::review(
        &state.pool,
        verification_id,
        admin.user_id,
        input.decision,
        note,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Verification request was already reviewed".into(),
        ))
    })?;

    record_audit(
        &state.pool,
        admin.user_id,
        AuditPayload::VerificationReviewed {
            verification_id,
            applicant_id: reviewed.user_id,
            decision: input.decision,
        },
    )
    .await;

    tracing::info!(
        verification_id,
        applicant_id = reviewed.user_id,
        status = %reviewed.status,
        admin_id = admin.user_id,
        "Instructor verification reviewed",
    );

    Ok(Json(DataResponse { data: reviewed }))
}

// ---------------------------------------------------------------------------
// Moderation queue
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/comments
///
/// Pending comments across all courses, oldest first.
pub async fn list_pending_comments(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.resolve();
    let comments = CommentRepo::list_pending(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: comments }))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let totals = AnalyticsRepo::totals(&state.pool).await?;
    let courses = AnalyticsRepo::course_stats(&state.pool, DASHBOARD_COURSE_LIMIT).await?;

    Ok(Json(DataResponse {
        data: Dashboard { totals, courses },
    }))
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/audit-logs
///
/// Filters: `actor_id`, `action_type`, `entity_type`, `entity_id`, `from`,
/// `to` (RFC 3339), plus `limit`/`offset`.
pub async fn query_audit_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<impl IntoResponse> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
        }
    }
    let (limit, offset) = page_bounds(params.limit, params.offset);

    let items = AuditLogRepo::query(&state.pool, &params, limit, offset).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;

    Ok(Json(DataResponse {
        data: AuditLogPage { items, total },
    }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(role) = params.role.as_deref() {
        validate_role(role).map_err(AppError::BadRequest)?;
    }
    let (limit, offset) = page_bounds(params.limit, params.offset);

    let users = UserRepo::list(&state.pool, params.role.as_deref(), limit, offset).await?;

    Ok(Json(DataResponse { data: users }))
}
