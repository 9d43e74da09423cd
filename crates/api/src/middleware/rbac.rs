//! Role gates layered on [`AuthUser`].
//!
//! These only look at the token's role. Whether an instructor owns a
//! particular course or workshop is decided in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gurmania_core::error::CoreError;
use gurmania_core::roles::{can_teach, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&str) -> bool,
    refusal: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user.role) {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role gate refused");
        return Err(AppError::Core(CoreError::Forbidden(refusal.to_string())));
    }
    Ok(user)
}

/// Admins only: verification review, moderation queue, dashboard, audit.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, |role| role == ROLE_ADMIN, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Verified instructors and admins: creating courses and scheduling
/// workshops.
pub struct RequireInstructor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInstructor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(
            parts,
            state,
            can_teach,
            "Only verified instructors can do this",
        )
        .await
        .map(RequireInstructor)
    }
}
