//! Instructor verification request model and DTO.

use gurmania_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `instructor_verifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InstructorVerification {
    pub id: DbId,
    pub user_id: DbId,
    pub motivation: String,
    pub portfolio_url: Option<String>,
    pub status: String,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub review_note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInstructorVerification {
    #[validate(length(min = 20, max = 4000))]
    pub motivation: String,
    #[validate(url)]
    pub portfolio_url: Option<String>,
}

/// Listing filter (`?status=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
