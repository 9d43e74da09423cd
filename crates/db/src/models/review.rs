//! Course review model and DTO.

use gurmania_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `course_reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseReview {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub rating: i16,
    pub body: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 5000))]
    pub body: Option<String>,
}
