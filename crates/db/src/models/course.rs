//! Course entity model and DTOs.

use gurmania_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `courses` table (soft-deleted rows are never returned).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub instructor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Catalog entry: a course plus aggregate counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseSummary {
    pub id: DbId,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub enrollment_count: i64,
    pub review_count: i64,
    pub average_rating: Option<f64>,
    pub created_at: Timestamp,
}

/// DTO for creating a new course. The instructor comes from the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourse {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// DTO for updating an existing course. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCourse {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// Catalog filters (`?instructor_id=&search=&limit=&offset=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseListParams {
    pub instructor_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
