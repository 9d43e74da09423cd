//! Lesson entity model and DTOs.

use gurmania_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub module_id: DbId,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub required_ingredients: Vec<String>,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Where a lesson sits in the course tree.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LessonLocation {
    pub lesson_id: DbId,
    pub module_id: DbId,
    pub course_id: DbId,
}

/// DTO for creating a lesson. Appended at the end when `position` is omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLesson {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub content: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
    #[validate(length(max = 100))]
    pub required_ingredients: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLesson {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
    #[validate(length(max = 100))]
    pub required_ingredients: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
}
