//! Lesson comment model.

use gurmania_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lesson_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonComment {
    pub id: DbId,
    pub lesson_id: DbId,
    pub user_id: DbId,
    pub body: String,
    /// `pending`, `approved`, or `rejected`.
    pub status: String,
    pub moderated_by: Option<DbId>,
    pub moderated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonComment {
    pub body: String,
}
