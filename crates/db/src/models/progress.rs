//! Per-lesson progress model.

use gurmania_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `progress` table. Created lazily on first view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Progress {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub lesson_id: DbId,
    pub completed: bool,
    pub percent: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
