//! Quiz submission model. Submissions are append-only.

use gurmania_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `quiz_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizSubmission {
    pub id: DbId,
    pub user_id: DbId,
    pub quiz_id: DbId,
    pub score: i32,
    pub passed: bool,
    /// The answer sheet as submitted.
    pub answers: serde_json::Value,
    pub submitted_at: Timestamp,
}

/// DTO for recording a scored submission. `course_id` and `lesson_id` locate
/// the progress row whose completed flag follows the result.
#[derive(Debug, Clone)]
pub struct CreateQuizSubmission {
    pub user_id: DbId,
    pub quiz_id: DbId,
    pub course_id: DbId,
    pub lesson_id: DbId,
    pub score: i32,
    pub passed: bool,
    pub answers: serde_json::Value,
}

/// Latest submission per quiz, keyed by the quiz's lesson.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LatestSubmissionRow {
    pub lesson_id: DbId,
    pub score: i32,
}
