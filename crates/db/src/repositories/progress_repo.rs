//! Repository for the `progress` table.

use gurmania_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::progress::Progress;

const COLUMNS: &str = "id, user_id, course_id, lesson_id, completed, percent, created_at, updated_at";

pub struct ProgressRepo;

impl ProgressRepo {
    /// Ensure a progress row exists for the lesson, creating an empty one on
    /// first view.
    pub async fn touch(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
        lesson_id: DbId,
    ) -> Result<Progress, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress (user_id, course_id, lesson_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Progress>(&query)
            .bind(user_id)
            .bind(course_id)
            .bind(lesson_id)
            .fetch_one(pool)
            .await
    }

    /// Set the completed flag, creating the row if needed. A completed lesson
    /// reports 100 percent; un-completing keeps the previous percent.
    pub async fn set_completed(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
        lesson_id: DbId,
        completed: bool,
    ) -> Result<Progress, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::write_completed(&mut conn, user_id, course_id, lesson_id, completed).await
    }

    /// [`ProgressRepo::set_completed`] on a caller-held connection, so it can
    /// share a transaction with other writes.
    pub async fn write_completed(
        conn: &mut PgConnection,
        user_id: DbId,
        course_id: DbId,
        lesson_id: DbId,
        completed: bool,
    ) -> Result<Progress, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress (user_id, course_id, lesson_id, completed, percent)
             VALUES ($1, $2, $3, $4, CASE WHEN $4 THEN 100 ELSE 0 END)
             ON CONFLICT (user_id, lesson_id) DO UPDATE
             SET completed = EXCLUDED.completed,
                 percent = CASE WHEN EXCLUDED.completed THEN 100 ELSE progress.percent END
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Progress>(&query)
            .bind(user_id)
            .bind(course_id)
            .bind(lesson_id)
            .bind(completed)
            .fetch_one(conn)
            .await
    }

    /// Ids of lessons the learner has completed in a course.
    pub async fn completed_lesson_ids(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT lesson_id FROM progress
             WHERE user_id = $1 AND course_id = $2 AND completed",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// The subset of `lesson_ids` the learner has completed, in any course.
    pub async fn completed_among(
        pool: &PgPool,
        user_id: DbId,
        lesson_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT lesson_id FROM progress
             WHERE user_id = $1 AND completed AND lesson_id = ANY($2)",
        )
        .bind(user_id)
        .bind(lesson_ids)
        .fetch_all(pool)
        .await
    }

    /// Whether the learner has any progress row in the course.
    pub async fn has_any(pool: &PgPool, user_id: DbId, course_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM progress WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Option<Progress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM progress WHERE user_id = $1 AND lesson_id = $2");
        sqlx::query_as::<_, Progress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }
}
