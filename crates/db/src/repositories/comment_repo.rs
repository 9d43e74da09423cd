//! Repository for the `lesson_comments` table.

use gurmania_core::moderation::COMMENT_PENDING;
use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::LessonComment;

const COLUMNS: &str = "\
    id, lesson_id, user_id, body, status, moderated_by, moderated_at, created_at, updated_at";

pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment in the given initial status.
    pub async fn create(
        pool: &PgPool,
        lesson_id: DbId,
        user_id: DbId,
        body: &str,
        status: &str,
    ) -> Result<LessonComment, sqlx::Error> {
        let query = format!(
            "INSERT INTO lesson_comments (lesson_id, user_id, body, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LessonComment>(&query)
            .bind(lesson_id)
            .bind(user_id)
            .bind(body)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LessonComment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lesson_comments WHERE id = $1");
        sqlx::query_as::<_, LessonComment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on a lesson that `viewer_id` may see, oldest first.
    ///
    /// Moderators see everything; others see approved comments plus their own.
    pub async fn list_visible(
        pool: &PgPool,
        lesson_id: DbId,
        viewer_id: DbId,
        viewer_moderates: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LessonComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lesson_comments
             WHERE lesson_id = $1 AND ($3 OR status = 'approved' OR user_id = $2)
             ORDER BY created_at, id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, LessonComment>(&query)
            .bind(lesson_id)
            .bind(viewer_id)
            .bind(viewer_moderates)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Moderation queue, oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LessonComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lesson_comments
             WHERE status = '{COMMENT_PENDING}'
             ORDER BY created_at, id
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, LessonComment>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record a moderation decision.
    pub async fn moderate(
        pool: &PgPool,
        id: DbId,
        moderator_id: DbId,
        status: &str,
    ) -> Result<Option<LessonComment>, sqlx::Error> {
        let query = format!(
            "UPDATE lesson_comments
             SET status = $2, moderated_by = $3, moderated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LessonComment>(&query)
            .bind(id)
            .bind(status)
            .bind(moderator_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lesson_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
