//! Repository for the `lessons` table.

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson::{CreateLesson, Lesson, LessonLocation, UpdateLesson};

const COLUMNS: &str = "\
    id, module_id, title, content, video_url, required_ingredients, position, \
    created_at, updated_at";

/// Provides CRUD operations for lessons.
pub struct LessonRepo;

impl LessonRepo {
    /// Insert a lesson, appending it to the module when no position is given.
    pub async fn create(
        pool: &PgPool,
        module_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (module_id, title, content, video_url, required_ingredients, position)
             VALUES ($1, $2, COALESCE($3, ''), $4, COALESCE($5, '{{}}'::TEXT[]), COALESCE($6,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM lessons WHERE module_id = $1)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(module_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.video_url)
            .bind(&input.required_ingredients)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All lessons of a course, ordered by module position then lesson position.
    pub async fn list_by_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM lessons l
             JOIN course_modules m ON m.id = l.module_id
             WHERE m.course_id = $1
             ORDER BY m.position, m.id, l.position, l.id",
            prefixed("l")
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve the module and course a lesson belongs to. Lessons of
    /// soft-deleted courses resolve to `None`.
    pub async fn find_location(
        pool: &PgPool,
        lesson_id: DbId,
    ) -> Result<Option<LessonLocation>, sqlx::Error> {
        sqlx::query_as::<_, LessonLocation>(
            "SELECT l.id AS lesson_id, l.module_id, m.course_id
             FROM lessons l
             JOIN course_modules m ON m.id = l.module_id
             JOIN courses c ON c.id = m.course_id
             WHERE l.id = $1 AND c.deleted_at IS NULL",
        )
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }

    /// Update a lesson. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLesson,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                video_url = COALESCE($4, video_url),
                required_ingredients = COALESCE($5, required_ingredients),
                position = COALESCE($6, position)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.video_url)
            .bind(&input.required_ingredients)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Which of `lesson_ids` belong to `course_id`.
    pub async fn ids_in_course(
        pool: &PgPool,
        course_id: DbId,
        lesson_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT l.id FROM lessons l
             JOIN course_modules m ON m.id = l.module_id
             WHERE m.course_id = $1 AND l.id = ANY($2)",
        )
        .bind(course_id)
        .bind(lesson_ids)
        .fetch_all(pool)
        .await
    }

    /// Which of `lesson_ids` exist at all.
    pub async fn existing_ids(pool: &PgPool, lesson_ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM lessons WHERE id = ANY($1)")
            .bind(lesson_ids)
            .fetch_all(pool)
            .await
    }
}

/// `COLUMNS` qualified with a table alias.
fn prefixed(alias: &str) -> String {
    COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
