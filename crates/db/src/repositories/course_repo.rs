//! Repository for the `courses` table.

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CourseListParams, CourseSummary, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, instructor_id, title, description, is_published, created_at, updated_at";

/// Catalog projection with aggregate counters.
const SUMMARY_COLUMNS: &str = "\
    c.id, c.instructor_id, u.display_name AS instructor_name, c.title, c.description, \
    c.is_published, \
    (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollment_count, \
    (SELECT COUNT(*) FROM course_reviews r WHERE r.course_id = c.id) AS review_count, \
    (SELECT AVG(r.rating)::FLOAT8 FROM course_reviews r WHERE r.course_id = c.id) AS average_rating, \
    c.created_at";

/// Provides CRUD operations for courses. Soft-deleted rows are excluded
/// everywhere.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new unpublished course owned by `instructor_id`.
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        input: &CreateCourse,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (instructor_id, title, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Catalog listing, newest first.
    ///
    /// Drafts are included only when `include_drafts` is set or when they
    /// belong to `viewer_id`.
    pub async fn list_summaries(
        pool: &PgPool,
        params: &CourseListParams,
        viewer_id: Option<DbId>,
        include_drafts: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM courses c
             JOIN users u ON u.id = c.instructor_id
             WHERE c.deleted_at IS NULL
               AND ($1 OR c.is_published OR c.instructor_id = $2)
               AND ($3::BIGINT IS NULL OR c.instructor_id = $3)
               AND ($4::TEXT IS NULL OR c.title ILIKE '%' || $4 || '%')
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, CourseSummary>(&query)
            .bind(include_drafts)
            .bind(viewer_id)
            .bind(params.instructor_id)
            .bind(&params.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_published(
        pool: &PgPool,
        id: DbId,
        published: bool,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET is_published = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(published)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a course. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
