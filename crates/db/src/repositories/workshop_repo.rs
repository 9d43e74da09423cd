//! Repository for `workshops` and `workshop_required_lessons`.

use gurmania_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::workshop::{CreateWorkshop, Workshop, WorkshopListParams};

const COLUMNS: &str = "\
    id, instructor_id, course_id, title, description, starts_at, duration_mins, capacity, \
    meeting_url, started_at, created_at, updated_at";

pub struct WorkshopRepo;

impl WorkshopRepo {
    /// Insert a workshop and its prerequisite lessons in one transaction.
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        input: &CreateWorkshop,
    ) -> Result<Workshop, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workshops
                (instructor_id, course_id, title, description, starts_at, duration_mins,
                 capacity, meeting_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let workshop = sqlx::query_as::<_, Workshop>(&query)
            .bind(instructor_id)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.duration_mins)
            .bind(input.capacity)
            .bind(&input.meeting_url)
            .fetch_one(&mut *tx)
            .await?;

        if !input.required_lesson_ids.is_empty() {
            sqlx::query(
                "INSERT INTO workshop_required_lessons (workshop_id, lesson_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(workshop.id)
            .bind(&input.required_lesson_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(workshop)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workshops WHERE id = $1");
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List workshops by start time. With `upcoming`, only those that have
    /// not ended at `now`.
    pub async fn list(
        pool: &PgPool,
        params: &WorkshopListParams,
        now: Timestamp,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Workshop>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workshops
             WHERE ($1::BIGINT IS NULL OR course_id = $1)
               AND (NOT $2 OR starts_at + make_interval(mins => duration_mins) > $3)
             ORDER BY starts_at, id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(params.course_id)
            .bind(params.upcoming)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Prerequisite lesson ids of a workshop.
    pub async fn required_lesson_ids(
        pool: &PgPool,
        workshop_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT lesson_id FROM workshop_required_lessons
             WHERE workshop_id = $1
             ORDER BY lesson_id",
        )
        .bind(workshop_id)
        .fetch_all(pool)
        .await
    }

    /// Stamp `started_at`. A second start keeps the first stamp.
    pub async fn mark_started(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops SET started_at = COALESCE(started_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
