//! Repository for the `course_modules` table.

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::course_module::{CourseModule, CreateCourseModule, UpdateCourseModule};

const COLUMNS: &str = "id, course_id, title, position, created_at, updated_at";

/// Provides CRUD operations for course modules.
pub struct CourseModuleRepo;

impl CourseModuleRepo {
    /// Insert a module. Without an explicit position it is appended after
    /// the current last module.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateCourseModule,
    ) -> Result<CourseModule, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_modules (course_id, title, position)
             VALUES ($1, $2, COALESCE($3,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM course_modules WHERE course_id = $1)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(course_id)
            .bind(&input.title)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CourseModule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_modules WHERE id = $1");
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Modules of a course in display order.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<CourseModule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_modules WHERE course_id = $1 ORDER BY position, id"
        );
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourseModule,
    ) -> Result<Option<CourseModule>, sqlx::Error> {
        let query = format!(
            "UPDATE course_modules SET
                title = COALESCE($2, title),
                position = COALESCE($3, position)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    /// Delete a module and, by cascade, its lessons.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
