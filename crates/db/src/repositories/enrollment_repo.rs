//! Repository for the `enrollments` table.

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::Enrollment;

const COLUMNS: &str = "id, user_id, course_id, enrolled_at";

pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a learner. A repeat enrollment violates
    /// `uq_enrollments_user_course`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    pub async fn is_enrolled(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }
}
