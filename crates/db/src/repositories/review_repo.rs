//! Repository for the `course_reviews` table.

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CourseReview, CreateCourseReview};

const COLUMNS: &str = "id, user_id, course_id, rating, body, created_at, updated_at";

pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. One per learner per course (`uq_course_reviews_user_course`).
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
        input: &CreateCourseReview,
    ) -> Result<CourseReview, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_reviews (user_id, course_id, rating, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseReview>(&query)
            .bind(user_id)
            .bind(course_id)
            .bind(input.rating)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_course(
        pool: &PgPool,
        course_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CourseReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_reviews
             WHERE course_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CourseReview>(&query)
            .bind(course_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, user_id: DbId, course_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM course_reviews WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }
}
