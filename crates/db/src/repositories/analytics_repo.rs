//! Read-only aggregate queries for the admin dashboard.

use gurmania_core::moderation::COMMENT_PENDING;
use gurmania_core::roles::ROLE_INSTRUCTOR;
use gurmania_core::verification::VERIFICATION_PENDING;
use sqlx::PgPool;

use crate::models::analytics::{CourseStats, DashboardTotals};

pub struct AnalyticsRepo;

impl AnalyticsRepo {
    pub async fn totals(pool: &PgPool) -> Result<DashboardTotals, sqlx::Error> {
        let query = format!(
            "SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM users WHERE role = '{ROLE_INSTRUCTOR}') AS instructors,
                (SELECT COUNT(*) FROM courses WHERE deleted_at IS NULL) AS courses,
                (SELECT COUNT(*) FROM courses WHERE deleted_at IS NULL AND is_published)
                    AS published_courses,
                (SELECT COUNT(*) FROM enrollments) AS enrollments,
                (SELECT COUNT(*) FROM certificates) AS certificates,
                (SELECT COUNT(*) FROM quiz_submissions) AS quiz_submissions,
                (SELECT AVG(score)::FLOAT8 FROM quiz_submissions) AS average_quiz_score,
                (SELECT AVG(CASE WHEN passed THEN 1.0 ELSE 0.0 END)::FLOAT8 FROM quiz_submissions)
                    AS quiz_pass_rate,
                (SELECT COUNT(*) FROM lesson_comments WHERE status = '{COMMENT_PENDING}')
                    AS pending_comments,
                (SELECT COUNT(*) FROM instructor_verifications
                    WHERE status = '{VERIFICATION_PENDING}') AS pending_verifications"
        );
        sqlx::query_as::<_, DashboardTotals>(&query)
            .fetch_one(pool)
            .await
    }

    /// Per-course enrollment and completion counts, most enrolled first.
    pub async fn course_stats(pool: &PgPool, limit: i64) -> Result<Vec<CourseStats>, sqlx::Error> {
        sqlx::query_as::<_, CourseStats>(
            "SELECT c.id AS course_id, c.title,
                (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollments,
                (SELECT COUNT(*) FROM certificates ce WHERE ce.course_id = c.id) AS completions,
                (SELECT AVG(r.rating)::FLOAT8 FROM course_reviews r WHERE r.course_id = c.id)
                    AS average_rating
             FROM courses c
             WHERE c.deleted_at IS NULL
             ORDER BY enrollments DESC, c.id
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
