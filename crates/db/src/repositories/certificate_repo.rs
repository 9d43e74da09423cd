//! Repository for the `certificates` table.

use gurmania_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::certificate::{Certificate, CertificateVerification};

const COLUMNS: &str = "id, user_id, course_id, code, issued_at";

/// One certificate per learner and course.
pub const UQ_CERTIFICATE_USER_COURSE: &str = "uq_certificates_user_course";

pub struct CertificateRepo;

impl CertificateRepo {
    /// Insert a certificate. A second certificate for the same learner and
    /// course violates `uq_certificates_user_course`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
        code: &str,
        issued_at: Timestamp,
    ) -> Result<Certificate, sqlx::Error> {
        let query = format!(
            "INSERT INTO certificates (user_id, course_id, code, issued_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Certificate>(&query)
            .bind(user_id)
            .bind(course_id)
            .bind(code)
            .bind(issued_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_for_user_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM certificates WHERE user_id = $1 AND course_id = $2");
        sqlx::query_as::<_, Certificate>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Certificate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM certificates WHERE user_id = $1 ORDER BY issued_at DESC"
        );
        sqlx::query_as::<_, Certificate>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Public lookup by code.
    pub async fn verify(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<CertificateVerification>, sqlx::Error> {
        sqlx::query_as::<_, CertificateVerification>(
            "SELECT ce.code, ce.issued_at, ce.course_id, c.title AS course_title,
                    u.display_name AS learner_name
             FROM certificates ce
             JOIN courses c ON c.id = ce.course_id
             JOIN users u ON u.id = ce.user_id
             WHERE ce.code = $1",
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }
}
