//! Repository for the `instructor_verifications` table.

use gurmania_core::roles::{ROLE_INSTRUCTOR, ROLE_STUDENT};
use gurmania_core::types::DbId;
use gurmania_core::verification::{VerificationDecision, VERIFICATION_PENDING};
use sqlx::PgPool;

use crate::models::verification::{CreateInstructorVerification, InstructorVerification};

const COLUMNS: &str = "\
    id, user_id, motivation, portfolio_url, status, reviewed_by, reviewed_at, review_note, \
    created_at, updated_at";

pub struct VerificationRepo;

impl VerificationRepo {
    /// Open a request. A second open request for the same user violates
    /// `uq_instructor_verifications_pending_user`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateInstructorVerification,
    ) -> Result<InstructorVerification, sqlx::Error> {
        let query = format!(
            "INSERT INTO instructor_verifications (user_id, motivation, portfolio_url)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InstructorVerification>(&query)
            .bind(user_id)
            .bind(&input.motivation)
            .bind(&input.portfolio_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InstructorVerification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instructor_verifications WHERE id = $1");
        sqlx::query_as::<_, InstructorVerification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's requests, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<InstructorVerification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM instructor_verifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, InstructorVerification>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Review queue, oldest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InstructorVerification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM instructor_verifications
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, InstructorVerification>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Decide a pending request. Approval promotes a student applicant to
    /// instructor in the same transaction.
    ///
    /// Returns `None` if the request does not exist or is no longer pending.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        reviewer_id: DbId,
        decision: VerificationDecision,
        note: Option<&str>,
    ) -> Result<Option<InstructorVerification>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE instructor_verifications
             SET status = $2, reviewed_by = $3, reviewed_at = NOW(), review_note = $4
             WHERE id = $1 AND status = '{VERIFICATION_PENDING}'
             RETURNING {COLUMNS}"
        );
        let reviewed = sqlx::query_as::<_, InstructorVerification>(&query)
            .bind(id)
            .bind(decision.resulting_status())
            .bind(reviewer_id)
            .bind(note)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(reviewed) = reviewed else {
            return Ok(None);
        };

        if decision == VerificationDecision::Approve {
            sqlx::query("UPDATE users SET role = $2 WHERE id = $1 AND role = $3")
                .bind(reviewed.user_id)
                .bind(ROLE_INSTRUCTOR)
                .bind(ROLE_STUDENT)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(reviewed))
    }
}
