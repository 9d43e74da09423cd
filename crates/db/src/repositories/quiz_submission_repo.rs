//! Repository for the append-only `quiz_submissions` table.

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::quiz_submission::{CreateQuizSubmission, LatestSubmissionRow, QuizSubmission};
use crate::repositories::ProgressRepo;

const COLUMNS: &str = "id, user_id, quiz_id, score, passed, answers, submitted_at";

pub struct QuizSubmissionRepo;

impl QuizSubmissionRepo {
    /// Store a scored submission and set the lesson's completed flag to
    /// `passed` in one transaction. The latest submission decides.
    pub async fn record(
        pool: &PgPool,
        input: &CreateQuizSubmission,
    ) -> Result<QuizSubmission, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO quiz_submissions (user_id, quiz_id, score, passed, answers)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let submission = sqlx::query_as::<_, QuizSubmission>(&query)
            .bind(input.user_id)
            .bind(input.quiz_id)
            .bind(input.score)
            .bind(input.passed)
            .bind(&input.answers)
            .fetch_one(&mut *tx)
            .await?;

        ProgressRepo::write_completed(
            &mut tx,
            input.user_id,
            input.course_id,
            input.lesson_id,
            input.passed,
        )
        .await?;

        tx.commit().await?;
        Ok(submission)
    }

    /// A learner's submissions for one quiz, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        quiz_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QuizSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_submissions
             WHERE user_id = $1 AND quiz_id = $2
             ORDER BY submitted_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, QuizSubmission>(&query)
            .bind(user_id)
            .bind(quiz_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All learners' submissions for one quiz, newest first. Staff view.
    pub async fn list_for_quiz(
        pool: &PgPool,
        quiz_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QuizSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_submissions
             WHERE quiz_id = $1
             ORDER BY submitted_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, QuizSubmission>(&query)
            .bind(quiz_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Latest submission per quiz for a learner across one course.
    pub async fn latest_for_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<LatestSubmissionRow>, sqlx::Error> {
        sqlx::query_as::<_, LatestSubmissionRow>(
            "SELECT DISTINCT ON (s.quiz_id) q.lesson_id, s.score
             FROM quiz_submissions s
             JOIN quizzes q ON q.id = s.quiz_id
             JOIN lessons l ON l.id = q.lesson_id
             JOIN course_modules m ON m.id = l.module_id
             WHERE s.user_id = $1 AND m.course_id = $2
             ORDER BY s.quiz_id, s.submitted_at DESC, s.id DESC",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
