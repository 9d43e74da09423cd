//! Repository for `quizzes`, `quiz_questions`, and `quiz_options`.
//!
//! A quiz is always written as a whole: the authoring upsert replaces every
//! question and option inside one transaction.

use std::collections::HashMap;

use gurmania_core::types::DbId;
use sqlx::PgPool;

use crate::models::quiz::{
    QuestionWithOptions, Quiz, QuizDetail, QuizLocation, QuizOption, QuizQuestion, UpsertQuiz,
};

const QUIZ_COLUMNS: &str = "id, lesson_id, title, passing_score, created_at, updated_at";
const QUESTION_COLUMNS: &str = "id, quiz_id, prompt, position";
const OPTION_COLUMNS: &str = "id, question_id, label, is_correct, position";

pub struct QuizRepo;

impl QuizRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quiz>, sqlx::Error> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1");
        sqlx::query_as::<_, Quiz>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_lesson(pool: &PgPool, lesson_id: DbId) -> Result<Option<Quiz>, sqlx::Error> {
        let query = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE lesson_id = $1");
        sqlx::query_as::<_, Quiz>(&query)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the lesson, module, and course owning a quiz.
    pub async fn find_location(
        pool: &PgPool,
        quiz_id: DbId,
    ) -> Result<Option<QuizLocation>, sqlx::Error> {
        sqlx::query_as::<_, QuizLocation>(
            "SELECT q.id AS quiz_id, q.lesson_id, l.module_id, m.course_id
             FROM quizzes q
             JOIN lessons l ON l.id = q.lesson_id
             JOIN course_modules m ON m.id = l.module_id
             JOIN courses c ON c.id = m.course_id
             WHERE q.id = $1 AND c.deleted_at IS NULL",
        )
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
    }

    /// Load a quiz with its questions and options in display order.
    pub async fn load_detail(pool: &PgPool, quiz_id: DbId) -> Result<Option<QuizDetail>, sqlx::Error> {
        let Some(quiz) = Self::find_by_id(pool, quiz_id).await? else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE quiz_id = $1 ORDER BY position, id"
        );
        let questions = sqlx::query_as::<_, QuizQuestion>(&query)
            .bind(quiz_id)
            .fetch_all(pool)
            .await?;

        let question_ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();
        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM quiz_options
             WHERE question_id = ANY($1)
             ORDER BY question_id, position, id"
        );
        let options = sqlx::query_as::<_, QuizOption>(&query)
            .bind(&question_ids)
            .fetch_all(pool)
            .await?;

        let mut by_question: HashMap<DbId, Vec<QuizOption>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }

        let questions = questions
            .into_iter()
            .map(|question| QuestionWithOptions {
                options: by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect();

        Ok(Some(QuizDetail { quiz, questions }))
    }

    /// Create or fully replace the quiz attached to `lesson_id`.
    ///
    /// The quiz row keeps its id across replacements so submission history
    /// stays attached; questions and options are recreated.
    pub async fn upsert_for_lesson(
        pool: &PgPool,
        lesson_id: DbId,
        input: &UpsertQuiz,
    ) -> Result<QuizDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO quizzes (lesson_id, title, passing_score)
             VALUES ($1, $2, $3)
             ON CONFLICT (lesson_id) DO UPDATE
             SET title = EXCLUDED.title, passing_score = EXCLUDED.passing_score
             RETURNING {QUIZ_COLUMNS}"
        );
        let quiz = sqlx::query_as::<_, Quiz>(&query)
            .bind(lesson_id)
            .bind(&input.title)
            .bind(input.passing_score)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM quiz_questions WHERE quiz_id = $1")
            .bind(quiz.id)
            .execute(&mut *tx)
            .await?;

        let question_sql = format!(
            "INSERT INTO quiz_questions (quiz_id, prompt, position)
             VALUES ($1, $2, $3)
             RETURNING {QUESTION_COLUMNS}"
        );
        let option_sql = format!(
            "INSERT INTO quiz_options (question_id, label, is_correct, position)
             VALUES ($1, $2, $3, $4)
             RETURNING {OPTION_COLUMNS}"
        );

        let mut questions = Vec::with_capacity(input.questions.len());
        for (q_pos, q) in input.questions.iter().enumerate() {
            let question = sqlx::query_as::<_, QuizQuestion>(&question_sql)
                .bind(quiz.id)
                .bind(&q.prompt)
                .bind(q_pos as i32)
                .fetch_one(&mut *tx)
                .await?;

            let mut options = Vec::with_capacity(q.options.len());
            for (o_pos, o) in q.options.iter().enumerate() {
                let option = sqlx::query_as::<_, QuizOption>(&option_sql)
                    .bind(question.id)
                    .bind(&o.label)
                    .bind(o.is_correct)
                    .bind(o_pos as i32)
                    .fetch_one(&mut *tx)
                    .await?;
                options.push(option);
            }
            questions.push(QuestionWithOptions { question, options });
        }

        tx.commit().await?;
        Ok(QuizDetail { quiz, questions })
    }

    /// Remove the quiz from a lesson. Submissions cascade with it.
    pub async fn delete_for_lesson(pool: &PgPool, lesson_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quizzes WHERE lesson_id = $1")
            .bind(lesson_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
