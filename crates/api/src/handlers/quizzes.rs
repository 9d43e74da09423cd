//! Handlers for taking quizzes.
//!
//! Learners see questions without correctness flags and submit answer
//! sheets. Each submission is scored, stored as a new row, and drives the
//! quiz lesson's completion flag.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::error::CoreError;
use gurmania_core::gating::ensure_lesson_accessible;
use gurmania_core::quiz::{collect_answers, score_submission, AnswerEntry, QuizScore};
use gurmania_core::types::DbId;
use gurmania_db::models::quiz::{PublicQuiz, QuizDetail, QuizLocation};
use gurmania_db::models::quiz_submission::{CreateQuizSubmission, QuizSubmission};
use gurmania_db::repositories::{QuizRepo, QuizSubmissionRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{
    ensure_course_learner, load_gate, record_audit, settle_completion, CompletionOutcome,
};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Answer sheet: one entry per answered question.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<AnswerEntry>,
}

/// Staff receive the answer key, learners do not.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuizView {
    Staff(QuizDetail),
    Learner(PublicQuiz),
}

#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub submission: QuizSubmission,
    pub correct: usize,
    pub total: usize,
    #[serde(flatten)]
    pub outcome: CompletionOutcome,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_quiz_location(pool: &PgPool, quiz_id: DbId) -> AppResult<QuizLocation> {
    QuizRepo::find_location(pool, quiz_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Quiz",
            id: quiz_id,
        }))
}

async fn ensure_quiz_detail(pool: &PgPool, quiz_id: DbId) -> AppResult<QuizDetail> {
    QuizRepo::load_detail(pool, quiz_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Quiz",
            id: quiz_id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/quizzes/{id}
///
/// Gated like the quiz's lesson.
pub async fn get_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let location = ensure_quiz_location(&state.pool, quiz_id).await?;
    let access = ensure_course_learner(&state.pool, &auth, location.course_id).await?;

    let detail = ensure_quiz_detail(&state.pool, quiz_id).await?;
    if access.is_staff {
        return Ok(Json(DataResponse {
            data: QuizView::Staff(detail),
        }));
    }

    let (outline, progress) = load_gate(&state.pool, location.course_id, auth.user_id).await?;
    ensure_lesson_accessible(
        &outline,
        &progress,
        state.config.gating_policy,
        location.lesson_id,
    )?;

    Ok(Json(DataResponse {
        data: QuizView::Learner(PublicQuiz::from(detail)),
    }))
}

/// POST /api/v1/quizzes/{id}/submit
///
/// Score an answer sheet. Malformed sheets (unknown question, option from
/// another question, duplicate question) are rejected with 400 before
/// anything is stored.
pub async fn submit_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<DbId>,
    Json(input): Json<SubmitQuizRequest>,
) -> AppResult<impl IntoResponse> {
    let location = ensure_quiz_location(&state.pool, quiz_id).await?;
    let course_id = location.course_id;
    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;

    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;
    if !access.is_staff {
        ensure_lesson_accessible(
            &outline,
            &progress,
            state.config.gating_policy,
            location.lesson_id,
        )?;
    }

    let detail = ensure_quiz_detail(&state.pool, quiz_id).await?;
    let sheet = collect_answers(&input.answers)?;
    let QuizScore {
        score,
        passed,
        correct,
        total,
    } = score_submission(&detail.answer_key(), &sheet)?;

    let answers = serde_json::to_value(&input.answers)
        .map_err(|e| AppError::InternalError(format!("Failed to encode answers: {e}")))?;
    let submission = QuizSubmissionRepo::record(
        &state.pool,
        &CreateQuizSubmission {
            user_id: auth.user_id,
            quiz_id,
            course_id,
            lesson_id: location.lesson_id,
            score,
            passed,
            answers,
        },
    )
    .await?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::QuizSubmitted {
            quiz_id,
            lesson_id: location.lesson_id,
            score,
            passed,
        },
    )
    .await;

    tracing::info!(
        quiz_id,
        course_id,
        user_id = auth.user_id,
        score,
        passed,
        "Quiz submitted",
    );

    let outcome = settle_completion(&state.pool, &outline, auth.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionResult {
                submission,
                correct,
                total,
                outcome,
            },
        }),
    ))
}

/// GET /api/v1/quizzes/{id}/submissions
///
/// Staff see every learner's submissions; learners see their own.
pub async fn list_submissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let location = ensure_quiz_location(&state.pool, quiz_id).await?;
    let access = ensure_course_learner(&state.pool, &auth, location.course_id).await?;
    let (limit, offset) = params.resolve();

    let submissions = if access.is_staff {
        QuizSubmissionRepo::list_for_quiz(&state.pool, quiz_id, limit, offset).await?
    } else {
        QuizSubmissionRepo::list_for_user(&state.pool, auth.user_id, quiz_id, limit, offset)
            .await?
    };

    Ok(Json(DataResponse { data: submissions }))
}
