//! Handlers for the course tree: modules, lessons, quiz authoring, and the
//! learner-facing curriculum with its gating state.
//!
//! Learners reach lessons only through modules the gating evaluator leaves
//! unlocked. The course instructor and admins bypass gating.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::completion::{
    completion_mode, course_completion, ensure_direct_completion, CompletionMode,
    CourseCompletion,
};
use gurmania_core::error::CoreError;
use gurmania_core::gating::{ensure_lesson_accessible, is_module_locked, locked_modules};
use gurmania_core::quiz::{validate_passing_score, validate_question_shape};
use gurmania_core::types::DbId;
use gurmania_db::models::certificate::Certificate;
use gurmania_db::models::course_module::{CourseModule, CreateCourseModule, UpdateCourseModule};
use gurmania_db::models::lesson::{CreateLesson, Lesson, LessonLocation, UpdateLesson};
use gurmania_db::models::progress::Progress;
use gurmania_db::models::quiz::{PublicQuiz, UpsertQuiz};
use gurmania_db::repositories::{CertificateRepo, CourseModuleRepo, LessonRepo, ProgressRepo, QuizRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{validate_input, AppError, AppResult};
use crate::handlers::access::{
    ensure_course_learner, ensure_course_staff, load_gate, record_audit, settle_completion,
    CompletionOutcome,
};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One lesson row in the curriculum tree.
#[derive(Debug, Serialize)]
pub struct CurriculumLesson {
    pub id: DbId,
    pub title: String,
    pub position: i32,
    pub quiz_id: Option<DbId>,
    pub completion_mode: CompletionMode,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct CurriculumModule {
    #[serde(flatten)]
    pub module: CourseModule,
    pub locked: bool,
    pub lessons: Vec<CurriculumLesson>,
}

#[derive(Debug, Serialize)]
pub struct Curriculum {
    pub course_id: DbId,
    pub modules: Vec<CurriculumModule>,
}

/// Learner progress summary for one course.
#[derive(Debug, Serialize)]
pub struct CourseProgress {
    pub course_id: DbId,
    #[serde(flatten)]
    pub completion: CourseCompletion,
    pub locked_module_ids: Vec<DbId>,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Serialize)]
pub struct ModuleLock {
    pub module_id: DbId,
    pub locked: bool,
}

/// Lesson detail as served to the player.
#[derive(Debug, Serialize)]
pub struct LessonView {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub quiz: Option<PublicQuiz>,
    pub completion_mode: CompletionMode,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct LessonCompletion {
    pub progress: Progress,
    #[serde(flatten)]
    pub outcome: CompletionOutcome,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a lesson and make sure it belongs to `course_id`.
async fn ensure_lesson_in_course(
    pool: &PgPool,
    course_id: DbId,
    lesson_id: DbId,
) -> AppResult<LessonLocation> {
    LessonRepo::find_location(pool, lesson_id)
        .await?
        .filter(|loc| loc.course_id == course_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))
}

async fn ensure_module_in_course(
    pool: &PgPool,
    course_id: DbId,
    module_id: DbId,
) -> AppResult<CourseModule> {
    CourseModuleRepo::find_by_id(pool, module_id)
        .await?
        .filter(|m| m.course_id == course_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }))
}

async fn ensure_lesson_exists(pool: &PgPool, lesson_id: DbId) -> AppResult<Lesson> {
    LessonRepo::find_by_id(pool, lesson_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{id}/modules
pub async fn create_module(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateCourseModule>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    ensure_course_staff(&state.pool, &auth, course_id).await?;

    let module = CourseModuleRepo::create(&state.pool, course_id, &input).await?;

    tracing::info!(course_id, module_id = module.id, user_id = auth.user_id, "Module created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

/// PUT /api/v1/courses/{id}/modules/{module_id}
pub async fn update_module(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCourseModule>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_module_in_course(&state.pool, course_id, module_id).await?;

    let module = CourseModuleRepo::update(&state.pool, module_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }))?;

    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/courses/{id}/modules/{module_id}
///
/// Removes the module with its lessons and their quizzes.
pub async fn delete_module(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_module_in_course(&state.pool, course_id, module_id).await?;

    CourseModuleRepo::delete(&state.pool, module_id).await?;

    tracing::info!(course_id, module_id, user_id = auth.user_id, "Module deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/courses/{id}/modules/{module_id}/lock
pub async fn get_module_lock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;
    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;

    if outline.module_index(module_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }));
    }

    let locked = !access.is_staff
        && is_module_locked(&outline, &progress, state.config.gating_policy, module_id);

    Ok(Json(DataResponse {
        data: ModuleLock { module_id, locked },
    }))
}

// ---------------------------------------------------------------------------
// Lessons
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{id}/modules/{module_id}/lessons
pub async fn create_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateLesson>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_module_in_course(&state.pool, course_id, module_id).await?;

    let lesson = LessonRepo::create(&state.pool, module_id, &input).await?;

    tracing::info!(
        course_id,
        module_id,
        lesson_id = lesson.id,
        user_id = auth.user_id,
        "Lesson created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

/// GET /api/v1/courses/{id}/lessons/{lesson_id}
///
/// Learners get 403 with `locked: true` while the lesson's module is gated.
/// A successful view records a progress row for the lesson.
pub async fn get_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;
    ensure_lesson_in_course(&state.pool, course_id, lesson_id).await?;

    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;
    let completed = outline
        .find_lesson(lesson_id)
        .is_some_and(|(_, l)| progress.is_lesson_complete(l));

    if !access.is_staff {
        if let Err(e) =
            ensure_lesson_accessible(&outline, &progress, state.config.gating_policy, lesson_id)
        {
            tracing::debug!(course_id, lesson_id, user_id = auth.user_id, "Lesson is gated");
            return Err(e.into());
        }
        ProgressRepo::touch(&state.pool, auth.user_id, course_id, lesson_id).await?;
    }

    let lesson = ensure_lesson_exists(&state.pool, lesson_id).await?;
    let quiz = match QuizRepo::find_by_lesson(&state.pool, lesson_id).await? {
        Some(quiz) => QuizRepo::load_detail(&state.pool, quiz.id)
            .await?
            .map(PublicQuiz::from),
        None => None,
    };

    Ok(Json(DataResponse {
        data: LessonView {
            completion_mode: completion_mode(&outline, lesson_id)?,
            completed,
            quiz,
            lesson,
        },
    }))
}

/// PUT /api/v1/courses/{id}/lessons/{lesson_id}
pub async fn update_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateLesson>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_lesson_in_course(&state.pool, course_id, lesson_id).await?;

    let lesson = LessonRepo::update(&state.pool, lesson_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))?;

    Ok(Json(DataResponse { data: lesson }))
}

/// DELETE /api/v1/courses/{id}/lessons/{lesson_id}
pub async fn delete_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_lesson_in_course(&state.pool, course_id, lesson_id).await?;

    LessonRepo::delete(&state.pool, lesson_id).await?;

    tracing::info!(course_id, lesson_id, user_id = auth.user_id, "Lesson deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/courses/{id}/lessons/{lesson_id}/complete
///
/// Mark a quizless lesson complete. Quiz lessons complete by passing their
/// quiz and are rejected here with 400. Finishing the last lesson issues the
/// course certificate.
pub async fn complete_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;
    ensure_lesson_in_course(&state.pool, course_id, lesson_id).await?;

    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;
    if access.is_staff {
        if completion_mode(&outline, lesson_id)? != CompletionMode::Direct {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Lesson {lesson_id} has a quiz and completes when the quiz is passed"
            ))));
        }
    } else {
        ensure_direct_completion(&outline, &progress, state.config.gating_policy, lesson_id)?;
    }

    let row = ProgressRepo::set_completed(&state.pool, auth.user_id, course_id, lesson_id, true)
        .await?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::LessonCompleted {
            course_id,
            lesson_id,
        },
    )
    .await;

    let outcome = settle_completion(&state.pool, &outline, auth.user_id).await?;

    tracing::info!(
        course_id,
        lesson_id,
        user_id = auth.user_id,
        percent = outcome.course.percent,
        "Lesson completed",
    );

    Ok(Json(DataResponse {
        data: LessonCompletion {
            progress: row,
            outcome,
        },
    }))
}

// ---------------------------------------------------------------------------
// Quiz authoring
// ---------------------------------------------------------------------------

/// PUT /api/v1/courses/{id}/lessons/{lesson_id}/quiz
///
/// Create or fully replace the lesson's quiz. The quiz keeps its id across
/// replacements; questions and options are rewritten.
pub async fn upsert_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpsertQuiz>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    validate_passing_score(input.passing_score)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    for (idx, question) in input.questions.iter().enumerate() {
        let correct = question.options.iter().filter(|o| o.is_correct).count();
        validate_question_shape(question.options.len(), correct).map_err(|e| {
            AppError::Core(CoreError::Validation(format!("Question {}: {e}", idx + 1)))
        })?;
    }

    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_lesson_in_course(&state.pool, course_id, lesson_id).await?;

    let detail = QuizRepo::upsert_for_lesson(&state.pool, lesson_id, &input).await?;

    tracing::info!(
        course_id,
        lesson_id,
        quiz_id = detail.quiz.id,
        questions = detail.questions.len(),
        user_id = auth.user_id,
        "Quiz saved",
    );

    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/courses/{id}/lessons/{lesson_id}/quiz
pub async fn delete_quiz(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_course_staff(&state.pool, &auth, course_id).await?;
    ensure_lesson_in_course(&state.pool, course_id, lesson_id).await?;

    if !QuizRepo::delete_for_lesson(&state.pool, lesson_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Quiz for lesson",
            id: lesson_id,
        }));
    }

    tracing::info!(course_id, lesson_id, user_id = auth.user_id, "Quiz deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Learner views
// ---------------------------------------------------------------------------

/// GET /api/v1/courses/{id}/curriculum
///
/// The module/lesson tree with lock and completion flags for the caller.
pub async fn get_curriculum(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;
    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;

    let locked = if access.is_staff {
        BTreeSet::new()
    } else {
        locked_modules(&outline, &progress, state.config.gating_policy)
    };

    let modules = CourseModuleRepo::list_by_course(&state.pool, course_id).await?;
    let mut by_module: HashMap<DbId, Vec<Lesson>> = HashMap::new();
    for lesson in LessonRepo::list_by_course(&state.pool, course_id).await? {
        by_module.entry(lesson.module_id).or_default().push(lesson);
    }

    let tree = modules
        .into_iter()
        .map(|module| {
            let lessons = by_module
                .remove(&module.id)
                .unwrap_or_default()
                .into_iter()
                .map(|lesson| {
                    let gate = outline.find_lesson(lesson.id).map(|(_, l)| l);
                    let quiz_id = gate.and_then(|l| l.quiz).map(|q| q.quiz_id);
                    CurriculumLesson {
                        completion_mode: if quiz_id.is_some() {
                            CompletionMode::QuizDerived
                        } else {
                            CompletionMode::Direct
                        },
                        quiz_id,
                        completed: gate.is_some_and(|l| progress.is_lesson_complete(l)),
                        id: lesson.id,
                        title: lesson.title,
                        position: lesson.position,
                    }
                })
                .collect();

            CurriculumModule {
                locked: locked.contains(&module.id),
                module,
                lessons,
            }
        })
        .collect();

    Ok(Json(DataResponse {
        data: Curriculum {
            course_id,
            modules: tree,
        },
    }))
}

/// GET /api/v1/courses/{id}/progress
pub async fn get_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let access = ensure_course_learner(&state.pool, &auth, course_id).await?;
    let (outline, progress) = load_gate(&state.pool, course_id, auth.user_id).await?;

    let locked_module_ids = if access.is_staff {
        Vec::new()
    } else {
        locked_modules(&outline, &progress, state.config.gating_policy)
            .into_iter()
            .collect()
    };
    let certificate =
        CertificateRepo::find_for_user_course(&state.pool, auth.user_id, course_id).await?;

    Ok(Json(DataResponse {
        data: CourseProgress {
            course_id,
            completion: course_completion(&outline, &progress),
            locked_module_ids,
            certificate,
        },
    }))
}
