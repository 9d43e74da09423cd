//! Integration tests for module gating, quiz submissions, and completion
//! storage.
//!
//! Exercises the repository layer against a real database to verify that:
//! - The outline loads modules and lessons in position order
//! - A learner with no rows sees every later module locked
//! - The latest submission decides whether a quiz gate is passed
//! - Quiz replacement keeps the quiz id and rewrites its questions
//! - Certificates are unique per learner and course

use std::collections::BTreeSet;

use chrono::Utc;
use gurmania_core::certificate::certificate_code;
use gurmania_core::gating::{is_module_locked, locked_modules, GatingPolicy};
use gurmania_core::types::DbId;
use gurmania_db::models::course::CreateCourse;
use gurmania_db::models::course_module::CreateCourseModule;
use gurmania_db::models::lesson::CreateLesson;
use gurmania_db::models::quiz::{UpsertOption, UpsertQuestion, UpsertQuiz};
use gurmania_db::models::quiz_submission::CreateQuizSubmission;
use gurmania_db::models::user::CreateUser;
use gurmania_db::repositories::certificate_repo::UQ_CERTIFICATE_USER_COURSE;
use gurmania_db::repositories::{
    CertificateRepo, CourseModuleRepo, CourseRepo, LessonRepo, OutlineRepo, ProgressRepo,
    QuizRepo, QuizSubmissionRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            role: Some(role.to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_module(pool: &PgPool, course_id: DbId, title: &str) -> DbId {
    CourseModuleRepo::create(
        pool,
        course_id,
        &CreateCourseModule {
            title: title.to_string(),
            position: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_lesson(pool: &PgPool, module_id: DbId, title: &str) -> DbId {
    LessonRepo::create(
        pool,
        module_id,
        &CreateLesson {
            title: title.to_string(),
            content: Some("Chop, stir, taste.".to_string()),
            video_url: None,
            required_ingredients: Some(vec!["onion".to_string()]),
            position: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn one_question_quiz(passing_score: Option<i32>) -> UpsertQuiz {
    UpsertQuiz {
        title: "Knife basics".to_string(),
        passing_score,
        questions: vec![UpsertQuestion {
            prompt: "Which grip is safest?".to_string(),
            options: vec![
                UpsertOption {
                    label: "Pinch grip".to_string(),
                    is_correct: true,
                },
                UpsertOption {
                    label: "Handle grip".to_string(),
                    is_correct: false,
                },
            ],
        }],
    }
}

/// Course with two modules; module 1 has a quiz lesson (passing score 70).
struct Fixture {
    learner: DbId,
    course_id: DbId,
    module_two: DbId,
    quiz_lesson: DbId,
    quiz_id: DbId,
    second_lesson: DbId,
}

async fn two_module_course(pool: &PgPool) -> Fixture {
    let instructor = new_user(pool, "chef@gurmania.test", "instructor").await;
    let learner = new_user(pool, "learner@gurmania.test", "student").await;

    let course = CourseRepo::create(
        pool,
        instructor,
        &CreateCourse {
            title: "Foundations".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let module_one = new_module(pool, course.id, "Knives").await;
    let module_two = new_module(pool, course.id, "Sauces").await;
    let quiz_lesson = new_lesson(pool, module_one, "Grips").await;
    let second_lesson = new_lesson(pool, module_two, "Mother sauces").await;

    let quiz = QuizRepo::upsert_for_lesson(pool, quiz_lesson, &one_question_quiz(Some(70)))
        .await
        .unwrap();

    Fixture {
        learner,
        course_id: course.id,
        module_two,
        quiz_lesson,
        quiz_id: quiz.quiz.id,
        second_lesson,
    }
}

async fn submit(pool: &PgPool, fx: &Fixture, score: i32) {
    QuizSubmissionRepo::record(
        pool,
        &CreateQuizSubmission {
            user_id: fx.learner,
            quiz_id: fx.quiz_id,
            course_id: fx.course_id,
            lesson_id: fx.quiz_lesson,
            score,
            passed: score >= 70,
            answers: serde_json::json!([]),
        },
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Test: outline order
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_outline_is_ordered_and_carries_quizzes(pool: PgPool) {
    let fx = two_module_course(&pool).await;

    let outline = OutlineRepo::load(&pool, fx.course_id).await.unwrap().unwrap();
    assert_eq!(outline.modules.len(), 2);
    assert_eq!(outline.modules[1].module_id, fx.module_two);
    assert_eq!(outline.lesson_count(), 2);

    let (idx, lesson) = outline.find_lesson(fx.quiz_lesson).unwrap();
    assert_eq!(idx, 0);
    assert_eq!(lesson.quiz.map(|q| q.passing_score), Some(Some(70)));

    let (idx, lesson) = outline.find_lesson(fx.second_lesson).unwrap();
    assert_eq!(idx, 1);
    assert!(lesson.quiz.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_outline_of_deleted_course_is_none(pool: PgPool) {
    let fx = two_module_course(&pool).await;
    CourseRepo::soft_delete(&pool, fx.course_id).await.unwrap();

    assert!(OutlineRepo::load(&pool, fx.course_id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: gating driven by stored rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_learner_without_rows_is_fail_closed(pool: PgPool) {
    let fx = two_module_course(&pool).await;
    let outline = OutlineRepo::load(&pool, fx.course_id).await.unwrap().unwrap();

    let progress = OutlineRepo::load_progress(&pool, &outline, fx.learner)
        .await
        .unwrap();
    assert!(progress.is_empty());
    assert_eq!(
        locked_modules(&outline, &progress, GatingPolicy::QuizzesPassed),
        BTreeSet::from([fx.module_two])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_submission_decides_the_gate(pool: PgPool) {
    let fx = two_module_course(&pool).await;
    let outline = OutlineRepo::load(&pool, fx.course_id).await.unwrap().unwrap();

    submit(&pool, &fx, 60).await;
    let progress = OutlineRepo::load_progress(&pool, &outline, fx.learner)
        .await
        .unwrap();
    assert!(
        is_module_locked(&outline, &progress, GatingPolicy::QuizzesPassed, fx.module_two),
        "a score of 60 must not pass a 70 gate"
    );

    submit(&pool, &fx, 80).await;
    let progress = OutlineRepo::load_progress(&pool, &outline, fx.learner)
        .await
        .unwrap();
    assert!(
        !is_module_locked(&outline, &progress, GatingPolicy::QuizzesPassed, fx.module_two),
        "a later score of 80 unlocks the next module"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submission_and_completed_flag_move_together(pool: PgPool) {
    let fx = two_module_course(&pool).await;
    let quiz_lesson = [fx.quiz_lesson];

    submit(&pool, &fx, 60).await;
    let completed = ProgressRepo::completed_among(&pool, fx.learner, &quiz_lesson)
        .await
        .unwrap();
    assert!(completed.is_empty(), "a failing submission leaves the lesson open");

    submit(&pool, &fx, 80).await;
    let completed = ProgressRepo::completed_among(&pool, fx.learner, &quiz_lesson)
        .await
        .unwrap();
    assert_eq!(completed, vec![fx.quiz_lesson]);

    // A later failing attempt takes the completion back.
    submit(&pool, &fx, 40).await;
    let completed = ProgressRepo::completed_among(&pool, fx.learner, &quiz_lesson)
        .await
        .unwrap();
    assert!(completed.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submission_for_unknown_lesson_stores_nothing(pool: PgPool) {
    let fx = two_module_course(&pool).await;

    // The progress insert fails on the lesson foreign key; the submission
    // insert before it must roll back too.
    let result = QuizSubmissionRepo::record(
        &pool,
        &CreateQuizSubmission {
            user_id: fx.learner,
            quiz_id: fx.quiz_id,
            course_id: fx.course_id,
            lesson_id: DbId::MAX,
            score: 90,
            passed: true,
            answers: serde_json::json!([]),
        },
    )
    .await;
    assert!(result.is_err());

    let stored = QuizSubmissionRepo::list_for_quiz(&pool, fx.quiz_id, 10, 0)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

// ---------------------------------------------------------------------------
// Test: progress rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_completed_sets_flag_immediately(pool: PgPool) {
    let fx = two_module_course(&pool).await;

    let touched = ProgressRepo::touch(&pool, fx.learner, fx.course_id, fx.second_lesson)
        .await
        .unwrap();
    assert!(!touched.completed);

    let done = ProgressRepo::set_completed(&pool, fx.learner, fx.course_id, fx.second_lesson, true)
        .await
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.percent, 100);
    assert_eq!(done.id, touched.id, "the lazily created row is reused");

    let completed = ProgressRepo::completed_lesson_ids(&pool, fx.learner, fx.course_id)
        .await
        .unwrap();
    assert_eq!(completed, vec![fx.second_lesson]);
}

// ---------------------------------------------------------------------------
// Test: quiz replacement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_quiz_upsert_replaces_questions_and_keeps_id(pool: PgPool) {
    let fx = two_module_course(&pool).await;

    let mut replacement = one_question_quiz(None);
    replacement.questions.push(UpsertQuestion {
        prompt: "Salt pasta water?".to_string(),
        options: vec![
            UpsertOption {
                label: "Yes".to_string(),
                is_correct: true,
            },
            UpsertOption {
                label: "No".to_string(),
                is_correct: false,
            },
        ],
    });

    let detail = QuizRepo::upsert_for_lesson(&pool, fx.quiz_lesson, &replacement)
        .await
        .unwrap();
    assert_eq!(detail.quiz.id, fx.quiz_id);
    assert_eq!(detail.quiz.passing_score, None);

    let loaded = QuizRepo::load_detail(&pool, fx.quiz_id).await.unwrap().unwrap();
    assert_eq!(loaded.questions.len(), 2);
    assert_eq!(loaded.questions[1].question.prompt, "Salt pasta water?");

    let key = loaded.answer_key();
    assert_eq!(key.questions.len(), 2);
    assert!(key.questions.iter().all(|q| q.correct_option_ids.len() == 1));
}

// ---------------------------------------------------------------------------
// Test: certificate uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_certificate_is_a_unique_violation(pool: PgPool) {
    let fx = two_module_course(&pool).await;
    let now = Utc::now();
    let code = certificate_code(fx.learner, fx.course_id, now);

    let first = CertificateRepo::create(&pool, fx.learner, fx.course_id, &code, now)
        .await
        .unwrap();

    let later = now + chrono::Duration::seconds(5);
    let second_code = certificate_code(fx.learner, fx.course_id, later);
    let err = CertificateRepo::create(&pool, fx.learner, fx.course_id, &second_code, later)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert!(db_err.is_unique_violation());
            assert_eq!(db_err.constraint(), Some(UQ_CERTIFICATE_USER_COURSE));
        }
        other => panic!("expected a database error, got {other:?}"),
    }

    let stored = CertificateRepo::find_for_user_course(&pool, fx.learner, fx.course_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, first.id);

    let verified = CertificateRepo::verify(&pool, &code).await.unwrap().unwrap();
    assert_eq!(verified.course_title, "Foundations");
    assert_eq!(verified.learner_name, "learner");
}
