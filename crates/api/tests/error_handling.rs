//! How `AppError` values render as HTTP responses. Most cases are pure
//! mapping; the constraint cases provoke real errors from the database.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use gurmania_api::error::{validate_input, violates_unique, AppError};
use gurmania_core::error::CoreError;
use gurmania_db::models::course::CreateCourse;
use gurmania_db::repositories::certificate_repo::UQ_CERTIFICATE_USER_COURSE;
use gurmania_db::repositories::{CertificateRepo, CourseRepo};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn domain_errors_map_to_status_and_code() {
    let cases = [
        (
            CoreError::Validation("Quiz has no questions".into()),
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
        ),
        (
            CoreError::Unauthorized("Missing bearer token".into()),
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
        ),
        (
            CoreError::Forbidden("Enroll in this course first".into()),
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
        ),
        (
            CoreError::Conflict("Workshop is fully booked".into()),
            StatusCode::CONFLICT,
            "CONFLICT",
        ),
    ];

    for (err, expected_status, expected_code) in cases {
        let message = match &err {
            CoreError::Validation(m)
            | CoreError::Unauthorized(m)
            | CoreError::Forbidden(m)
            | CoreError::Conflict(m) => m.clone(),
            other => panic!("unexpected case {other:?}"),
        };
        let (status, json) = render(AppError::Core(err)).await;

        assert_eq!(status, expected_status, "{expected_code}");
        assert_eq!(json["code"], expected_code);
        assert_eq!(json["error"], message);
        // Only gated content carries the flag.
        assert!(json.get("locked").is_none(), "{expected_code}");
    }
}

#[tokio::test]
async fn missing_entity_names_kind_and_id() {
    let (status, json) = render(AppError::Core(CoreError::NotFound {
        entity: "Course",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Course with id 42 not found");
}

#[tokio::test]
async fn gated_content_is_forbidden_and_flagged() {
    let (status, json) = render(AppError::Core(CoreError::Locked(
        "Pass the quizzes in 'Knife skills' first".into(),
    )))
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "LOCKED");
    assert_eq!(json["locked"], true);
    assert_eq!(json["error"], "Pass the quizzes in 'Knife skills' first");
}

#[tokio::test]
async fn blank_course_title_fails_dto_validation() {
    let err = validate_input(&CreateCourse {
        title: String::new(),
        description: None,
    })
    .unwrap_err();

    let (status, json) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn missing_row_is_not_found() {
    let (status, json) = render(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn internal_details_stay_in_the_logs() {
    let (status, json) = render(AppError::InternalError(
        "postgres://gurmania:secret@db/gurmania refused".into(),
    ))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn certificate_conflicts_are_told_apart_by_constraint(pool: PgPool) {
    let (instructor, _) = common::create_user(&pool, "nonna", "instructor").await;
    let (first, _) = common::create_user(&pool, "first", "student").await;
    let (second, _) = common::create_user(&pool, "second", "student").await;
    let course = CourseRepo::create(
        &pool,
        instructor,
        &CreateCourse {
            title: "Gnocchi".into(),
            description: None,
        },
    )
    .await
    .unwrap();
    let now = Utc::now();

    CertificateRepo::create(&pool, first, course.id, "GUR-AAAA-BBBB-CCCC", now)
        .await
        .unwrap();

    // Same learner and course again: the completion flow reads the row back.
    let repeat = CertificateRepo::create(&pool, first, course.id, "GUR-DDDD-EEEE-FFFF", now)
        .await
        .unwrap_err();
    assert!(violates_unique(&repeat, UQ_CERTIFICATE_USER_COURSE));

    // Another learner colliding on the code is not a repeat issue.
    let clash = CertificateRepo::create(&pool, second, course.id, "GUR-AAAA-BBBB-CCCC", now)
        .await
        .unwrap_err();
    assert!(!violates_unique(&clash, UQ_CERTIFICATE_USER_COURSE));
    assert!(violates_unique(&clash, "uq_certificates_code"));

    let (status, json) = render(AppError::Database(clash)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}
