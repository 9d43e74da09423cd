//! HTTP-level integration tests for lesson discussions, instructor
//! verification, and the admin audit trail.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, create_user, delete_auth, get_auth, post_auth, post_json_auth};
use gurmania_core::types::DbId;
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn data_id(app: &Router, uri: &str, token: &str, body: Value) -> DbId {
    let response = post_json_auth(app.clone(), uri, token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// A published one-lesson course; returns `(course_id, lesson_id)`.
async fn single_lesson_course(app: &Router, instructor: &str) -> (DbId, DbId) {
    let course_id = data_id(app, "/api/v1/courses", instructor, json!({ "title": "Bread" })).await;
    let module_id = data_id(
        app,
        &format!("/api/v1/courses/{course_id}/modules"),
        instructor,
        json!({ "title": "Starter" }),
    )
    .await;
    let lesson_id = data_id(
        app,
        &format!("/api/v1/courses/{course_id}/modules/{module_id}/lessons"),
        instructor,
        json!({ "title": "Feeding the starter" }),
    )
    .await;
    let response = post_auth(app.clone(), &format!("/api/v1/courses/{course_id}/publish"), instructor).await;
    assert_eq!(response.status(), StatusCode::OK);
    (course_id, lesson_id)
}

async fn enroll(app: &Router, course_id: DbId, token: &str) {
    let response = post_auth(app.clone(), &format!("/api/v1/courses/{course_id}/enroll"), token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn comment_count(app: &Router, lesson_id: DbId, token: &str) -> usize {
    let response = get_auth(app.clone(), &format!("/api/v1/lessons/{lesson_id}/comments"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].as_array().unwrap().len()
}

// ---------------------------------------------------------------------------
// Discussion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn comments_are_hidden_until_approved(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, instructor) = create_user(&pool, "baker", "instructor").await;
    let (_, author) = create_user(&pool, "author", "student").await;
    let (_, reader) = create_user(&pool, "reader", "student").await;
    let (course_id, lesson_id) = single_lesson_course(&app, &instructor).await;
    enroll(&app, course_id, &author).await;
    enroll(&app, course_id, &reader).await;

    let uri = format!("/api/v1/lessons/{lesson_id}/comments");
    let response = post_json_auth(app.clone(), &uri, &author, json!({ "body": "  Mine bubbled!  " })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["body"], "Mine bubbled!");
    let comment_id = json["data"]["id"].as_i64().unwrap();

    assert_eq!(comment_count(&app, lesson_id, &author).await, 1);
    assert_eq!(comment_count(&app, lesson_id, &reader).await, 0);
    assert_eq!(comment_count(&app, lesson_id, &instructor).await, 1);

    // Learners cannot moderate.
    let moderate_uri = format!("/api/v1/comments/{comment_id}/moderate");
    let response = post_json_auth(app.clone(), &moderate_uri, &reader, json!({ "decision": "approve" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.clone(), &moderate_uri, &instructor, json!({ "decision": "approve" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    assert_eq!(comment_count(&app, lesson_id, &reader).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_comment_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, instructor) = create_user(&pool, "baker", "instructor").await;
    let (_, student) = create_user(&pool, "quiet", "student").await;
    let (course_id, lesson_id) = single_lesson_course(&app, &instructor).await;
    enroll(&app, course_id, &student).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/lessons/{lesson_id}/comments"),
        &student,
        json!({ "body": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_author_or_moderator_deletes_comment(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, instructor) = create_user(&pool, "baker", "instructor").await;
    let (_, author) = create_user(&pool, "author", "student").await;
    let (_, other) = create_user(&pool, "other", "student").await;
    let (course_id, lesson_id) = single_lesson_course(&app, &instructor).await;
    enroll(&app, course_id, &author).await;

    let comment_id = data_id(
        &app,
        &format!("/api/v1/lessons/{lesson_id}/comments"),
        &author,
        json!({ "body": "Too sour?" }),
    )
    .await;
    let uri = format!("/api/v1/comments/{comment_id}");

    let response = delete_auth(app.clone(), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app, &uri, &author).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Instructor verification
// ---------------------------------------------------------------------------

const MOTIVATION: &str = "Ten years on the line at a trattoria in Bologna.";

#[sqlx::test(migrations = "../../db/migrations")]
async fn approved_applicant_becomes_instructor(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = create_user(&pool, "admin", "admin").await;
    let (applicant_id, applicant) = create_user(&pool, "aspiring", "student").await;

    let verification_id = data_id(
        &app,
        "/api/v1/instructor-verifications",
        &applicant,
        json!({ "motivation": MOTIVATION }),
    )
    .await;

    // One pending request at a time.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/instructor-verifications",
        &applicant,
        json!({ "motivation": MOTIVATION }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let review_uri = format!("/api/v1/admin/instructor-verifications/{verification_id}/review");
    let response = post_json_auth(app.clone(), &review_uri, &admin, json!({ "decision": "approve" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    // Already decided.
    let response = post_json_auth(app.clone(), &review_uri, &admin, json!({ "decision": "approve" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/users?role=instructor", &admin).await).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["id"].as_i64())
        .collect();
    assert!(ids.contains(&applicant_id));

    let json = body_json(
        get_auth(app, "/api/v1/admin/audit-logs?action_type=verification_reviewed", &admin).await,
    )
    .await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["entity_id"], verification_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejection_requires_a_note(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = create_user(&pool, "admin", "admin").await;
    let (_, applicant) = create_user(&pool, "hopeful", "student").await;

    let verification_id = data_id(
        &app,
        "/api/v1/instructor-verifications",
        &applicant,
        json!({ "motivation": MOTIVATION }),
    )
    .await;
    let review_uri = format!("/api/v1/admin/instructor-verifications/{verification_id}/review");

    let response = post_json_auth(app.clone(), &review_uri, &admin, json!({ "decision": "reject" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        &review_uri,
        &admin,
        json!({ "decision": "reject", "note": "Please add a portfolio." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "rejected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn instructors_cannot_apply_again(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, instructor) = create_user(&pool, "already", "instructor").await;

    let response = post_json_auth(
        app,
        "/api/v1/instructor-verifications",
        &instructor,
        json!({ "motivation": MOTIVATION }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn audit_log_rejects_inverted_range(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = create_user(&pool, "admin", "admin").await;

    let response = get_auth(
        app,
        "/api/v1/admin/audit-logs?from=2026-05-02T00:00:00Z&to=2026-05-01T00:00:00Z",
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_counts_platform_activity(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = create_user(&pool, "admin", "admin").await;
    let (_, instructor) = create_user(&pool, "baker", "instructor").await;
    let (_, student) = create_user(&pool, "learner", "student").await;
    let (course_id, _) = single_lesson_course(&app, &instructor).await;
    enroll(&app, course_id, &student).await;

    let response = get_auth(app, "/api/v1/admin/dashboard", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["totals"]["users"], 3);
    assert_eq!(json["data"]["totals"]["published_courses"], 1);
    assert_eq!(json["data"]["totals"]["enrollments"], 1);
    assert!(json["data"]["totals"]["average_quiz_score"].is_null());
}
