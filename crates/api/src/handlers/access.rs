//! Course access checks, gating state, and completion follow-ups shared by
//! the course, curriculum, quiz, comment, and certificate handlers.

use gurmania_core::audit::AuditPayload;
use gurmania_core::certificate::certificate_code;
use gurmania_core::completion::{completion_effects, course_completion, CourseCompletion};
use gurmania_core::error::CoreError;
use gurmania_core::gating::{CourseOutline, LearnerProgress};
use gurmania_core::types::DbId;
use gurmania_db::models::audit::CreateAuditLog;
use gurmania_db::models::certificate::Certificate;
use gurmania_db::models::course::Course;
use gurmania_db::repositories::certificate_repo::UQ_CERTIFICATE_USER_COURSE;
use gurmania_db::repositories::{
    AuditLogRepo, CertificateRepo, CourseRepo, EnrollmentRepo, OutlineRepo, ReviewRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{violates_unique, AppError, AppResult};
use crate::middleware::auth::AuthUser;

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// Load a non-deleted course or fail with 404.
pub async fn ensure_course_exists(pool: &PgPool, course_id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))
}

/// Load a course the caller may author (its instructor or an admin).
pub async fn ensure_course_staff(
    pool: &PgPool,
    auth: &AuthUser,
    course_id: DbId,
) -> AppResult<Course> {
    let course = ensure_course_exists(pool, course_id).await?;
    if !auth.is_staff_for(course.instructor_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the course instructor or an admin may change this course".into(),
        )));
    }
    Ok(course)
}

/// A course as seen by one caller.
#[derive(Debug)]
pub struct CourseAccess {
    pub course: Course,
    /// Instructor of the course or an admin. Staff bypass gating and
    /// enrollment.
    pub is_staff: bool,
}

/// Load a course the caller may see: staff always, everyone else only while
/// it is published.
pub async fn ensure_course_visible(
    pool: &PgPool,
    auth: &AuthUser,
    course_id: DbId,
) -> AppResult<CourseAccess> {
    let course = ensure_course_exists(pool, course_id).await?;
    let is_staff = auth.is_staff_for(course.instructor_id);
    if !is_staff && !course.is_published {
        // Drafts are indistinguishable from missing courses for learners.
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }));
    }
    Ok(CourseAccess { course, is_staff })
}

/// Like [`ensure_course_visible`], but learners must also be enrolled.
pub async fn ensure_course_learner(
    pool: &PgPool,
    auth: &AuthUser,
    course_id: DbId,
) -> AppResult<CourseAccess> {
    let access = ensure_course_visible(pool, auth, course_id).await?;
    if !access.is_staff && !EnrollmentRepo::is_enrolled(pool, auth.user_id, course_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Enroll in this course first".into(),
        )));
    }
    Ok(access)
}

// ---------------------------------------------------------------------------
// Gating state
// ---------------------------------------------------------------------------

/// Load a course outline or fail with 404.
pub async fn load_outline(pool: &PgPool, course_id: DbId) -> AppResult<CourseOutline> {
    OutlineRepo::load(pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))
}

/// Outline plus one learner's progress in it.
pub async fn load_gate(
    pool: &PgPool,
    course_id: DbId,
    user_id: DbId,
) -> AppResult<(CourseOutline, LearnerProgress)> {
    let outline = load_outline(pool, course_id).await?;
    let progress = OutlineRepo::load_progress(pool, &outline, user_id).await?;
    Ok((outline, progress))
}

// ---------------------------------------------------------------------------
// Completion follow-ups
// ---------------------------------------------------------------------------

/// Course-level state after a lesson changed.
#[derive(Debug, Serialize)]
pub struct CompletionOutcome {
    pub course: CourseCompletion,
    /// Present once every lesson is complete.
    pub certificate: Option<Certificate>,
    /// The learner finished the course and has not reviewed it yet.
    pub prompt_review: bool,
}

/// Re-evaluate course completion for `user_id` and, when the course is
/// finished, issue the certificate and decide on the review prompt.
pub async fn settle_completion(
    pool: &PgPool,
    outline: &CourseOutline,
    user_id: DbId,
) -> AppResult<CompletionOutcome> {
    let progress = OutlineRepo::load_progress(pool, outline, user_id).await?;
    let course = course_completion(outline, &progress);

    let has_review = if course.is_complete {
        ReviewRepo::exists(pool, user_id, outline.course_id).await?
    } else {
        false
    };
    let effects = completion_effects(&course, has_review);

    let certificate = if effects.issue_certificate {
        Some(issue_or_fetch_certificate(pool, user_id, outline.course_id).await?)
    } else {
        None
    };

    Ok(CompletionOutcome {
        course,
        certificate,
        prompt_review: effects.prompt_review,
    })
}

/// Issue the course certificate. An existing certificate counts as success
/// and is returned unchanged.
pub async fn issue_or_fetch_certificate(
    pool: &PgPool,
    user_id: DbId,
    course_id: DbId,
) -> AppResult<Certificate> {
    let issued_at = chrono::Utc::now();
    let code = certificate_code(user_id, course_id, issued_at);

    match CertificateRepo::create(pool, user_id, course_id, &code, issued_at).await {
        Ok(certificate) => {
            tracing::info!(
                user_id,
                course_id,
                certificate_id = certificate.id,
                "Certificate issued",
            );
            record_audit(
                pool,
                user_id,
                AuditPayload::CertificateIssued {
                    certificate_id: certificate.id,
                    course_id,
                    code: certificate.code.clone(),
                },
            )
            .await;
            Ok(certificate)
        }
        // A clash on the code itself is a different failure and propagates.
        Err(err) if violates_unique(&err, UQ_CERTIFICATE_USER_COURSE) => {
            CertificateRepo::find_for_user_course(pool, user_id, course_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError("Certificate conflict without a stored row".into())
                })
        }
        Err(err) => Err(err.into()),
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Append an audit entry. A failed write is logged and does not fail the
/// request that triggered it.
pub async fn record_audit(pool: &PgPool, actor_id: DbId, payload: AuditPayload) {
    let action_type = payload.action_type();
    let entry = CreateAuditLog {
        actor_id: Some(actor_id),
        payload,
    };
    if let Err(e) = AuditLogRepo::insert(pool, &entry).await {
        tracing::warn!(error = %e, actor_id, action_type, "Failed to write audit log");
    }
}
