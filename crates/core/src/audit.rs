//! Audit trail action types and typed payloads.
//!
//! Every audited action has its own payload variant so consumers can match
//! on it instead of digging through untyped JSON. The payload is stored as
//! JSONB next to the denormalised action/entity columns used for filtering.

use serde::{Deserialize, Serialize};

use crate::moderation::ModerationDecision;
use crate::types::DbId;
use crate::verification::VerificationDecision;

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types (`audit_logs.action_type`).
pub mod action_types {
    pub const COURSE_ENROLLED: &str = "course_enrolled";
    pub const COURSE_PUBLISHED: &str = "course_published";
    pub const LESSON_COMPLETED: &str = "lesson_completed";
    pub const QUIZ_SUBMITTED: &str = "quiz_submitted";
    pub const CERTIFICATE_ISSUED: &str = "certificate_issued";
    pub const WORKSHOP_STARTED: &str = "workshop_started";
    pub const WORKSHOP_RESERVED: &str = "workshop_reserved";
    pub const RESERVATION_CANCELLED: &str = "reservation_cancelled";
    pub const COMMENT_MODERATED: &str = "comment_moderated";
    pub const VERIFICATION_REVIEWED: &str = "verification_reviewed";
}

/// Entity type names (`audit_logs.entity_type`).
pub mod entity_types {
    pub const COURSE: &str = "course";
    pub const LESSON: &str = "lesson";
    pub const QUIZ: &str = "quiz";
    pub const CERTIFICATE: &str = "certificate";
    pub const WORKSHOP: &str = "workshop";
    pub const COMMENT: &str = "comment";
    pub const VERIFICATION: &str = "instructor_verification";
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Typed details of one audited action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditPayload {
    CourseEnrolled {
        course_id: DbId,
    },
    CoursePublished {
        course_id: DbId,
        published: bool,
    },
    LessonCompleted {
        course_id: DbId,
        lesson_id: DbId,
    },
    QuizSubmitted {
        quiz_id: DbId,
        lesson_id: DbId,
        score: i32,
        passed: bool,
    },
    CertificateIssued {
        certificate_id: DbId,
        course_id: DbId,
        code: String,
    },
    WorkshopStarted {
        workshop_id: DbId,
    },
    WorkshopReserved {
        workshop_id: DbId,
        reservation_id: DbId,
    },
    ReservationCancelled {
        workshop_id: DbId,
        reservation_id: DbId,
    },
    CommentModerated {
        comment_id: DbId,
        decision: ModerationDecision,
    },
    VerificationReviewed {
        verification_id: DbId,
        applicant_id: DbId,
        decision: VerificationDecision,
    },
}

impl AuditPayload {
    /// The `action_type` column value for this payload.
    pub fn action_type(&self) -> &'static str {
        use action_types::*;
        match self {
            Self::CourseEnrolled { .. } => COURSE_ENROLLED,
            Self::CoursePublished { .. } => COURSE_PUBLISHED,
            Self::LessonCompleted { .. } => LESSON_COMPLETED,
            Self::QuizSubmitted { .. } => QUIZ_SUBMITTED,
            Self::CertificateIssued { .. } => CERTIFICATE_ISSUED,
            Self::WorkshopStarted { .. } => WORKSHOP_STARTED,
            Self::WorkshopReserved { .. } => WORKSHOP_RESERVED,
            Self::ReservationCancelled { .. } => RESERVATION_CANCELLED,
            Self::CommentModerated { .. } => COMMENT_MODERATED,
            Self::VerificationReviewed { .. } => VERIFICATION_REVIEWED,
        }
    }

    /// The `(entity_type, entity_id)` the action is about.
    pub fn entity(&self) -> (&'static str, DbId) {
        use entity_types::*;
        match self {
            Self::CourseEnrolled { course_id } | Self::CoursePublished { course_id, .. } => {
                (COURSE, *course_id)
            }
            Self::LessonCompleted { lesson_id, .. } => (LESSON, *lesson_id),
            Self::QuizSubmitted { quiz_id, .. } => (QUIZ, *quiz_id),
            Self::CertificateIssued { certificate_id, .. } => (CERTIFICATE, *certificate_id),
            Self::WorkshopStarted { workshop_id }
            | Self::WorkshopReserved { workshop_id, .. }
            | Self::ReservationCancelled { workshop_id, .. } => (WORKSHOP, *workshop_id),
            Self::CommentModerated { comment_id, .. } => (COMMENT, *comment_id),
            Self::VerificationReviewed {
                verification_id, ..
            } => (VERIFICATION, *verification_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
