//! Read-only aggregates for the admin dashboard.

use gurmania_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Platform-wide counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardTotals {
    pub users: i64,
    pub instructors: i64,
    pub courses: i64,
    pub published_courses: i64,
    pub enrollments: i64,
    pub certificates: i64,
    pub quiz_submissions: i64,
    /// Mean score over all submissions; `None` before the first one.
    pub average_quiz_score: Option<f64>,
    /// Share of submissions that passed, in `0.0..=1.0`.
    pub quiz_pass_rate: Option<f64>,
    pub pending_comments: i64,
    pub pending_verifications: i64,
}

/// Per-course learner funnel.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseStats {
    pub course_id: DbId,
    pub title: String,
    pub enrollments: i64,
    /// Learners holding a certificate, i.e. who finished every lesson.
    pub completions: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub totals: DashboardTotals,
    pub courses: Vec<CourseStats>,
}
