//! Certificate models.

use gurmania_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `certificates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Certificate {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub code: String,
    pub issued_at: Timestamp,
}

/// Public verification view of a certificate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CertificateVerification {
    pub code: String,
    pub issued_at: Timestamp,
    pub course_id: DbId,
    pub course_title: String,
    pub learner_name: String,
}
