//! Live workshop and reservation models.

use gurmania_core::types::{DbId, Timestamp};
use gurmania_core::workshop::WorkshopWindow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `workshops` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workshop {
    pub id: DbId,
    pub instructor_id: DbId,
    pub course_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub duration_mins: i32,
    pub capacity: i32,
    pub meeting_url: Option<String>,
    pub started_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Workshop {
    pub fn window(&self) -> WorkshopWindow {
        WorkshopWindow {
            starts_at: self.starts_at,
            duration_mins: self.duration_mins,
            started_at: self.started_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkshop {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub course_id: Option<DbId>,
    pub starts_at: Timestamp,
    pub duration_mins: i32,
    pub capacity: i32,
    #[validate(url)]
    pub meeting_url: Option<String>,
    /// Lessons an attendee must complete before reserving.
    #[serde(default)]
    pub required_lesson_ids: Vec<DbId>,
}

/// Listing filter (`?upcoming=true&course_id=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkshopListParams {
    #[serde(default)]
    pub upcoming: bool,
    pub course_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A row from the `workshop_reservations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkshopReservation {
    pub id: DbId,
    pub workshop_id: DbId,
    pub user_id: DbId,
    /// `reserved` or `cancelled`.
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of a transactional reservation attempt.
#[derive(Debug)]
pub enum ReservationOutcome {
    Reserved(WorkshopReservation),
    /// The caller already holds an active reservation.
    AlreadyReserved(WorkshopReservation),
    /// Capacity was reached while the row lock was held.
    Full,
    WorkshopMissing,
}
