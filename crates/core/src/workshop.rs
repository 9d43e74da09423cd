//! Live workshop phases, join window, and reservation eligibility.
//!
//! Workshops carry no stored status. The phase is derived from the start
//! time and duration at read time.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minutes after the scheduled end during which attendees may still join.
pub const DEFAULT_JOIN_GRACE_MINS: i64 = 15;

pub const MIN_DURATION_MINS: i32 = 5;
pub const MAX_DURATION_MINS: i32 = 8 * 60;
pub const MAX_CAPACITY: i32 = 500;

/// Reservation status values (`workshop_reservations.status`).
pub const RESERVATION_RESERVED: &str = "reserved";
pub const RESERVATION_CANCELLED: &str = "cancelled";

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopPhase {
    Upcoming,
    Live,
    Ended,
}

/// The scheduling fields of a workshop.
#[derive(Debug, Clone, Copy)]
pub struct WorkshopWindow {
    pub starts_at: Timestamp,
    pub duration_mins: i32,
    /// Stamped when the host starts the session.
    pub started_at: Option<Timestamp>,
}

impl WorkshopWindow {
    pub fn ends_at(&self) -> Timestamp {
        self.starts_at + Duration::minutes(i64::from(self.duration_mins))
    }

    pub fn phase(&self, now: Timestamp) -> WorkshopPhase {
        if now < self.starts_at {
            WorkshopPhase::Upcoming
        } else if now < self.ends_at() {
            WorkshopPhase::Live
        } else {
            WorkshopPhase::Ended
        }
    }

    /// Last instant (exclusive) at which attendees may join.
    pub fn join_deadline(&self, grace_mins: i64) -> Timestamp {
        self.ends_at() + Duration::minutes(grace_mins)
    }
}

// ---------------------------------------------------------------------------
// Joining
// ---------------------------------------------------------------------------

/// Who is asking to join, relative to one workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    /// The workshop's instructor or an admin.
    pub is_host: bool,
    /// Holds a reservation in the `reserved` state.
    pub has_reservation: bool,
}

/// Whether `participant` may enter the live session right now.
pub fn can_join_workshop(
    window: &WorkshopWindow,
    participant: Participant,
    now: Timestamp,
    grace_mins: i64,
) -> bool {
    ensure_can_join(window, participant, now, grace_mins).is_ok()
}

/// Like [`can_join_workshop`] but reports why joining is refused.
pub fn ensure_can_join(
    window: &WorkshopWindow,
    participant: Participant,
    now: Timestamp,
    grace_mins: i64,
) -> Result<(), CoreError> {
    if participant.is_host {
        return Ok(());
    }
    if !participant.has_reservation {
        return Err(CoreError::Forbidden(
            "A reservation is required to join this workshop".into(),
        ));
    }
    if window.started_at.is_none() {
        return Err(CoreError::Forbidden(
            "The host has not started this workshop yet".into(),
        ));
    }
    if now >= window.join_deadline(grace_mins) {
        return Err(CoreError::Forbidden("This workshop has ended".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// Lessons from `required` the learner has not completed, in id order.
pub fn missing_prerequisites(required: &BTreeSet<DbId>, completed: &BTreeSet<DbId>) -> Vec<DbId> {
    required.difference(completed).copied().collect()
}

/// Inputs to a reservation decision.
#[derive(Debug, Clone)]
pub struct ReservationRequest<'a> {
    pub is_host: bool,
    pub required_lessons: &'a BTreeSet<DbId>,
    pub completed_lessons: &'a BTreeSet<DbId>,
    pub active_reservations: i64,
    pub capacity: i32,
}

/// Decide whether a reservation may be created.
///
/// Hosts skip the prerequisite check. Capacity applies to everyone. The
/// storage layer repeats the capacity check under a row lock, so this is the
/// fast path for a clear error, not the guarantee.
pub fn check_reservation(
    window: &WorkshopWindow,
    now: Timestamp,
    request: &ReservationRequest<'_>,
) -> Result<(), CoreError> {
    if window.phase(now) == WorkshopPhase::Ended {
        return Err(CoreError::Validation("Workshop has already ended".into()));
    }

    if !request.is_host {
        let missing = missing_prerequisites(request.required_lessons, request.completed_lessons);
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(CoreError::Forbidden(format!(
                "Complete the required lessons first: {}",
                ids.join(", ")
            )));
        }
    }

    if request.active_reservations >= i64::from(request.capacity) {
        return Err(CoreError::Conflict("Workshop is fully booked".into()));
    }
    Ok(())
}

/// Validate workshop scheduling fields.
pub fn validate_schedule(duration_mins: i32, capacity: i32) -> Result<(), String> {
    if !(MIN_DURATION_MINS..=MAX_DURATION_MINS).contains(&duration_mins) {
        return Err(format!(
            "Duration must be between {MIN_DURATION_MINS} and {MAX_DURATION_MINS} minutes"
        ));
    }
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(format!("Capacity must be between 1 and {MAX_CAPACITY}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
    }

    /// 18:00 - 19:00.
    fn window(started: bool) -> WorkshopWindow {
        WorkshopWindow {
            starts_at: at(18, 0),
            duration_mins: 60,
            started_at: started.then(|| at(17, 58)),
        }
    }

    const ATTENDEE: Participant = Participant {
        is_host: false,
        has_reservation: true,
    };

    #[test]
    fn phase_follows_the_clock() {
        let w = window(false);
        assert_eq!(w.phase(at(17, 59)), WorkshopPhase::Upcoming);
        assert_eq!(w.phase(at(18, 0)), WorkshopPhase::Live);
        assert_eq!(w.phase(at(18, 59)), WorkshopPhase::Live);
        assert_eq!(w.phase(at(19, 0)), WorkshopPhase::Ended);
    }

    #[test]
    fn host_always_joins() {
        let host = Participant {
            is_host: true,
            has_reservation: false,
        };
        assert!(can_join_workshop(&window(false), host, at(23, 0), DEFAULT_JOIN_GRACE_MINS));
    }

    #[test]
    fn attendee_needs_started_session() {
        assert_matches!(
            ensure_can_join(&window(false), ATTENDEE, at(18, 5), DEFAULT_JOIN_GRACE_MINS),
            Err(CoreError::Forbidden(msg)) if msg.contains("not started")
        );
        assert!(can_join_workshop(&window(true), ATTENDEE, at(18, 5), DEFAULT_JOIN_GRACE_MINS));
    }

    #[test]
    fn attendee_needs_reservation() {
        let walk_in = Participant {
            is_host: false,
            has_reservation: false,
        };
        assert!(!can_join_workshop(&window(true), walk_in, at(18, 5), DEFAULT_JOIN_GRACE_MINS));
    }

    #[test]
    fn grace_window_is_exclusive() {
        let w = window(true);
        assert!(can_join_workshop(&w, ATTENDEE, at(19, 14), DEFAULT_JOIN_GRACE_MINS));
        assert!(!can_join_workshop(&w, ATTENDEE, at(19, 15), DEFAULT_JOIN_GRACE_MINS));
    }

    #[test]
    fn reservation_requires_prerequisites_for_learners() {
        let required = BTreeSet::from([1, 2]);
        let completed = BTreeSet::from([1]);
        let request = ReservationRequest {
            is_host: false,
            required_lessons: &required,
            completed_lessons: &completed,
            active_reservations: 0,
            capacity: 10,
        };
        assert_matches!(
            check_reservation(&window(false), at(12, 0), &request),
            Err(CoreError::Forbidden(msg)) if msg.contains('2')
        );

        let host_request = ReservationRequest {
            is_host: true,
            ..request
        };
        assert!(check_reservation(&window(false), at(12, 0), &host_request).is_ok());
    }

    #[test]
    fn reservation_respects_capacity() {
        let none = BTreeSet::new();
        let request = ReservationRequest {
            is_host: false,
            required_lessons: &none,
            completed_lessons: &none,
            active_reservations: 1,
            capacity: 1,
        };
        assert_matches!(
            check_reservation(&window(false), at(12, 0), &request),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn reservation_after_end_is_rejected() {
        let none = BTreeSet::new();
        let request = ReservationRequest {
            is_host: false,
            required_lessons: &none,
            completed_lessons: &none,
            active_reservations: 0,
            capacity: 5,
        };
        assert_matches!(
            check_reservation(&window(false), at(20, 0), &request),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn schedule_bounds() {
        assert!(validate_schedule(60, 12).is_ok());
        assert!(validate_schedule(1, 12).is_err());
        assert!(validate_schedule(60, 0).is_err());
    }
}
