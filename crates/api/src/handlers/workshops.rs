//! Handlers for live workshops: scheduling, reservations, starting, joining,
//! and calendar export.
//!
//! The workshop's phase is derived from the clock on every read. Hosts (the
//! workshop's instructor or an admin) always get in; attendees need an
//! active reservation and a started session inside the join window.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use gurmania_core::audit::AuditPayload;
use gurmania_core::calendar::{render_ics, CalendarEvent};
use gurmania_core::error::CoreError;
use gurmania_core::pagination::page_bounds;
use gurmania_core::types::{DbId, Timestamp};
use gurmania_core::workshop::{
    check_reservation, ensure_can_join, validate_schedule, Participant, ReservationRequest,
    WorkshopPhase,
};
use gurmania_db::models::workshop::{
    CreateWorkshop, ReservationOutcome, Workshop, WorkshopListParams, WorkshopReservation,
};
use gurmania_db::repositories::{LessonRepo, ProgressRepo, ReservationRepo, WorkshopRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{validate_input, AppError, AppResult};
use crate::handlers::access::{ensure_course_staff, record_audit};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Listing entry. The meeting link is only handed out through `join`.
#[derive(Debug, Serialize)]
pub struct WorkshopSummary {
    #[serde(flatten)]
    pub workshop: Workshop,
    pub phase: WorkshopPhase,
    pub ends_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct WorkshopDetail {
    #[serde(flatten)]
    pub summary: WorkshopSummary,
    pub required_lesson_ids: Vec<DbId>,
    pub reserved_seats: i64,
    pub seats_left: i64,
    /// The caller holds an active reservation.
    pub reserved: bool,
    /// Active reservations; present for hosts only.
    pub attendees: Option<Vec<WorkshopReservation>>,
}

/// What a participant needs to enter the session.
#[derive(Debug, Serialize)]
pub struct JoinTicket {
    pub workshop_id: DbId,
    pub meeting_url: Option<String>,
    pub ends_at: Timestamp,
    pub join_deadline: Timestamp,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_workshop_exists(pool: &PgPool, id: DbId) -> AppResult<Workshop> {
    WorkshopRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workshop",
            id,
        }))
}

fn is_host(auth: &AuthUser, workshop: &Workshop) -> bool {
    auth.is_staff_for(workshop.instructor_id)
}

fn summarize(mut workshop: Workshop, now: Timestamp) -> WorkshopSummary {
    let window = workshop.window();
    workshop.meeting_url = None;
    WorkshopSummary {
        phase: window.phase(now),
        ends_at: window.ends_at(),
        workshop,
    }
}

/// Reject prerequisite ids that do not exist, or that sit outside the
/// workshop's course when it has one.
async fn check_required_lessons(pool: &PgPool, input: &CreateWorkshop) -> AppResult<()> {
    if input.required_lesson_ids.is_empty() {
        return Ok(());
    }
    let requested: BTreeSet<DbId> = input.required_lesson_ids.iter().copied().collect();
    let ids: Vec<DbId> = requested.iter().copied().collect();

    let found: BTreeSet<DbId> = match input.course_id {
        Some(course_id) => LessonRepo::ids_in_course(pool, course_id, &ids).await?,
        None => LessonRepo::existing_ids(pool, &ids).await?,
    }
    .into_iter()
    .collect();

    let unknown: Vec<String> = requested
        .difference(&found)
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown required lessons: {}",
            unknown.join(", ")
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// GET /api/v1/workshops
///
/// `?upcoming=true` hides ended workshops, `?course_id=` filters by course.
pub async fn list_workshops(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WorkshopListParams>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now();
    let (limit, offset) = page_bounds(params.limit, params.offset);

    let workshops = WorkshopRepo::list(&state.pool, &params, now, limit, offset)
        .await?
        .into_iter()
        .map(|w| summarize(w, now))
        .collect::<Vec<_>>();

    Ok(Json(DataResponse { data: workshops }))
}

/// POST /api/v1/workshops
pub async fn create_workshop(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkshop>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    validate_schedule(input.duration_mins, input.capacity)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    if input.starts_at <= chrono::Utc::now() {
        return Err(AppError::Core(CoreError::Validation(
            "Workshop must start in the future".into(),
        )));
    }

    if let Some(course_id) = input.course_id {
        ensure_course_staff(&state.pool, &user, course_id).await?;
    }
    check_required_lessons(&state.pool, &input).await?;

    let workshop = WorkshopRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        workshop_id = workshop.id,
        user_id = user.user_id,
        starts_at = %workshop.starts_at,
        capacity = workshop.capacity,
        "Workshop scheduled",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: workshop })))
}

/// GET /api/v1/workshops/{id}
pub async fn get_workshop(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workshop = ensure_workshop_exists(&state.pool, workshop_id).await?;
    let host = is_host(&auth, &workshop);
    let capacity = i64::from(workshop.capacity);

    let required_lesson_ids = WorkshopRepo::required_lesson_ids(&state.pool, workshop_id).await?;
    let reserved_seats = ReservationRepo::count_active(&state.pool, workshop_id).await?;
    let reserved = ReservationRepo::has_active(&state.pool, workshop_id, auth.user_id).await?;
    let attendees = if host {
        Some(ReservationRepo::list_active(&state.pool, workshop_id).await?)
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: WorkshopDetail {
            summary: summarize(workshop, chrono::Utc::now()),
            required_lesson_ids,
            reserved_seats,
            seats_left: (capacity - reserved_seats).max(0),
            reserved,
            attendees,
        },
    }))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// POST /api/v1/workshops/{id}/start
///
/// Hosts only. Starting twice keeps the first start time.
pub async fn start_workshop(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workshop = ensure_workshop_exists(&state.pool, workshop_id).await?;
    if !is_host(&auth, &workshop) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the workshop host may start it".into(),
        )));
    }
    if workshop.window().phase(chrono::Utc::now()) == WorkshopPhase::Ended {
        return Err(AppError::Core(CoreError::Validation(
            "Workshop has already ended".into(),
        )));
    }

    let was_started = workshop.started_at.is_some();
    let workshop = WorkshopRepo::mark_started(&state.pool, workshop_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workshop",
            id: workshop_id,
        }))?;

    if !was_started {
        record_audit(
            &state.pool,
            auth.user_id,
            AuditPayload::WorkshopStarted { workshop_id },
        )
        .await;
        tracing::info!(workshop_id, user_id = auth.user_id, "Workshop started");
    }

    Ok(Json(DataResponse { data: workshop }))
}

/// POST /api/v1/workshops/{id}/join
///
/// Returns the meeting link when the caller may enter right now.
pub async fn join_workshop(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workshop = ensure_workshop_exists(&state.pool, workshop_id).await?;
    let participant = Participant {
        is_host: is_host(&auth, &workshop),
        has_reservation: ReservationRepo::has_active(&state.pool, workshop_id, auth.user_id)
            .await?,
    };

    let window = workshop.window();
    let grace = state.config.workshop_join_grace_mins;
    ensure_can_join(&window, participant, chrono::Utc::now(), grace)?;

    tracing::debug!(
        workshop_id,
        user_id = auth.user_id,
        is_host = participant.is_host,
        "Workshop joined",
    );

    Ok(Json(DataResponse {
        data: JoinTicket {
            workshop_id,
            meeting_url: workshop.meeting_url,
            ends_at: window.ends_at(),
            join_deadline: window.join_deadline(grace),
        },
    }))
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// POST /api/v1/workshops/{id}/reservations
///
/// 409 when the workshop is full or the caller already holds a seat, 403
/// when prerequisite lessons are missing, 400 once the workshop has ended.
pub async fn reserve_seat(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workshop = ensure_workshop_exists(&state.pool, workshop_id).await?;
    let host = is_host(&auth, &workshop);

    let required: BTreeSet<DbId> = WorkshopRepo::required_lesson_ids(&state.pool, workshop_id)
        .await?
        .into_iter()
        .collect();
    let completed: BTreeSet<DbId> = if host || required.is_empty() {
        BTreeSet::new()
    } else {
        let ids: Vec<DbId> = required.iter().copied().collect();
        ProgressRepo::completed_among(&state.pool, auth.user_id, &ids)
            .await?
            .into_iter()
            .collect()
    };
    let active_reservations = ReservationRepo::count_active(&state.pool, workshop_id).await?;

    check_reservation(
        &workshop.window(),
        chrono::Utc::now(),
        &ReservationRequest {
            is_host: host,
            required_lessons: &required,
            completed_lessons: &completed,
            active_reservations,
            capacity: workshop.capacity,
        },
    )?;

    let reservation = match ReservationRepo::reserve(&state.pool, workshop_id, auth.user_id).await? {
        ReservationOutcome::Reserved(reservation) => reservation,
        ReservationOutcome::AlreadyReserved(_) => {
            return Err(AppError::Core(CoreError::Conflict(
                "You already hold a seat in this workshop".into(),
            )));
        }
        ReservationOutcome::Full => {
            tracing::info!(workshop_id, user_id = auth.user_id, "Reservation refused: full");
            return Err(AppError::Core(CoreError::Conflict(
                "Workshop is fully booked".into(),
            )));
        }
        ReservationOutcome::WorkshopMissing => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Workshop",
                id: workshop_id,
            }));
        }
    };

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::WorkshopReserved {
            workshop_id,
            reservation_id: reservation.id,
        },
    )
    .await;

    tracing::info!(
        workshop_id,
        reservation_id = reservation.id,
        user_id = auth.user_id,
        "Seat reserved",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
}

/// DELETE /api/v1/workshops/{id}/reservations
pub async fn cancel_reservation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reservation = ReservationRepo::cancel(&state.pool, workshop_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Reservation for workshop",
            id: workshop_id,
        }))?;

    record_audit(
        &state.pool,
        auth.user_id,
        AuditPayload::ReservationCancelled {
            workshop_id,
            reservation_id: reservation.id,
        },
    )
    .await;

    tracing::info!(workshop_id, user_id = auth.user_id, "Reservation cancelled");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// GET /api/v1/workshops/{id}/calendar.ics
pub async fn workshop_calendar(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workshop = ensure_workshop_exists(&state.pool, workshop_id).await?;
    let uid = format!("workshop-{workshop_id}@gurmania");

    let ics = render_ics(&CalendarEvent {
        uid: &uid,
        title: &workshop.title,
        description: workshop.description.as_deref(),
        starts_at: workshop.starts_at,
        ends_at: workshop.window().ends_at(),
        generated_at: chrono::Utc::now(),
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"workshop-{workshop_id}.ics\""),
            ),
        ],
        ics,
    ))
}
