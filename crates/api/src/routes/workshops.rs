//! Route definitions for live workshops.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workshops;
use crate::state::AppState;

/// Routes mounted at `/workshops`.
///
/// ```text
/// GET    /                      -> list_workshops
/// POST   /                      -> create_workshop
/// GET    /{id}                  -> get_workshop
/// POST   /{id}/start            -> start_workshop
/// POST   /{id}/join             -> join_workshop
/// POST   /{id}/reservations     -> reserve_seat
/// DELETE /{id}/reservations     -> cancel_reservation
/// GET    /{id}/calendar.ics     -> workshop_calendar
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workshops::list_workshops).post(workshops::create_workshop),
        )
        .route("/{id}", get(workshops::get_workshop))
        .route("/{id}/start", post(workshops::start_workshop))
        .route("/{id}/join", post(workshops::join_workshop))
        .route(
            "/{id}/reservations",
            post(workshops::reserve_seat).delete(workshops::cancel_reservation),
        )
        .route("/{id}/calendar.ics", get(workshops::workshop_calendar))
}
