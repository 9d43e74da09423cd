//! Route definitions for the caller's certificates and public verification.

use axum::routing::get;
use axum::Router;

use crate::handlers::certificates;
use crate::state::AppState;

/// Routes mounted at `/certificates`.
///
/// ```text
/// GET    /                  -> list_my_certificates
/// GET    /verify/{code}     -> verify_certificate (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(certificates::list_my_certificates))
        .route("/verify/{code}", get(certificates::verify_certificate))
}
