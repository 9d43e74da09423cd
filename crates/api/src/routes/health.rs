//! Liveness check, mounted at the root outside `/api/v1`.

use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    /// `degraded` while the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub db_latency_ms: u128,
}

/// GET /health
///
/// Always answers 200 so the process is not restarted over a database
/// outage; orchestrators read `status` instead.
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let started = Instant::now();
    let ping = gurmania_db::health_check(&state.pool).await;
    let db_latency_ms = started.elapsed().as_millis();

    if let Err(e) = &ping {
        tracing::warn!(error = %e, "Health check could not reach the database");
    }
    let db_healthy = ping.is_ok();

    Json(HealthStatus {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
