//! Repository for the `workshop_reservations` table.
//!
//! Seat allocation happens under a row lock on the parent workshop so that
//! concurrent reservations can never exceed capacity.

use gurmania_core::types::DbId;
use gurmania_core::workshop::{RESERVATION_CANCELLED, RESERVATION_RESERVED};
use sqlx::PgPool;

use crate::models::workshop::{ReservationOutcome, WorkshopReservation};

const COLUMNS: &str = "id, workshop_id, user_id, status, created_at, updated_at";

pub struct ReservationRepo;

impl ReservationRepo {
    /// Reserve a seat for `user_id`.
    ///
    /// Locks the workshop row, counts active reservations, and inserts (or
    /// reactivates a cancelled reservation) only while seats remain.
    pub async fn reserve(
        pool: &PgPool,
        workshop_id: DbId,
        user_id: DbId,
    ) -> Result<ReservationOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let capacity = sqlx::query_scalar::<_, i32>(
            "SELECT capacity FROM workshops WHERE id = $1 FOR UPDATE",
        )
        .bind(workshop_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(capacity) = capacity else {
            return Ok(ReservationOutcome::WorkshopMissing);
        };

        let query = format!(
            "SELECT {COLUMNS} FROM workshop_reservations
             WHERE workshop_id = $1 AND user_id = $2 AND status = '{RESERVATION_RESERVED}'"
        );
        let existing = sqlx::query_as::<_, WorkshopReservation>(&query)
            .bind(workshop_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(existing) = existing {
            return Ok(ReservationOutcome::AlreadyReserved(existing));
        }

        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workshop_reservations WHERE workshop_id = $1 AND status = $2",
        )
        .bind(workshop_id)
        .bind(RESERVATION_RESERVED)
        .fetch_one(&mut *tx)
        .await?;

        if active >= i64::from(capacity) {
            tracing::debug!(workshop_id, user_id, active, capacity, "Workshop full");
            return Ok(ReservationOutcome::Full);
        }

        let query = format!(
            "INSERT INTO workshop_reservations (workshop_id, user_id, status)
             VALUES ($1, $2, $3)
             ON CONFLICT (workshop_id, user_id) DO UPDATE SET status = EXCLUDED.status
             RETURNING {COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, WorkshopReservation>(&query)
            .bind(workshop_id)
            .bind(user_id)
            .bind(RESERVATION_RESERVED)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ReservationOutcome::Reserved(reservation))
    }

    /// Cancel an active reservation. Returns `None` if there was none.
    pub async fn cancel(
        pool: &PgPool,
        workshop_id: DbId,
        user_id: DbId,
    ) -> Result<Option<WorkshopReservation>, sqlx::Error> {
        let query = format!(
            "UPDATE workshop_reservations SET status = $3
             WHERE workshop_id = $1 AND user_id = $2 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkshopReservation>(&query)
            .bind(workshop_id)
            .bind(user_id)
            .bind(RESERVATION_CANCELLED)
            .bind(RESERVATION_RESERVED)
            .fetch_optional(pool)
            .await
    }

    pub async fn has_active(
        pool: &PgPool,
        workshop_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM workshop_reservations
                WHERE workshop_id = $1 AND user_id = $2 AND status = $3)",
        )
        .bind(workshop_id)
        .bind(user_id)
        .bind(RESERVATION_RESERVED)
        .fetch_one(pool)
        .await
    }

    pub async fn count_active(pool: &PgPool, workshop_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workshop_reservations WHERE workshop_id = $1 AND status = $2",
        )
        .bind(workshop_id)
        .bind(RESERVATION_RESERVED)
        .fetch_one(pool)
        .await
    }

    /// Active reservations of a workshop, in booking order.
    pub async fn list_active(
        pool: &PgPool,
        workshop_id: DbId,
    ) -> Result<Vec<WorkshopReservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workshop_reservations
             WHERE workshop_id = $1 AND status = $2
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, WorkshopReservation>(&query)
            .bind(workshop_id)
            .bind(RESERVATION_RESERVED)
            .fetch_all(pool)
            .await
    }
}
