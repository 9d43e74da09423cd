//! Append-only trail of admin and moderation decisions.

use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

const COLUMNS: &str = "id, actor_id, action_type, entity_type, entity_id, payload, created_at";

/// Every filter is optional; an unset parameter binds NULL and matches all
/// rows. Shared by [`AuditLogRepo::query`] and [`AuditLogRepo::count`] so
/// the page and its total always agree.
const FILTER: &str = "WHERE ($1::BIGINT IS NULL OR actor_id = $1)
       AND ($2::TEXT IS NULL OR action_type = $2)
       AND ($3::TEXT IS NULL OR entity_type = $3)
       AND ($4::BIGINT IS NULL OR entity_id = $4)
       AND ($5::TIMESTAMPTZ IS NULL OR created_at >= $5)
       AND ($6::TIMESTAMPTZ IS NULL OR created_at <= $6)";

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Record a decision. The action and entity columns are derived from the
    /// payload so they cannot disagree with it.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let (entity_type, entity_id) = entry.payload.entity();
        let sql = format!(
            "INSERT INTO audit_logs (actor_id, action_type, entity_type, entity_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&sql)
            .bind(entry.actor_id)
            .bind(entry.payload.action_type())
            .bind(entity_type)
            .bind(entity_id)
            .bind(Json(&entry.payload))
            .fetch_one(pool)
            .await
    }

    /// One page of matching entries, newest first.
    pub async fn query(
        pool: &PgPool,
        filter: &AuditQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM audit_logs {FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $7 OFFSET $8"
        );
        sqlx::query_as::<_, AuditLog>(&sql)
            .bind(filter.actor_id)
            .bind(filter.action_type.as_deref())
            .bind(filter.entity_type.as_deref())
            .bind(filter.entity_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &AuditQuery) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT COUNT(*)::BIGINT FROM audit_logs {FILTER}");
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.actor_id)
            .bind(filter.action_type.as_deref())
            .bind(filter.entity_type.as_deref())
            .bind(filter.entity_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(pool)
            .await
    }
}
