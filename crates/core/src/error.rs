use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Content exists but sits behind an unmet prerequisite (e.g. an
    /// unpassed quiz in the previous module).
    #[error("Locked: {0}")]
    Locked(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
