use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gurmania_core::error::CoreError;
use serde_json::json;
use sqlx::error::ErrorKind;
use validator::{Validate, ValidationErrors};

/// Error type returned by every handler.
///
/// Serialises as `{"error": <message>, "code": <CODE>}`. Gated content adds
/// `"locked": true` so the player can show a padlock instead of an error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl AppError {
    /// Status, machine-readable code, and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Locked(msg) => (StatusCode::FORBIDDEN, "LOCKED", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let mut body = json!({
            "error": message,
            "code": code,
        });
        if matches!(self, AppError::Core(CoreError::Locked(_))) {
            body["locked"] = json!(true);
        }
        (status, Json(body)).into_response()
    }
}

/// Map database failures to responses.
///
/// Missing rows are 404. Unique violations on `uq_*` constraints are 409
/// (duplicate enrollment, review, certificate). Check and foreign-key
/// violations mean the request referenced or produced something the schema
/// refuses, so they are 400. Everything else is a sanitised 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            );
        }
        sqlx::Error::Database(db_err) => db_err,
        other => {
            tracing::error!(error = %other, "Database error");
            return internal();
        }
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.kind() {
        ErrorKind::UniqueViolation if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        ErrorKind::CheckViolation => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value rejected by constraint: {constraint}"),
        ),
        ErrorKind::ForeignKeyViolation => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Referenced record does not exist ({constraint})"),
        ),
        _ => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}

/// Whether a sqlx error is a violation of the named unique constraint.
pub fn violates_unique(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
    )
}

/// Run `validator` checks on a request DTO, mapping failures to
/// [`CoreError::Validation`].
pub fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    input
        .validate()
        .map_err(|errors| AppError::Core(CoreError::Validation(describe(&errors))))
}

/// Flatten validation errors into `field: code` pairs.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .errors()
        .iter()
        .map(|(field, kind)| format!("{field}: {}", kind_summary(kind)))
        .collect();
    parts.sort();
    format!("Invalid input ({})", parts.join("; "))
}

fn kind_summary(kind: &validator::ValidationErrorsKind) -> String {
    match kind {
        validator::ValidationErrorsKind::Field(errs) => errs
            .iter()
            .map(|e| e.code.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        validator::ValidationErrorsKind::Struct(inner) => describe(inner),
        validator::ValidationErrorsKind::List(items) => items
            .iter()
            .map(|(idx, inner)| format!("[{idx}] {}", describe(inner)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
