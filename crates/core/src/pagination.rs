//! Limit/offset bounds for paginated listings.

/// Page size when the client omits `limit`.
pub const DEFAULT_LIMIT: i64 = 25;

pub const MAX_LIMIT: i64 = 100;

/// Turn raw `?limit=&offset=` values into bindable bounds.
///
/// The limit falls in `[1, MAX_LIMIT]`; a negative offset becomes zero.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
