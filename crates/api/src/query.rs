//! Query-string extractors shared across handlers.

use gurmania_core::pagination::page_bounds;
use serde::Deserialize;

/// `?limit=&offset=` for listings with no other filters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn resolve(&self) -> (i64, i64) {
        page_bounds(self.limit, self.offset)
    }
}
