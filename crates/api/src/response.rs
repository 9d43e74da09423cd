//! Success envelopes. Errors have their own shape in [`crate::error`].

use serde::Serialize;

/// `{ "data": ... }`, the body of every successful JSON response.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
