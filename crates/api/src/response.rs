//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope, used for scalar results
/// such as counts.
///
/// ```ignore
/// Ok(Json(DataResponse { data: count }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
