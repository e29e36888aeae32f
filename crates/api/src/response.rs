//! JSON envelope shared by the non-download endpoints.

use serde::Serialize;

/// `{ "data": T }` wrapper used by the summary and alias endpoints.
///
/// CSV downloads are returned raw and never wrapped.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
