//! Route definitions for JSON → CSV conversion.
//!
//! Mounted at `/convert`.

use axum::routing::post;
use axum::Router;

use crate::handlers::convert;
use crate::state::AppState;

/// Routes mounted at `/convert`.
///
/// ```text
/// POST   /               -> convert_csv       (multipart, CSV download)
/// POST   /summary        -> convert_summary   (multipart, JSON report)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(convert::convert_csv))
        .route("/summary", post(convert::convert_summary))
}
