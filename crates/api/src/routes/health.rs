use axum::extract::State;
use axum::{routing::get, Json, Router};
use productcsv_core::record::CanonicalField;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Total aliases across all columns in the active table.
    pub alias_count: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let fields = &state.aliases.config().fields;
    let alias_count = CanonicalField::ALL
        .iter()
        .map(|&field| fields.for_field(field).len())
        .sum();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        alias_count,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
