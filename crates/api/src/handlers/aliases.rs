//! Handler exposing the active field alias table.

use axum::extract::State;
use axum::Json;
use productcsv_core::aliases::AliasConfig;
use productcsv_core::record::CANONICAL_HEADERS;
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AliasTableView {
    /// CSV header row, in column order.
    pub columns: [&'static str; 5],
    pub table: AliasConfig,
}

/// GET /api/v1/aliases
pub async fn get_alias_table(State(state): State<AppState>) -> Json<DataResponse<AliasTableView>> {
    Json(DataResponse::new(AliasTableView {
        columns: CANONICAL_HEADERS,
        table: state.aliases.config().clone(),
    }))
}
