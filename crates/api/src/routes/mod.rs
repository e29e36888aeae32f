pub mod convert;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /convert                 JSON files -> CSV download (POST, multipart)
/// /convert/summary         JSON files -> conversion report (POST, multipart)
/// /aliases                 active field alias table (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/convert", convert::router())
        .route("/aliases", get(handlers::aliases::get_alias_table))
}
