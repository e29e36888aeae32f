use std::sync::Arc;

use productcsv_core::aliases::AliasTable;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is read-only behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Field alias table used by every conversion.
    pub aliases: Arc<AliasTable>,
}
