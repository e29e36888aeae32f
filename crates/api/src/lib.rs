//! Product CSV API server library.
//!
//! Exposes config, state, error handling, the router and the upload
//! workspace so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod workspace;
