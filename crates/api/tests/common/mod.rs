#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use productcsv_api::config::{LogFormat, ServerConfig};
use productcsv_api::router::build_app_router;
use productcsv_api::state::AppState;
use productcsv_core::aliases::AliasTable;

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "productcsv-test-boundary-7MA4YWxkTrZu0gW";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 10 * 1024 * 1024,
        upload_temp_dir: None,
        alias_table_path: None,
        csv_excel_bom: false,
        drop_empty_records: false,
        log_format: LogFormat::Text,
    }
}

/// Build the full application router with the built-in alias table.
pub fn build_test_app() -> Router {
    build_app_with(test_config(), AliasTable::default())
}

/// Build the full application router from an explicit config and table.
///
/// Goes through [`build_app_router`] so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) as production.
pub fn build_app_with(config: ServerConfig, aliases: AliasTable) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
        aliases: Arc::new(aliases),
    };
    build_app_router(state, &config)
}

/// Build a config whose upload workspaces live under `dir`.
pub fn config_with_temp_root(dir: PathBuf) -> ServerConfig {
    ServerConfig {
        upload_temp_dir: Some(dir),
        ..test_config()
    }
}

/// One part of a multipart form.
pub enum Part<'a> {
    File { name: &'a str, content: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

/// Shorthand for a `json_files` upload part.
pub fn file<'a>(name: &'a str, content: &'a str) -> Part<'a> {
    Part::File {
        name,
        content: content.as_bytes(),
    }
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { name, content } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"json_files\"; filename=\"{name}\"\r\n\
                         Content-Type: application/json\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a multipart form built from `parts`.
pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Read a response header as a string.
pub fn header_str<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}
