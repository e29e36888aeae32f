//! Checks the JSON error envelope produced by `AppError`.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::body_json;
use productcsv_api::error::AppError;
use productcsv_core::conversion::{FileOutcome, FileReport};
use productcsv_core::error::CoreError;

// ---- Test: BadRequest maps to 400 with its message ----

#[tokio::test]
async fn bad_request_returns_400() {
    let response = AppError::BadRequest("missing boundary".into()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "missing boundary");
    assert!(json.get("details").is_none());
}

// ---- Test: PayloadTooLarge maps to 413 ----

#[tokio::test]
async fn payload_too_large_returns_413() {
    let response = AppError::PayloadTooLarge("length limit exceeded".into()).into_response();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = body_json(response).await;
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(json["error"], "length limit exceeded");
}

// ---- Test: internal errors never leak their message ----

#[tokio::test]
async fn internal_error_is_sanitized() {
    let response = AppError::InternalError("disk at /var/tmp is full".into()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn core_io_error_is_sanitized() {
    let io = std::io::Error::other("secret path");
    let response = AppError::Core(CoreError::Io(io)).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
}

// ---- Test: EmptyResult maps to 422 with per-file details ----

#[tokio::test]
async fn empty_result_returns_422_with_details() {
    let error = CoreError::EmptyResult {
        files: vec![FileReport {
            file_name: "x.json".into(),
            outcome: FileOutcome::Skipped {
                reason: "invalid JSON: EOF".into(),
            },
        }],
    };
    let response = AppError::from(error).into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "EMPTY_RESULT");
    assert_eq!(
        json["error"],
        "No records could be extracted from 1 uploaded file(s)"
    );
    assert_eq!(json["details"][0]["file_name"], "x.json");
    assert_eq!(json["details"][0]["status"], "skipped");
    assert_eq!(json["details"][0]["reason"], "invalid JSON: EOF");
}
