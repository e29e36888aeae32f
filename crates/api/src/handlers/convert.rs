//! Handlers for JSON → CSV conversion uploads.
//!
//! Both endpoints take the same multipart form: any part with a file name is
//! an upload, and an optional `output_filename` text part names the
//! download. Uploads are staged in a per-request [`UploadWorkspace`] and the
//! conversion runs on the blocking pool.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use productcsv_core::conversion::{convert_documents, Conversion, ConversionSummary};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workspace::{sanitize_file_name, UploadWorkspace};

/// Form field naming the download.
pub const OUTPUT_FILENAME_FIELD: &str = "output_filename";
/// Download name used when none (or nothing usable) is given.
pub const DEFAULT_OUTPUT_NAME: &str = "output";

pub const HEADER_RECORDS_WRITTEN: &str = "x-records-written";
pub const HEADER_DUPLICATES_REMOVED: &str = "x-duplicates-removed";
pub const HEADER_FILES_SKIPPED: &str = "x-files-skipped";

/// A received multipart form, staged on disk.
struct ReceivedUpload {
    workspace: UploadWorkspace,
    output_name: Option<String>,
}

// ── Convert to CSV ───────────────────────────────────────────────────

/// POST /api/v1/convert
///
/// Convert the uploaded JSON files and return the CSV as an attachment.
/// Conversion counters are echoed in `x-*` response headers.
pub async fn convert_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let upload = receive_upload(&state, multipart).await?;
    let file_name = output_file_name(upload.output_name.as_deref());
    let conversion = run_conversion(&state, &upload.workspace).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
            .map_err(|e| AppError::InternalError(format!("Invalid download name: {e}")))?,
    );
    let summary = &conversion.summary;
    for (name, value) in [
        (HEADER_RECORDS_WRITTEN, summary.records_written),
        (HEADER_DUPLICATES_REMOVED, summary.duplicates_removed),
        (HEADER_FILES_SKIPPED, summary.files_skipped),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }

    tracing::info!(
        file_name = %file_name,
        bytes = conversion.csv.len(),
        records = summary.records_written,
        "Sending CSV download"
    );

    Ok((StatusCode::OK, headers, conversion.csv))
}

// ── Summary ──────────────────────────────────────────────────────────

/// POST /api/v1/convert/summary
///
/// Run the same conversion but return the counters and per-file outcomes
/// instead of the CSV.
pub async fn convert_summary(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<DataResponse<ConversionSummary>>> {
    let upload = receive_upload(&state, multipart).await?;
    let conversion = run_conversion(&state, &upload.workspace).await?;

    Ok(Json(DataResponse::new(conversion.summary)))
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Stage every file part of the form in a fresh workspace.
async fn receive_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ReceivedUpload> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut workspace = UploadWorkspace::create(state.config.upload_temp_dir.as_deref())
        .map_err(|e| AppError::InternalError(format!("Failed to create upload workspace: {e}")))?;
    let mut output_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field.file_name().map(str::to_string) {
            // Browsers send an empty file part when nothing was selected.
            Some(file_name) if file_name.trim().is_empty() => continue,
            Some(file_name) => {
                let data = field.bytes().await.map_err(multipart_error)?;
                tracing::info!(file = %file_name, size = data.len(), "Received upload");
                workspace
                    .stage(&file_name, &data)
                    .await
                    .map_err(|e| AppError::InternalError(format!("Failed to stage upload: {e}")))?;
            }
            None if field_name == OUTPUT_FILENAME_FIELD => {
                let text = field.text().await.map_err(multipart_error)?;
                output_name = Some(text);
            }
            None => {
                tracing::debug!(field = %field_name, "Ignoring unknown form field");
            }
        }
    }

    tracing::debug!(
        files = workspace.len(),
        workspace = %workspace.path().display(),
        "Upload staged"
    );

    Ok(ReceivedUpload {
        workspace,
        output_name,
    })
}

/// Map a multipart read failure, keeping body-limit overruns distinct.
fn multipart_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(error.body_text())
    } else {
        AppError::BadRequest(error.body_text())
    }
}

/// Load the staged documents and run the pipeline on the blocking pool.
async fn run_conversion(state: &AppState, workspace: &UploadWorkspace) -> AppResult<Conversion> {
    let documents = workspace
        .load_documents()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read staged uploads: {e}")))?;

    let aliases = state.aliases.clone();
    let options = state.config.conversion_options();

    let conversion = tokio::task::spawn_blocking(move || {
        convert_documents(&documents, &aliases, options)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Conversion task failed: {e}")))??;

    Ok(conversion)
}

/// Build the download file name from the user's requested name.
///
/// Any extension is replaced with `.csv`; an empty or unusable name
/// becomes `output.csv`.
pub fn output_file_name(requested: Option<&str>) -> String {
    let requested = requested.unwrap_or("").trim();
    let base = sanitize_file_name(requested, DEFAULT_OUTPUT_NAME);
    let stem = match base.rfind('.') {
        Some(0) | None => base.as_str(),
        Some(dot) => &base[..dot],
    };
    let stem = stem.trim_matches(|c| c == '.' || c == '_');
    if stem.is_empty() {
        format!("{DEFAULT_OUTPUT_NAME}.csv")
    } else {
        format!("{stem}.csv")
    }
}
