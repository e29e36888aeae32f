use std::path::PathBuf;

use productcsv_core::conversion::ConversionOptions;
use productcsv_core::csv_writer::CsvOptions;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Maximum accepted request body in bytes (default: 500 MiB).
    pub max_upload_bytes: usize,
    /// Parent directory for per-request upload workspaces (default: OS temp dir).
    pub upload_temp_dir: Option<PathBuf>,
    /// JSON alias table replacing the built-in one.
    pub alias_table_path: Option<PathBuf>,
    /// Prefix CSV downloads with a UTF-8 byte-order mark.
    pub csv_excel_bom: bool,
    /// Drop records where every column is empty.
    pub drop_empty_records: bool,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `MAX_UPLOAD_BYTES`     | `524288000`                |
    /// | `UPLOAD_TEMP_DIR`      | OS temp dir                |
    /// | `ALIAS_TABLE_PATH`     | built-in table             |
    /// | `CSV_EXCEL_BOM`        | `false`                    |
    /// | `DROP_EMPTY_RECORDS`   | `false`                    |
    /// | `LOG_FORMAT`           | `text`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (500 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            upload_temp_dir: env_path("UPLOAD_TEMP_DIR"),
            alias_table_path: env_path("ALIAS_TABLE_PATH"),
            csv_excel_bom: env_flag("CSV_EXCEL_BOM"),
            drop_empty_records: env_flag("DROP_EMPTY_RECORDS"),
            log_format,
        }
    }

    /// Pipeline options derived from this config.
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            csv: CsvOptions {
                excel_bom: self.csv_excel_bom,
            },
            drop_empty_records: self.drop_empty_records,
            ..Default::default()
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

/// `1`, `true`, `yes` and `on` (any case) are true; everything else is false.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
