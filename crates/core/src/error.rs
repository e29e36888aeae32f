use crate::conversion::FileReport;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Nothing usable came out of the uploaded files.
    #[error("No records could be extracted from {} uploaded file(s)", files.len())]
    EmptyResult { files: Vec<FileReport> },

    #[error("Invalid alias table: {0}")]
    InvalidAliasTable(String),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
