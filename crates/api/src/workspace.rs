//! Per-request temporary upload workspace.
//!
//! Every conversion request stages its uploads in a fresh directory that is
//! removed when the [`UploadWorkspace`] is dropped, whichever way the
//! handler exits. There is no shared upload or output directory.

use std::io;
use std::path::{Path, PathBuf};

use productcsv_core::conversion::UploadedDocument;
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "productcsv-";

/// A file written into the workspace, remembered in upload order.
#[derive(Debug)]
struct StagedFile {
    original_name: String,
    path: PathBuf,
}

#[derive(Debug)]
pub struct UploadWorkspace {
    dir: TempDir,
    files: Vec<StagedFile>,
}

impl UploadWorkspace {
    /// Create a workspace under `root`, or under the OS temp dir when `None`.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write one uploaded file. The on-disk name is index-prefixed and
    /// sanitized, so uploads with the same or hostile names never collide
    /// or escape the workspace.
    pub async fn stage(&mut self, original_name: &str, bytes: &[u8]) -> io::Result<()> {
        let disk_name = format!(
            "{:04}-{}",
            self.files.len(),
            sanitize_file_name(original_name, "upload")
        );
        let path = self.dir.path().join(disk_name);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(file = %original_name, path = %path.display(), size = bytes.len(), "Staged upload");
        self.files.push(StagedFile {
            original_name: original_name.to_string(),
            path,
        });
        Ok(())
    }

    /// Read every staged file back, in upload order.
    pub async fn load_documents(&self) -> io::Result<Vec<UploadedDocument>> {
        let mut documents = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let bytes = tokio::fs::read(&file.path).await?;
            documents.push(UploadedDocument::new(file.original_name.clone(), bytes));
        }
        Ok(documents)
    }
}

/// Reduce a client-supplied file name to a safe base name.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `_`. Names that end up empty or all dots fall back to `fallback`.
pub fn sanitize_file_name(name: &str, fallback: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        fallback.to_string()
    } else {
        cleaned
    }
}
