//! Selfie storage
//!
//! Uploaded images are written under one directory as
//! `<random-hex>_<original-filename>`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Accepted image extensions (lowercase)
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid filename {0:?}")]
    InvalidFilename(String),
    #[error("Unsupported image type {0:?} (expected one of jpg, jpeg, png, gif, webp)")]
    UnsupportedExtension(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Rejected input rather than a failed write
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StorageError::Io(_))
    }
}

/// A selfie that was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSelfie {
    #[allow(dead_code)] // Used by tests
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SelfieStore {
    dir: PathBuf,
}

impl SelfieStore {
    /// Use `dir` for storage, creating it if absent
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    #[allow(dead_code)] // Used by tests
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a fresh unique name derived from `original_name`
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredSelfie, StorageError> {
        let original_name = sanitize_filename(original_name)?;
        let file_name = format!("{}_{original_name}", uuid::Uuid::new_v4().simple());
        let path = self.dir.join(&file_name);

        fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Selfie stored");

        Ok(StoredSelfie { file_name, path })
    }
}

/// Accept a bare file name with an allowed image extension
fn sanitize_filename(name: &str) -> Result<&str, StorageError> {
    let name = name.trim();
    let invalid = || StorageError::InvalidFilename(name.to_string());

    if name.is_empty() || name == "." || name == ".." || name.starts_with('.') {
        return Err(invalid());
    }
    if name.contains(['/', '\\']) || name.contains("..") || name.chars().any(char::is_control) {
        return Err(invalid());
    }

    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| StorageError::UnsupportedExtension(String::new()))?;
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StorageError::UnsupportedExtension(ext));
    }

    Ok(name)
}
