use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive format error: {0}")]
    ArchiveFormat(String),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("No prefab assets in {}", .0.display())]
    NoPrefabs(PathBuf),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Search term must have at least {0} characters")]
    TermTooShort(usize),

    #[error("Unknown package: {0}")]
    UnknownPackage(String),
}

impl From<zip::result::ZipError> for IndexError {
    fn from(e: zip::result::ZipError) -> Self {
        IndexError::ArchiveFormat(format!("zip: {e}"))
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, IndexError>;
