use serde::Serialize;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, BookError>;

/// Coarse category of a [`BookError`], stable across error messages so
/// clients can branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingFile,
    ParseError,
    LookupError,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Lookup(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookError::MissingFile(_) => ErrorKind::MissingFile,
            BookError::Parse { .. } => ErrorKind::ParseError,
            BookError::Lookup(_) => ErrorKind::LookupError,
            BookError::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn parse(path: &Path, err: impl std::fmt::Display) -> Self {
        BookError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Classifies a filesystem error, keeping "not found" distinct from
    /// everything else.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            BookError::MissingFile(path.to_path_buf())
        } else {
            BookError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Fails with [`BookError::MissingFile`] unless `path` exists.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(BookError::MissingFile(path.to_path_buf()))
    }
}
