//! Error types for directory and storage operations.

use std::path::PathBuf;

use phonebook_types::{ContactId, ValidationError};
use thiserror::Error;

/// Errors that can occur while operating on a directory or its file.
///
/// None of these are fatal: the failed operation leaves the directory as it
/// was, and the caller may report the error and carry on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A name or phone was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No contact has the requested id.
    #[error("contact with id={id} not found")]
    ContactNotFound { id: ContactId },

    /// Every id up to the largest representable one has been handed out.
    #[error("no contact ids left")]
    IdsExhausted,

    /// Loading or saving the directory file failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures of the text persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The path exists but is not a regular file.
    #[error("path is not a file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// A line could not be decoded into a contact.
    #[error("parse error in {} at line {line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// I/O error while reading or writing the file.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for directory and storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
