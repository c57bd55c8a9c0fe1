use std::path::PathBuf;

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by user-store backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("cannot access users file {}: {source}", .path.display())]
    Io {
        /// Location of the users file on disk.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file exists but does not parse as a users document.
    #[error("users file {} is corrupt: {source}", .path.display())]
    Corrupt {
        /// Location of the users file on disk.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The in-memory document could not be serialized for writing.
    #[error("cannot encode users document: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    /// Registration hit an already-taken username.
    #[error("username `{username}` is already taken")]
    DuplicateUser {
        /// The name that was requested twice.
        username: String,
    },
    /// A score update referenced a username the store has never seen.
    #[error("unknown user `{username}`")]
    UnknownUser {
        /// The name the update was addressed to.
        username: String,
    },
}

impl StorageError {
    /// Construct an I/O error tagged with the file it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    /// Construct a corrupt-file error tagged with the file it concerns.
    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Corrupt {
            path: path.into(),
            source,
        }
    }
}
