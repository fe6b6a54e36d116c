//! Error types for lodestore.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using lodestore's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store and restoration operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Object not found in store.
    #[error("Object not found: {hash}")]
    ObjectNotFound { hash: String },

    /// Label not found.
    #[error("Label not found: {name}")]
    LabelNotFound { name: String },

    /// Invalid hash format or encoding.
    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    /// Invalid label name or listing pattern.
    #[error("Invalid label: {reason}")]
    InvalidLabel { reason: String },

    /// A metadata-mutating system call failed.
    #[error("Unable to {op} {path}: {source}")]
    Syscall {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// The target file type cannot be created.
    #[error("Socket files can not be created: {path}")]
    UnsupportedFileType { path: PathBuf },

    /// Restored filesystem state does not match the target snapshot.
    #[error("Status mismatch at {path}: {actual} != {expected}")]
    StatusMismatch {
        path: PathBuf,
        actual: String,
        expected: String,
    },

    /// Internal invariant violated.
    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Create an ObjectNotFound error.
    pub fn object_not_found(hash: impl Into<String>) -> Self {
        Error::ObjectNotFound { hash: hash.into() }
    }

    /// Create a LabelNotFound error.
    pub fn label_not_found(name: impl Into<String>) -> Self {
        Error::LabelNotFound { name: name.into() }
    }

    /// Create an InvalidHash error.
    pub fn invalid_hash(reason: impl Into<String>) -> Self {
        Error::InvalidHash {
            reason: reason.into(),
        }
    }

    /// Create an InvalidLabel error.
    pub fn invalid_label(reason: impl Into<String>) -> Self {
        Error::InvalidLabel {
            reason: reason.into(),
        }
    }

    /// Create a Syscall error from the failing operation's name and path.
    pub fn syscall(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Syscall {
            op,
            path: path.into(),
            source,
        }
    }

    /// Create an UnsupportedFileType error.
    pub fn unsupported_file_type(path: impl Into<PathBuf>) -> Self {
        Error::UnsupportedFileType { path: path.into() }
    }

    /// Create a StatusMismatch error.
    pub fn status_mismatch(
        path: impl Into<PathBuf>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Error::StatusMismatch {
            path: path.into(),
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Create an Internal error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Error::Internal {
            reason: reason.into(),
        }
    }
}
