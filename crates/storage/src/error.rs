//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The key-value engine itself failed
    #[error("storage {op} failed for {key}: {message}")]
    Backend {
        op: &'static str,
        key: String,
        message: String,
    },

    #[error("error encoding entry {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error decoding entry {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn backend(op: &'static str, key: impl Into<String>, message: impl ToString) -> Self {
        StorageError::Backend {
            op,
            key: key.into(),
            message: message.to_string(),
        }
    }
}
