//! Service error types.

use storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed field, name, key or network; a missing required field
    #[error("{0}")]
    Validation(String),

    #[error("group {0} not found")]
    GroupNotFound(String),

    #[error("peer {peer} not found in group {group}")]
    PeerNotFound { group: String, peer: String },

    /// No handler for this operation/path combination
    #[error("unsupported {operation} on {path}")]
    Unsupported { operation: String, path: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Stored records disagree with each other
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    /// True for errors caused by the request rather than by the system.
    ///
    /// Rejections go back to the caller as a refused request; everything else
    /// is an internal failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_)
                | ServiceError::GroupNotFound(_)
                | ServiceError::PeerNotFound { .. }
                | ServiceError::Unsupported { .. }
        )
    }
}

impl From<corelib::Error> for ServiceError {
    fn from(err: corelib::Error) -> Self {
        match err {
            corelib::Error::PeerNotFound { group, peer } => {
                ServiceError::PeerNotFound { group, peer }
            }
            corelib::Error::MissingPeerRecord(_) => ServiceError::Internal(err.to_string()),
            corelib::Error::InvalidKey(_)
            | corelib::Error::InvalidNetwork { .. }
            | corelib::Error::AddressBlockExhausted { .. } => {
                ServiceError::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_rejections() {
        let err: ServiceError = corelib::Error::InvalidKey("short".into()).into();
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "invalid key: short");

        let err: ServiceError = corelib::Error::MissingPeerRecord("p".into()).into();
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let err: ServiceError = StorageError::backend("put", "groups/g", "disk full").into();
        assert!(!err.is_rejection());
        assert_eq!(err.to_string(), "storage put failed for groups/g: disk full");
    }
}
