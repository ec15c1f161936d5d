//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Key text is not a base64 encoded 32 byte key
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Network or allowed-ips prefix could not be parsed
    #[error("invalid network {input:?}: {reason}")]
    InvalidNetwork { input: String, reason: String },

    /// More peers than the block has host addresses
    #[error("network {network} has room for {capacity} peers, {requested} requested")]
    AddressBlockExhausted {
        network: String,
        capacity: u128,
        requested: usize,
    },

    /// A peer name was listed but its record was not supplied
    #[error("no record for peer {0}")]
    MissingPeerRecord(String),

    /// Target peer is not part of the group view
    #[error("peer {peer} not found in group {group}")]
    PeerNotFound { group: String, peer: String },
}

impl Error {
    pub fn invalid_network(input: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidNetwork {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}
