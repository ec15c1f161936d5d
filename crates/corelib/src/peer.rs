//! Peer records.
//!
//! A peer record is exactly what a client wrote. It never carries an address:
//! addresses are positional and recomputed from the whole group on every
//! change (see [`crate::allocator`]).

use serde::{Deserialize, Serialize};

use crate::key::ResolvedKeys;

/// Raw, client-authored peer record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerRecord {
    pub name: String,
    /// Host used for the endpoint line. Defaults to `name`.
    pub hostname: String,
    /// Listening port; 0 means the peer is not an endpoint.
    pub port: u16,
    /// Extra prefixes routed through this peer, in the order supplied.
    pub allowed_ips: Vec<String>,
    pub private_key: String,
    pub public_key: String,
}

impl PeerRecord {
    /// Construct a record with the hostname defaulted to the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            hostname: name.clone(),
            name,
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_allowed_ips<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_ips = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keys(mut self, keys: ResolvedKeys) -> Self {
        self.private_key = keys.private_key;
        self.public_key = keys.public_key;
        self
    }

    pub fn keys(&self) -> ResolvedKeys {
        ResolvedKeys {
            private_key: self.private_key.clone(),
            public_key: self.public_key.clone(),
        }
    }

    /// Endpoint peers are reachable directly and need no keepalive.
    pub fn is_endpoint(&self) -> bool {
        self.port != 0
    }
}
