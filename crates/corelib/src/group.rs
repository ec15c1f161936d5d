//! Groups and their materialized peer view.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::block::AddressBlock;

/// Lease TTL used when a group does not set one.
pub const DEFAULT_TTL_SECS: u64 = 60;

/// A named group of peers sharing one address block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub network: AddressBlock,
    /// Keepalive handed to peers that are not endpoints. 0 disables it.
    #[serde(default)]
    pub persistent_keepalive: u32,
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    #[serde(default = "default_ttl")]
    pub max_ttl: u64,
    /// Derived from the peer records; rebuilt wholesale on every mutation.
    #[serde(default)]
    pub peers: Vec<PeerView>,
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECS
}

impl Group {
    pub fn new(name: impl Into<String>, network: AddressBlock) -> Self {
        Self {
            name: name.into(),
            network,
            persistent_keepalive: 0,
            ttl: DEFAULT_TTL_SECS,
            max_ttl: DEFAULT_TTL_SECS,
            peers: Vec::new(),
        }
    }

    pub fn with_keepalive(mut self, seconds: u32) -> Self {
        self.persistent_keepalive = seconds;
        self
    }

    /// Look up a peer in the materialized view.
    pub fn peer(&self, name: &str) -> Option<&PeerView> {
        self.peers.iter().find(|p| p.name == name)
    }
}

/// Fully resolved view of one peer inside its group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerView {
    pub name: String,
    /// Assigned address with the block mask, e.g. `10.0.0.1/24`.
    pub ip: String,
    pub hostname: String,
    /// Effective keepalive: the group default for non-endpoints, else 0.
    pub persistent_keepalive: u32,
    pub port: u16,
    pub private_key: String,
    pub public_key: String,
    /// Own host route followed by the extra prefixes, comma separated.
    pub allowed_ips: String,
}

impl PeerView {
    /// The assigned address without its mask.
    pub fn address(&self) -> Option<IpAddr> {
        self.ip.split('/').next()?.parse().ok()
    }

    pub fn endpoint(&self) -> Option<String> {
        (self.port != 0).then(|| format!("{}:{}", self.hostname, self.port))
    }
}
