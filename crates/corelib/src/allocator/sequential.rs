//! Sequential address allocation.
//!
//! # Algorithm
//!
//! 1. Sort the peer names ascending and drop duplicates
//! 2. Give the i-th name (1-indexed) the i-th host address after the base
//! 3. Aggregate allowed routes as the peer's own host route followed by its
//!    configured prefixes
//!
//! # Limitations
//!
//! Assignment is positional, not sticky. Adding or removing a peer whose name
//! sorts before another peer shifts that other peer's address, so existing
//! tunnels may need new configs after any membership change.

use std::collections::HashMap;

use crate::allocator::{check_capacity, AddressAllocator};
use crate::block::{host_route, AddressBlock};
use crate::error::{Error, Result};
use crate::group::PeerView;
use crate::peer::PeerRecord;

/// Positional allocator: address index = rank of the peer name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialAllocator;

impl SequentialAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl AddressAllocator for SequentialAllocator {
    fn allocate(
        &self,
        block: &AddressBlock,
        default_keepalive: u32,
        peer_names: &[String],
        records: &HashMap<String, PeerRecord>,
    ) -> Result<Vec<PeerView>> {
        let mut names: Vec<&str> = peer_names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();

        check_capacity(block, names.len())?;

        let mut views = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            let record = records
                .get(name)
                .ok_or_else(|| Error::MissingPeerRecord(name.to_string()))?;

            let addr = block
                .nth_host(index as u128 + 1)
                .ok_or_else(|| Error::AddressBlockExhausted {
                    network: block.to_string(),
                    capacity: block.host_capacity(),
                    requested: index + 1,
                })?;

            let allowed_ips = std::iter::once(host_route(addr).to_string())
                .chain(record.allowed_ips.iter().cloned())
                .collect::<Vec<_>>()
                .join(",");

            let persistent_keepalive = if record.is_endpoint() {
                0
            } else {
                default_keepalive
            };

            views.push(PeerView {
                name: name.to_string(),
                ip: block.interface_address(addr),
                hostname: record.hostname.clone(),
                persistent_keepalive,
                port: record.port,
                private_key: record.private_key.clone(),
                public_key: record.public_key.clone(),
                allowed_ips,
            });
        }

        Ok(views)
    }

    fn name(&self) -> &'static str {
        "SequentialAllocator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(peers: &[PeerRecord]) -> (Vec<String>, HashMap<String, PeerRecord>) {
        let names = peers.iter().map(|p| p.name.clone()).collect();
        let map = peers.iter().map(|p| (p.name.clone(), p.clone())).collect();
        (names, map)
    }

    #[test]
    fn test_empty_group() {
        let block: AddressBlock = "10.0.0.0/24".parse().unwrap();
        let views = SequentialAllocator
            .allocate(&block, 25, &[], &HashMap::new())
            .unwrap();
        assert!(views.is_empty());
    }

    #[test]
    fn test_missing_record() {
        let block: AddressBlock = "10.0.0.0/24".parse().unwrap();
        let err = SequentialAllocator
            .allocate(&block, 0, &["ghost".to_string()], &HashMap::new())
            .unwrap_err();
        assert_eq!(err, Error::MissingPeerRecord("ghost".to_string()));
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let block: AddressBlock = "10.0.0.0/24".parse().unwrap();
        let (mut names, map) = records(&[PeerRecord::new("a"), PeerRecord::new("b")]);
        names.push("a".to_string());

        let views = SequentialAllocator.allocate(&block, 0, &names, &map).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].ip, "10.0.0.2/24");
    }

    #[test]
    fn test_exhausted_block() {
        let block: AddressBlock = "10.0.0.0/31".parse().unwrap();
        let (names, map) = records(&[PeerRecord::new("a"), PeerRecord::new("b")]);

        let err = SequentialAllocator.allocate(&block, 0, &names, &map).unwrap_err();
        assert!(matches!(err, Error::AddressBlockExhausted { capacity: 1, requested: 2, .. }));
    }

    #[test]
    fn test_last_host_is_usable() {
        let block: AddressBlock = "10.0.0.0/30".parse().unwrap();
        let (names, map) = records(&[
            PeerRecord::new("a"),
            PeerRecord::new("b"),
            PeerRecord::new("c"),
        ]);

        let views = SequentialAllocator.allocate(&block, 0, &names, &map).unwrap();
        assert_eq!(views[2].ip, "10.0.0.3/30");
    }
}
