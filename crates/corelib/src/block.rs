//! Address blocks owned by groups.
//!
//! A block is a CIDR prefix. Its base address is reserved; every other address
//! in the block is a host address that can be handed to a peer.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A group's address block, always stored with host bits cleared.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBlock(IpNet);

impl AddressBlock {
    /// Wrap a prefix, clearing any host bits (`10.0.0.7/24` becomes `10.0.0.0/24`).
    pub fn new(net: IpNet) -> Self {
        Self(net.trunc())
    }

    pub fn network(&self) -> IpNet {
        self.0
    }

    pub fn base(&self) -> IpAddr {
        self.0.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Number of assignable host addresses (every address but the base).
    pub fn host_capacity(&self) -> u128 {
        let host_bits = u32::from(self.0.max_prefix_len() - self.0.prefix_len());
        if host_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        }
    }

    /// The `n`th host address, counting from 1 right after the base address.
    pub fn nth_host(&self, n: u128) -> Option<IpAddr> {
        if n == 0 || n > self.host_capacity() {
            return None;
        }

        match self.base() {
            IpAddr::V4(base) => {
                let offset = u32::try_from(n).ok()?;
                Some(IpAddr::V4(Ipv4Addr::from(u32::from(base) + offset)))
            }
            IpAddr::V6(base) => Some(IpAddr::V6(Ipv6Addr::from(u128::from(base) + n))),
        }
    }

    /// `addr` with this block's mask, as used for an interface address.
    pub fn interface_address(&self, addr: IpAddr) -> String {
        format!("{}/{}", addr, self.prefix_len())
    }
}

/// `addr` with a full host mask (`/32` or `/128`).
pub fn host_route(addr: IpAddr) -> IpNet {
    IpNet::from(addr)
}

/// Parse a prefix supplied by a client, keeping it exactly as written.
pub fn parse_prefix(input: &str) -> Result<IpNet> {
    input
        .trim()
        .parse::<IpNet>()
        .map_err(|e| Error::invalid_network(input, e))
}

impl FromStr for AddressBlock {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_prefix(s).map(Self::new)
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<IpNet> for AddressBlock {
    fn from(net: IpNet) -> Self {
        Self::new(net)
    }
}
