//! Address allocation abstractions.
//!
//! An allocator turns a group's address block and its full set of peer
//! records into the group's materialized peer view. It is re-run from scratch
//! on every membership change, so its output must depend only on its inputs:
//!
//! - **SequentialAllocator**: peers sorted by name get consecutive host
//!   addresses starting right after the block's base address.

pub mod sequential;

pub use sequential::SequentialAllocator;

use std::collections::HashMap;

use crate::block::AddressBlock;
use crate::error::{Error, Result};
use crate::group::PeerView;
use crate::peer::PeerRecord;

/// Trait for address allocators.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) as they are shared by
/// every group handled by a service.
pub trait AddressAllocator: Send + Sync + 'static {
    /// Compute the peer view for a group.
    ///
    /// # Arguments
    /// * `block` - The group's address block
    /// * `default_keepalive` - Keepalive for peers that are not endpoints
    /// * `peer_names` - Every peer in the group, in any order
    /// * `records` - Raw record for each name in `peer_names`
    ///
    /// # Returns
    /// One view per distinct name, ordered ascending by name
    fn allocate(
        &self,
        block: &AddressBlock,
        default_keepalive: u32,
        peer_names: &[String],
        records: &HashMap<String, PeerRecord>,
    ) -> Result<Vec<PeerView>>;

    /// Get the allocator name (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Fail if `block` cannot hold `peer_count` peers.
pub fn check_capacity(block: &AddressBlock, peer_count: usize) -> Result<()> {
    let capacity = block.host_capacity();
    if peer_count as u128 > capacity {
        return Err(Error::AddressBlockExhausted {
            network: block.to_string(),
            capacity,
            requested: peer_count,
        });
    }
    Ok(())
}
