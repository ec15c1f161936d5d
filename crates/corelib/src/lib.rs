//! Core library for WireGuard peer groups.
//!
//! This crate provides the fundamental building blocks for managing groups of
//! mesh peers:
//! - Address blocks and host arithmetic
//! - Key generation and validation
//! - Group, peer record and peer view types
//! - Positional address allocation
//! - `wg-quick` config rendering

pub mod allocator;
pub mod block;
pub mod error;
pub mod group;
pub mod key;
pub mod peer;
pub mod render;

pub use allocator::{AddressAllocator, SequentialAllocator};
pub use block::AddressBlock;
pub use error::{Error, Result};
pub use group::{Group, PeerView, DEFAULT_TTL_SECS};
pub use key::{KeyManager, Keypair, ResolvedKeys, X25519KeyManager};
pub use peer::PeerRecord;
pub use render::{ConfigRenderer, WgQuickRenderer};
