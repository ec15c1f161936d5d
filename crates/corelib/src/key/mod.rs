//! Key management for peers.
//!
//! Keys are 32 byte X25519 values carried as base64 text. The public key is
//! derived from the private key by scalar multiplication against the curve's
//! base point, exactly as WireGuard does.

pub mod traits;
pub mod x25519;

pub use traits::{KeyManager, Keypair, ResolvedKeys};
pub use x25519::X25519KeyManager;
