//! X25519 key manager (WireGuard compatible).

use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::Result;
use crate::key::traits::{decode_key, encode_key, KeyManager, Keypair, KEY_LEN};

/// Key manager backed by `x25519-dalek`.
#[derive(Clone, Copy, Debug, Default)]
pub struct X25519KeyManager;

impl X25519KeyManager {
    pub fn new() -> Self {
        Self
    }
}

/// Clamp a scalar the way `wg genkey` does before storing it.
fn clamp(bytes: &mut [u8; KEY_LEN]) {
    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;
}

impl KeyManager for X25519KeyManager {
    fn generate_keypair(&self) -> Keypair {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        clamp(&mut bytes);

        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);

        Keypair {
            private_key: encode_key(&secret.to_bytes()),
            public_key: encode_key(public.as_bytes()),
        }
    }

    fn derive_public_key(&self, private_key: &str) -> Result<String> {
        let secret = StaticSecret::from(decode_key(private_key)?);
        Ok(encode_key(PublicKey::from(&secret).as_bytes()))
    }

    fn validate_key(&self, key: &str) -> Result<()> {
        decode_key(key).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "X25519KeyManager"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::traits::ResolvedKeys;
    use crate::Error;

    const PRIVATE_KEY: &str = "sK5mAmlrbsEvhQBpn5quJi/7xrhooUkkaw8rtaM8F0k=";
    const PUBLIC_KEY: &str = "lpTCQOdhnt1nTRdcuhuVLNNhk6Azr2WDZ1xJKofUfnE=";

    #[test]
    fn test_derive_known_vector() {
        let keys = X25519KeyManager::new();
        assert_eq!(keys.derive_public_key(PRIVATE_KEY).unwrap(), PUBLIC_KEY);
    }

    #[test]
    fn test_generated_pair_is_consistent() {
        let keys = X25519KeyManager::new();
        let pair = keys.generate_keypair();

        assert_eq!(pair.private_key.len(), 44);
        assert!(keys.validate_key(&pair.private_key).is_ok());
        assert!(keys.validate_key(&pair.public_key).is_ok());
        assert_eq!(keys.derive_public_key(&pair.private_key).unwrap(), pair.public_key);

        let raw = decode_key(&pair.private_key).unwrap();
        assert_eq!(raw[0] & 7, 0);
        assert_eq!(raw[31] & 0xc0, 0x40);
    }

    #[test]
    fn test_generated_pairs_differ() {
        let keys = X25519KeyManager::new();
        assert_ne!(keys.generate_keypair(), keys.generate_keypair());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let keys = X25519KeyManager::new();
        assert!(matches!(keys.validate_key("not base64!!"), Err(Error::InvalidKey(_))));
        assert!(matches!(keys.validate_key("AAAA"), Err(Error::InvalidKey(_))));
        assert!(matches!(keys.derive_public_key(""), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_resolve_private_only_derives_public() {
        let keys = X25519KeyManager::new();
        let resolved = keys.resolve_keys(Some(PRIVATE_KEY), None, None).unwrap();
        assert_eq!(resolved.private_key, PRIVATE_KEY);
        assert_eq!(resolved.public_key, PUBLIC_KEY);
    }

    #[test]
    fn test_resolve_private_overrides_supplied_public() {
        let keys = X25519KeyManager::new();
        let other = keys.generate_keypair();
        let resolved = keys
            .resolve_keys(Some(PRIVATE_KEY), Some(&other.public_key), None)
            .unwrap();
        assert_eq!(resolved.public_key, PUBLIC_KEY);
    }

    #[test]
    fn test_resolve_public_only_drops_private() {
        let keys = X25519KeyManager::new();
        let existing = ResolvedKeys {
            private_key: PRIVATE_KEY.to_string(),
            public_key: PUBLIC_KEY.to_string(),
        };
        let other = keys.generate_keypair();
        let resolved = keys
            .resolve_keys(None, Some(&other.public_key), Some(&existing))
            .unwrap();
        assert_eq!(resolved.private_key, "");
        assert_eq!(resolved.public_key, other.public_key);
    }

    #[test]
    fn test_resolve_nothing_keeps_existing_or_generates() {
        let keys = X25519KeyManager::new();
        let existing = ResolvedKeys {
            private_key: PRIVATE_KEY.to_string(),
            public_key: PUBLIC_KEY.to_string(),
        };
        assert_eq!(keys.resolve_keys(None, None, Some(&existing)).unwrap(), existing);

        let fresh = keys.resolve_keys(None, None, None).unwrap();
        assert_eq!(keys.derive_public_key(&fresh.private_key).unwrap(), fresh.public_key);
    }

    #[test]
    fn test_resolve_rejects_bad_public() {
        let keys = X25519KeyManager::new();
        assert!(keys.resolve_keys(Some(PRIVATE_KEY), Some("bogus"), None).is_err());
    }
}
