//! Core key manager trait definitions.

use crate::error::{Error, Result};

/// Length in bytes of a raw WireGuard key.
pub const KEY_LEN: usize = 32;

/// A private/public key pair, both base64 encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    pub private_key: String,
    pub public_key: String,
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Keys as they end up on a stored peer record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedKeys {
    /// Empty when only a public key was supplied.
    pub private_key: String,
    pub public_key: String,
}

/// Generates and validates the keypairs peers use to authenticate each other.
///
/// The public key must be a deterministic function of the private key so that
/// derived keys interoperate with real peer software.
pub trait KeyManager: Send + Sync + 'static {
    /// Generate a fresh keypair.
    fn generate_keypair(&self) -> Keypair;

    /// Derive the public key for a base64 private key.
    fn derive_public_key(&self, private_key: &str) -> Result<String>;

    /// Check that `key` is a well-formed key.
    fn validate_key(&self, key: &str) -> Result<()>;

    /// Returns the name of this key manager.
    fn name(&self) -> &'static str;

    /// Apply the write-path key policy for a peer create or update.
    ///
    /// * private key supplied: the public key is derived from it, any
    ///   supplied public key is validated and then replaced.
    /// * only a public key supplied: stored verbatim, no private key kept.
    /// * nothing supplied: `existing` keys are kept, or a fresh pair is
    ///   generated when there are none.
    fn resolve_keys(
        &self,
        private_key: Option<&str>,
        public_key: Option<&str>,
        existing: Option<&ResolvedKeys>,
    ) -> Result<ResolvedKeys> {
        if let Some(public) = public_key {
            self.validate_key(public)?;
        }

        match (private_key, public_key) {
            (Some(private), _) => Ok(ResolvedKeys {
                public_key: self.derive_public_key(private)?,
                private_key: private.to_string(),
            }),
            (None, Some(public)) => Ok(ResolvedKeys {
                private_key: String::new(),
                public_key: public.to_string(),
            }),
            (None, None) => match existing {
                Some(keys) if !keys.private_key.is_empty() || !keys.public_key.is_empty() => {
                    Ok(keys.clone())
                }
                _ => {
                    let pair = self.generate_keypair();
                    Ok(ResolvedKeys {
                        private_key: pair.private_key,
                        public_key: pair.public_key,
                    })
                }
            },
        }
    }
}

/// Decode a base64 key into its raw bytes, checking the length.
pub fn decode_key(key: &str) -> Result<[u8; KEY_LEN]> {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let bytes = BASE64
        .decode(key.trim())
        .map_err(|e| Error::InvalidKey(format!("invalid base64: {e}")))?;

    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        Error::InvalidKey(format!(
            "key must be {KEY_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}

/// Encode raw key bytes as base64 text.
pub fn encode_key(bytes: &[u8; KEY_LEN]) -> String {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    BASE64.encode(bytes)
}
