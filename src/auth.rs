//! Keyed authentication hash over encrypted vectors.

use ring::hmac;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::{Result, VeilError};
use crate::keys::VectorEncryptionKey;

/// Authentication hash length in bytes (HMAC-SHA-256 digest).
pub const AUTH_HASH_LEN: usize = 32;

/// A 32-byte HMAC over an encrypted vector and its context parameters.
///
/// Detects any modification of the ciphertext, IV, scaling factor, or
/// approximation factor. Equality is constant-time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthHash([u8; AUTH_HASH_LEN]);

impl AuthHash {
    /// Wrap a digest.
    #[must_use]
    pub fn new(bytes: [u8; AUTH_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a digest from a slice.
    ///
    /// # Errors
    /// Returns `VeilError::InvalidInput` if the slice is not exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != AUTH_HASH_LEN {
            return Err(VeilError::InvalidInput(format!(
                "authentication hash must be {AUTH_HASH_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; AUTH_HASH_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Borrow the digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; AUTH_HASH_LEN] {
        &self.0
    }
}

impl PartialEq for AuthHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for AuthHash {}

/// Compute the authentication hash for an encrypted vector.
///
/// The message is `f32_le(s) || f32_le(a) || iv || f32_le(ct[0]) || ...`,
/// keyed by the vector encryption key. Every float is serialized as
/// IEEE-754 binary32 little-endian; the byte order is part of the wire
/// contract and must not change.
#[must_use]
pub fn compute_auth_hash(
    key: &VectorEncryptionKey,
    approximation_factor: f32,
    iv: &[u8],
    ciphertext: &[f32],
) -> AuthHash {
    let mac_key = hmac::Key::new(hmac::HMAC_SHA256, key.key.as_bytes());
    let mut message = Vec::with_capacity(8 + iv.len() + ciphertext.len() * 4);
    message.extend_from_slice(&key.scaling_factor.value().to_le_bytes());
    message.extend_from_slice(&approximation_factor.to_le_bytes());
    message.extend_from_slice(iv);
    for &coordinate in ciphertext {
        message.extend_from_slice(&coordinate.to_le_bytes());
    }
    let tag = hmac::sign(&mac_key, &message);
    let mut bytes = [0u8; AUTH_HASH_LEN];
    bytes.copy_from_slice(tag.as_ref());
    AuthHash(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{EncryptionKey, ScalingFactor};

    fn test_key() -> VectorEncryptionKey {
        VectorEncryptionKey::new(ScalingFactor::new(2.0), EncryptionKey::new(vec![0x01; 32]))
    }

    #[test]
    fn test_hash_deterministic() {
        let key = test_key();
        let ct = [1.5f32, -2.5, 3.25];
        let a = compute_auth_hash(&key, 1.0, &[0u8; 12], &ct);
        let b = compute_auth_hash(&key, 1.0, &[0u8; 12], &ct);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_binds_all_inputs() {
        let key = test_key();
        let ct = [1.5f32, -2.5, 3.25];
        let base = compute_auth_hash(&key, 1.0, &[0u8; 12], &ct);

        let other_key = VectorEncryptionKey::new(
            ScalingFactor::new(2.0),
            EncryptionKey::new(vec![0x02; 32]),
        );
        assert_ne!(base, compute_auth_hash(&other_key, 1.0, &[0u8; 12], &ct));

        let other_scaling = VectorEncryptionKey::new(
            ScalingFactor::new(3.0),
            EncryptionKey::new(vec![0x01; 32]),
        );
        assert_ne!(base, compute_auth_hash(&other_scaling, 1.0, &[0u8; 12], &ct));

        assert_ne!(base, compute_auth_hash(&key, 2.0, &[0u8; 12], &ct));
        assert_ne!(base, compute_auth_hash(&key, 1.0, &[1u8; 12], &ct));
        assert_ne!(base, compute_auth_hash(&key, 1.0, &[0u8; 12], &[1.5, -2.5, 3.5]));
    }

    #[test]
    fn test_empty_ciphertext_hashes() {
        let key = test_key();
        let hash = compute_auth_hash(&key, 1.0, &[0u8; 12], &[]);
        assert_eq!(hash.as_bytes().len(), AUTH_HASH_LEN);
    }

    #[test]
    fn test_from_slice_length_check() {
        assert!(AuthHash::from_slice(&[0u8; 31]).is_err());
        assert!(AuthHash::from_slice(&[0u8; 33]).is_err());
        assert!(AuthHash::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let hash = compute_auth_hash(&test_key(), 1.0, &[3u8; 12], &[1.0, 2.0]);
        let json = serde_json::to_string(&hash).unwrap();
        let back: AuthHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }
}
