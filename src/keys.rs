//! Key types and derivation from a master secret.

use std::fmt;

use ring::hmac;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, VeilError};

/// Minimum bytes needed to build a [`VectorEncryptionKey`]: 3 for the
/// scaling factor plus 32 for the key itself.
const VECTOR_KEY_LEN: usize = 35;

/// Opaque symmetric key bytes.
///
/// Equality is value equality on the bytes. The material is zeroized when
/// the key is dropped, and `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey(Vec<u8>);

impl EncryptionKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the key in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey({} bytes)", self.0.len())
    }
}

/// Multiplier applied to every plaintext coordinate before noise is added.
///
/// Zero is representable (it appears in raw key bytes) but is rejected as
/// an invalid key at encryption and decryption time.
#[derive(Clone, Copy, PartialEq, Zeroize)]
pub struct ScalingFactor(f32);

impl ScalingFactor {
    /// Wrap a scaling factor value.
    #[must_use]
    pub fn new(factor: f32) -> Self {
        Self(factor)
    }

    /// The scaling factor as a float.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Debug for ScalingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScalingFactor({})", self.0)
    }
}

/// The key pair driving vector encryption: a scaling factor and the
/// symmetric key used for shuffling, noise authentication, and the MAC.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct VectorEncryptionKey {
    /// Scalar applied to each coordinate.
    pub scaling_factor: ScalingFactor,
    /// Symmetric key material.
    pub key: EncryptionKey,
}

impl VectorEncryptionKey {
    /// Assemble a key from its parts.
    #[must_use]
    pub fn new(scaling_factor: ScalingFactor, key: EncryptionKey) -> Self {
        Self {
            scaling_factor,
            key,
        }
    }

    /// Derive a vector key from a master secret for one tenant and path.
    ///
    /// Computes `HMAC-SHA-512(secret, "{tenant_id}-{derivation_path}")` and
    /// reinterprets the leading bytes via [`VectorEncryptionKey::unsafe_bytes_to_key`].
    pub fn derive_from_secret(
        secret: &[u8],
        tenant_id: &str,
        derivation_path: &str,
    ) -> Result<Self> {
        let mac_key = hmac::Key::new(hmac::HMAC_SHA512, secret);
        let payload = format!("{tenant_id}-{derivation_path}");
        let tag = hmac::sign(&mac_key, payload.as_bytes());
        Self::unsafe_bytes_to_key(tag.as_ref())
    }

    /// Reinterpret raw bytes as a vector key without any entropy checks.
    ///
    /// The first 3 bytes become the scaling factor (read big-endian with a
    /// zero byte prepended, so the factor fits in 24 bits); the next 32
    /// bytes become the encryption key.
    pub fn unsafe_bytes_to_key(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < VECTOR_KEY_LEN {
            return Err(VeilError::InvalidKey(format!(
                "vector key requires at least {VECTOR_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let scaling = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
        #[allow(clippy::cast_precision_loss)] // 24-bit values are exact in f32
        let scaling_factor = ScalingFactor::new(scaling as f32);
        let key = EncryptionKey::new(bytes[3..VECTOR_KEY_LEN].to_vec());
        Ok(Self::new(scaling_factor, key))
    }
}

impl fmt::Debug for VectorEncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VectorEncryptionKey({:?}, {:?})",
            self.scaling_factor, self.key
        )
    }
}
