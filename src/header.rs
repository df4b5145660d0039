//! Key-id header and vector metadata wire codec.
//!
//! Every ciphertext stored next to a third party is framed with a 6-byte
//! header naming the key that produced it:
//!
//! ```text
//! offset  len  field
//! 0       4    key id                  (u32 BE)
//! 4       1    (edek idx << 4) | payload idx
//! 5       1    reserved, must be 0
//! ```
//!
//! Vector metadata concatenates `header(6) || iv(12) || auth_hash(32)` for
//! a fixed 50-byte blob.

use serde::{Deserialize, Serialize};

use crate::auth::{AuthHash, AUTH_HASH_LEN};
use crate::error::{Result, VeilError};
use crate::vector::IV_LEN;

/// Encoded header length in bytes.
pub const HEADER_LEN: usize = 6;

/// Encoded vector metadata length in bytes.
pub const VECTOR_METADATA_LEN: usize = HEADER_LEN + IV_LEN + AUTH_HASH_LEN;

/// Where the wrapped document key for a ciphertext lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdekType {
    /// The caller manages keys directly.
    Standalone,
    /// Keys are held by a SaaS Shield tenant security proxy.
    SaasShield,
    /// Keys are held by a Data Control Platform deployment.
    DataControlPlatform,
}

impl EdekType {
    fn to_index(self) -> u8 {
        match self {
            Self::Standalone => 0,
            Self::SaasShield => 1,
            Self::DataControlPlatform => 2,
        }
    }

    fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Self::Standalone),
            1 => Ok(Self::SaasShield),
            2 => Ok(Self::DataControlPlatform),
            _ => Err(VeilError::InvalidInput(format!(
                "unknown edek type index {index}"
            ))),
        }
    }
}

/// What kind of ciphertext follows the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadType {
    /// A deterministically encrypted field.
    DeterministicField,
    /// Vector encryption metadata (IV and authentication hash).
    VectorMetadata,
    /// A standard wrapped-key payload.
    StandardEdek,
}

impl PayloadType {
    fn to_index(self) -> u8 {
        match self {
            Self::DeterministicField => 0,
            Self::VectorMetadata => 1,
            Self::StandardEdek => 2,
        }
    }

    fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Self::DeterministicField),
            1 => Ok(Self::VectorMetadata),
            2 => Ok(Self::StandardEdek),
            _ => Err(VeilError::InvalidInput(format!(
                "unknown payload type index {index}"
            ))),
        }
    }
}

/// The 6-byte header identifying a ciphertext's key and payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIdHeader {
    /// Identifier of the key that produced the ciphertext.
    pub key_id: u32,
    /// Key management scheme.
    pub edek_type: EdekType,
    /// Kind of ciphertext that follows.
    pub payload_type: PayloadType,
}

impl KeyIdHeader {
    /// Assemble a header.
    #[must_use]
    pub fn new(key_id: u32, edek_type: EdekType, payload_type: PayloadType) -> Self {
        Self {
            key_id,
            edek_type,
            payload_type,
        }
    }

    /// Encode to the fixed 6-byte wire form.
    #[must_use]
    pub fn write_to_bytes(&self) -> [u8; HEADER_LEN] {
        let id = self.key_id.to_be_bytes();
        let packed = (self.edek_type.to_index() << 4) | self.payload_type.to_index();
        [id[0], id[1], id[2], id[3], packed, 0x00]
    }

    /// Decode from exactly 6 bytes.
    ///
    /// # Errors
    /// Returns `VeilError::InvalidInput` if the length is wrong, the
    /// reserved byte is non-zero, or either enum index is out of range.
    pub fn parse_from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HEADER_LEN {
            return Err(VeilError::InvalidInput(format!(
                "key id header must be {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[5] != 0 {
            return Err(VeilError::InvalidInput(format!(
                "reserved header byte must be zero, got {:#04x}",
                bytes[5]
            )));
        }
        let key_id = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let edek_type = EdekType::from_index(bytes[4] >> 4)?;
        let payload_type = PayloadType::from_index(bytes[4] & 0x0F)?;
        Ok(Self::new(key_id, edek_type, payload_type))
    }
}

/// Decoded vector metadata: header, IV, and authentication hash.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMetadata {
    /// Key id and payload framing.
    pub header: KeyIdHeader,
    /// IV the vector was encrypted with.
    pub iv: [u8; IV_LEN],
    /// Authentication hash over the ciphertext.
    pub auth_hash: AuthHash,
}

/// Encode the 50-byte metadata blob stored alongside a ciphertext vector.
#[must_use]
pub fn encode_vector_metadata(
    header: &KeyIdHeader,
    iv: &[u8; IV_LEN],
    auth_hash: &AuthHash,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(VECTOR_METADATA_LEN);
    out.extend_from_slice(&header.write_to_bytes());
    out.extend_from_slice(iv);
    out.extend_from_slice(auth_hash.as_bytes());
    out
}

/// Split a header-prefixed blob into its header and remaining bytes.
///
/// # Errors
/// Returns `VeilError::InvalidInput` if fewer than 6 bytes are present or
/// the header does not parse.
pub fn decode_version_prefixed(bytes: &[u8]) -> Result<(KeyIdHeader, &[u8])> {
    if bytes.len() < HEADER_LEN {
        return Err(VeilError::InvalidInput(format!(
            "header-prefixed blob must be at least {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let header = KeyIdHeader::parse_from_bytes(&bytes[..HEADER_LEN])?;
    Ok((header, &bytes[HEADER_LEN..]))
}

/// Decode a full 50-byte vector metadata blob.
///
/// # Errors
/// Returns `VeilError::InvalidInput` if the blob is not exactly 50 bytes
/// or the header does not parse.
pub fn decode_vector_metadata(bytes: &[u8]) -> Result<VectorMetadata> {
    let (header, rest) = decode_version_prefixed(bytes)?;
    if rest.len() != IV_LEN + AUTH_HASH_LEN {
        return Err(VeilError::InvalidInput(format!(
            "vector metadata must be {VECTOR_METADATA_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&rest[..IV_LEN]);
    let auth_hash = AuthHash::from_slice(&rest[IV_LEN..])?;
    Ok(VectorMetadata {
        header,
        iv,
        auth_hash,
    })
}
