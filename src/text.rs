//! Standard authenticated text encryption for opaque payload fields.
//!
//! Random-nonce AES-256-GCM. Unlike the deterministic mode, two
//! encryptions of the same plaintext are unrelated; use this for payloads
//! that never need server-side equality filtering.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VeilError};
use crate::keys::EncryptionKey;
use crate::random::random_bytes;
use crate::vector::IV_LEN;

/// AES-GCM tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Ciphertext, IV, and tag from one standard text encryption.
///
/// Framing for storage or transport is the caller's concern; the three
/// fields are deliberately separate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedText {
    /// AES-256-GCM ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Fresh random IV; never reused across encryptions.
    pub iv: [u8; IV_LEN],
    /// GCM authentication tag.
    pub tag: [u8; TAG_LEN],
}

fn gcm_key(key: &EncryptionKey) -> Result<LessSafeKey> {
    if key.len() < 32 {
        return Err(VeilError::InvalidKey(format!(
            "text encryption key must be at least 32 bytes, got {}",
            key.len()
        )));
    }
    let unbound = UnboundKey::new(&AES_256_GCM, &key.as_bytes()[..32])
        .map_err(|_| VeilError::InvalidKey("key is not a valid AES-256 key".into()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt a string under the first 32 bytes of `key` with a fresh IV.
pub fn encrypt_text(key: &EncryptionKey, plaintext: &str) -> Result<EncryptedText> {
    let sealing_key = gcm_key(key)?;
    let iv: [u8; IV_LEN] = random_bytes()?;

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = sealing_key
        .seal_in_place_separate_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut buffer)
        .map_err(|_| VeilError::Encrypt("text encryption failed".into()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());
    Ok(EncryptedText {
        ciphertext: buffer,
        iv,
        tag: tag_bytes,
    })
}

/// Verify and decrypt an [`EncryptedText`].
///
/// # Errors
/// * `InvalidKey` if the key is shorter than 32 bytes.
/// * `Decrypt` if the tag does not verify (tampered data or wrong key).
/// * `Serialization` if the authenticated plaintext is not valid UTF-8.
pub fn decrypt_text(key: &EncryptionKey, encrypted: &EncryptedText) -> Result<String> {
    let opening_key = gcm_key(key)?;

    let mut buffer = Vec::with_capacity(encrypted.ciphertext.len() + TAG_LEN);
    buffer.extend_from_slice(&encrypted.ciphertext);
    buffer.extend_from_slice(&encrypted.tag);

    let plaintext = opening_key
        .open_in_place(
            Nonce::assume_unique_for_key(encrypted.iv),
            Aad::empty(),
            &mut buffer,
        )
        .map_err(|_| VeilError::Decrypt("authentication tag mismatch".into()))?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| VeilError::Serialization("decrypted payload is not valid UTF-8".into()))
}
