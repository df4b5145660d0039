//! Deterministic text encryption for filterable metadata fields.
//!
//! Same key and plaintext always produce byte-identical ciphertext, so the
//! output can back equality filters in a database that never sees the
//! plaintext. Determinism comes from deriving the AES-GCM nonce from the
//! plaintext itself with a keyed HMAC; the encryption key is a dedicated
//! HKDF subkey so the nonce-derivation and encryption keys never collide
//! with other uses of the master material.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::hmac;

use crate::error::{Result, VeilError};
use crate::kdf::hkdf_sha256;
use crate::keys::EncryptionKey;

/// HKDF salt for the deterministic subkey. Fixed by the wire contract.
const DETERMINISTIC_SALT: &[u8] = b"DCPE-Deterministic";

/// HKDF info for the deterministic subkey. Fixed by the wire contract.
const DETERMINISTIC_INFO: &[u8] = b"deterministic_encryption_key";

/// AES-GCM tag length in bytes.
const TAG_LEN: usize = 16;

/// Shortest valid blob: nonce plus tag around an empty plaintext.
const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;

/// Derive the deterministic encryption subkey from the caller's key.
fn derive_subkey(key: &EncryptionKey) -> Result<Vec<u8>> {
    hkdf_sha256(key.as_bytes(), DETERMINISTIC_SALT, DETERMINISTIC_INFO, 32)
}

fn gcm_key(subkey: &[u8]) -> Result<LessSafeKey> {
    let unbound = UnboundKey::new(&AES_256_GCM, subkey)
        .map_err(|_| VeilError::InvalidKey("deterministic subkey is not a valid AES-256 key".into()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Deterministically encrypt a string.
///
/// Returns `nonce(12) || ciphertext || tag(16)`. Identical `(key, plaintext)`
/// pairs produce byte-identical output; distinct plaintexts produce distinct
/// output (the nonce alone collides with probability at most 2^-96).
pub fn encrypt_deterministic(key: &EncryptionKey, plaintext: &str) -> Result<Vec<u8>> {
    let subkey = derive_subkey(key)?;

    let nonce_key = hmac::Key::new(hmac::HMAC_SHA256, &subkey);
    let digest = hmac::sign(&nonce_key, plaintext.as_bytes());
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&digest.as_ref()[..NONCE_LEN]);

    let sealing_key = gcm_key(&subkey)?;
    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = sealing_key
        .seal_in_place_separate_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut buffer,
        )
        .map_err(|_| VeilError::Encrypt("deterministic encryption failed".into()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + buffer.len() + TAG_LEN);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&buffer);
    out.extend_from_slice(tag.as_ref());
    Ok(out)
}

/// Decrypt a deterministic blob back to its string plaintext.
///
/// # Errors
/// * `InvalidInput` if the blob is shorter than 28 bytes.
/// * `Decrypt` if the tag does not verify (tampered data or wrong key).
/// * `Serialization` if the authenticated plaintext is not valid UTF-8.
pub fn decrypt_deterministic(key: &EncryptionKey, blob: &[u8]) -> Result<String> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(VeilError::InvalidInput(format!(
            "deterministic ciphertext must be at least {MIN_BLOB_LEN} bytes, got {}",
            blob.len()
        )));
    }

    let subkey = derive_subkey(key)?;
    let opening_key = gcm_key(&subkey)?;

    let nonce = Nonce::try_assume_unique_for_key(&blob[..NONCE_LEN])
        .map_err(|_| VeilError::InvalidInput("malformed nonce".into()))?;
    let mut buffer = blob[NONCE_LEN..].to_vec();
    let plaintext = opening_key
        .open_in_place(nonce, Aad::empty(), &mut buffer)
        .map_err(|_| VeilError::Decrypt("authentication tag mismatch".into()))?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| VeilError::Serialization("decrypted field is not valid UTF-8".into()))
}
