//! HKDF-SHA256 key derivation (RFC 5869).

use ring::hkdf;

use crate::error::{Result, VeilError};

/// Output length marker for `ring`'s HKDF expand step.
struct OkmLen(usize);

impl hkdf::KeyType for OkmLen {
    fn len(&self) -> usize {
        self.0
    }
}

/// Derive `len` bytes from input keying material using HKDF-SHA256.
///
/// Extract-and-expand per RFC 5869: `PRK = HMAC(salt, ikm)` followed by the
/// iterated expand over `info`. Deterministic: same inputs, same output.
///
/// # Errors
/// Returns `VeilError::InvalidInput` if `len` exceeds the RFC limit of
/// 255 hash lengths (8160 bytes for SHA-256).
pub fn hkdf_sha256(ikm: &[u8], salt: &[u8], info: &[u8], len: usize) -> Result<Vec<u8>> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt).extract(ikm);
    let info_slices = [info];
    let okm = prk.expand(&info_slices, OkmLen(len)).map_err(|_| {
        VeilError::InvalidInput(format!("requested HKDF output length {len} is out of range"))
    })?;
    let mut out = vec![0u8; len];
    okm.fill(&mut out).map_err(|_| {
        VeilError::InvalidInput(format!("requested HKDF output length {len} is out of range"))
    })?;
    Ok(out)
}
