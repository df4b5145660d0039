//! Distance-comparison-preserving vector encryption.
//!
//! Encryption shuffles the coordinates with a keyed permutation, scales
//! them, adds bounded noise from the n-ball, and authenticates the result
//! with a keyed hash. Relative distances between vectors survive the
//! transform, so nearest-neighbor search over ciphertexts approximates
//! search over plaintexts; individual coordinates do not survive it.
//!
//! Decryption re-draws the noise rather than reproducing it, so a
//! round-trip recovers each coordinate only approximately: each of the two
//! independent noise draws has norm below `s * a / 4`, so after dividing by
//! the scaling factor the recovered coordinate sits strictly within `a / 2`
//! of the original. Callers comparing decrypted vectors must use that
//! tolerance.

use serde::{Deserialize, Serialize};

use crate::auth::{compute_auth_hash, AuthHash};
use crate::error::{Result, VeilError};
use crate::keys::VectorEncryptionKey;
use crate::noise::generate_noise_vector;
use crate::random::random_bytes;
use crate::shuffle::{shuffle, unshuffle};

/// IV length in bytes for vector encryption.
pub const IV_LEN: usize = 12;

/// An encrypted vector with its IV and authentication hash.
///
/// The ciphertext has the same length as the plaintext and is what gets
/// stored in the vector database; the IV and hash travel in the metadata
/// blob alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedVector {
    /// Scaled, noised, shuffled coordinates.
    pub ciphertext: Vec<f32>,
    /// Fresh random IV for this encryption.
    pub iv: [u8; IV_LEN],
    /// Keyed hash over the ciphertext and context parameters.
    pub auth_hash: AuthHash,
}

fn check_scaling_factor(key: &VectorEncryptionKey) -> Result<f32> {
    let scaling_factor = key.scaling_factor.value();
    if scaling_factor == 0.0 {
        return Err(VeilError::InvalidKey(
            "scaling factor must be non-zero".into(),
        ));
    }
    Ok(scaling_factor)
}

fn check_approximation_factor(approximation_factor: f32) -> Result<()> {
    if !approximation_factor.is_finite() || approximation_factor <= 0.0 {
        return Err(VeilError::InvalidInput(
            "approximation factor must be a positive finite number".into(),
        ));
    }
    Ok(())
}

/// Encrypt a plaintext vector.
///
/// Length-0 vectors are accepted and produce a length-0 ciphertext with a
/// valid IV and hash.
///
/// # Errors
/// * `InvalidKey` if the scaling factor is zero.
/// * `InvalidInput` if the approximation factor is not positive and finite.
/// * `VectorEncrypt` if the plaintext contains non-finite coordinates.
/// * `Overflow` if any scaled coordinate leaves the finite f32 range.
pub fn encrypt_vector(
    key: &VectorEncryptionKey,
    approximation_factor: f32,
    plaintext: &[f32],
) -> Result<EncryptedVector> {
    let scaling_factor = check_scaling_factor(key)?;
    check_approximation_factor(approximation_factor)?;
    if plaintext.iter().any(|v| !v.is_finite()) {
        return Err(VeilError::VectorEncrypt(
            "plaintext contains non-finite coordinates".into(),
        ));
    }

    let shuffled = shuffle(&key.key, plaintext);
    let iv: [u8; IV_LEN] = random_bytes()?;
    let noise = if plaintext.is_empty() {
        Vec::new()
    } else {
        generate_noise_vector(key, &iv, approximation_factor, plaintext.len())?
    };

    #[allow(clippy::cast_possible_truncation)]
    let ciphertext: Vec<f32> = shuffled
        .iter()
        .zip(noise.iter())
        .map(|(&value, &noise_term)| (f64::from(scaling_factor) * f64::from(value) + noise_term) as f32)
        .collect();
    if ciphertext.iter().any(|c| !c.is_finite()) {
        return Err(VeilError::Overflow(
            "scaled ciphertext coordinate is not finite".into(),
        ));
    }

    let auth_hash = compute_auth_hash(key, approximation_factor, &iv, &ciphertext);
    Ok(EncryptedVector {
        ciphertext,
        iv,
        auth_hash,
    })
}

/// Verify and decrypt an encrypted vector.
///
/// The hash is recomputed and compared in constant time before anything
/// else happens; a mismatch reports `Decrypt` whether the cause is a wrong
/// key or a tampered ciphertext.
///
/// # Errors
/// * `InvalidKey` if the scaling factor is zero.
/// * `InvalidInput` if the approximation factor is not positive and finite.
/// * `Decrypt` on authentication hash mismatch.
/// * `VectorDecrypt` if a recovered coordinate is not finite.
pub fn decrypt_vector(
    key: &VectorEncryptionKey,
    approximation_factor: f32,
    encrypted: &EncryptedVector,
) -> Result<Vec<f32>> {
    let scaling_factor = check_scaling_factor(key)?;
    check_approximation_factor(approximation_factor)?;

    let expected = compute_auth_hash(key, approximation_factor, &encrypted.iv, &encrypted.ciphertext);
    if expected != encrypted.auth_hash {
        return Err(VeilError::Decrypt("authentication hash mismatch".into()));
    }

    let noise = if encrypted.ciphertext.is_empty() {
        Vec::new()
    } else {
        generate_noise_vector(key, &encrypted.iv, approximation_factor, encrypted.ciphertext.len())?
    };

    #[allow(clippy::cast_possible_truncation)]
    let shuffled: Vec<f32> = encrypted
        .ciphertext
        .iter()
        .zip(noise.iter())
        .map(|(&coordinate, &noise_term)| {
            ((f64::from(coordinate) - noise_term) / f64::from(scaling_factor)) as f32
        })
        .collect();
    if shuffled.iter().any(|v| !v.is_finite()) {
        return Err(VeilError::VectorDecrypt(
            "recovered coordinate is not finite".into(),
        ));
    }

    Ok(unshuffle(&key.key, &shuffled))
}
