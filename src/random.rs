//! Cross-platform secure random number generation and sampling adapters.
//!
//! Uses `ring::rand::SystemRandom` on native targets and `getrandom` on WASM.
//! Seeded generators are never used: IVs, noise, and key material all draw
//! from the operating system CSPRNG.

use ring::hmac;

use crate::error::{Result, VeilError};
use crate::keys::EncryptionKey;

/// Fill a buffer with cryptographically secure random bytes.
///
/// # Errors
/// Returns `VeilError::InvalidConfiguration` if the system RNG fails.
#[cfg(not(target_arch = "wasm32"))]
pub fn fill_random_bytes(buf: &mut [u8]) -> Result<()> {
    use ring::rand::{SecureRandom, SystemRandom};
    let rng = SystemRandom::new();
    rng.fill(buf)
        .map_err(|_| VeilError::InvalidConfiguration("system random generator failed".into()))
}

/// Fill a buffer with cryptographically secure random bytes (WASM version).
///
/// # Errors
/// Returns `VeilError::InvalidConfiguration` if the system RNG fails.
#[cfg(target_arch = "wasm32")]
pub fn fill_random_bytes(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf)
        .map_err(|_| VeilError::InvalidConfiguration("system random generator failed".into()))
}

/// Generate a fixed-size random byte array.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill_random_bytes(&mut buf)?;
    Ok(buf)
}

/// Generate a random Vec of specified size.
pub fn random_vec(size: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; size];
    fill_random_bytes(&mut buf)?;
    Ok(buf)
}

/// Sample a uniform float in `[0, 1)`.
///
/// Reads 4 random bytes as a little-endian u32 and divides by 2^32.
pub fn uniform_unit() -> Result<f64> {
    let bytes: [u8; 4] = random_bytes()?;
    Ok(f64::from(u32::from_le_bytes(bytes)) / 4_294_967_296.0)
}

/// Sample from the standard normal distribution via Box-Muller.
///
/// `ln(0)` is undefined, so a zero first draw is resampled (probability
/// 2^-32 per draw).
pub fn sample_standard_normal() -> Result<f64> {
    let u1 = loop {
        let draw = uniform_unit()?;
        if draw > 0.0 {
            break draw;
        }
    };
    let u2 = uniform_unit()?;
    Ok((-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos())
}

/// Keyed counter PRF producing uniform floats in `[0, 1)`.
///
/// Each draw is the first 4 bytes of `HMAC-SHA-256(key, counter_le)` read
/// as a little-endian u32 and divided by 2^32. The counter is 32 bits wide
/// so the stream stays unbiased for any realistic permutation length. A
/// fresh instance is created per shuffle pass; the output depends only on
/// the key and the draw index.
pub struct KeyedPrf {
    key: hmac::Key,
    counter: u32,
}

impl KeyedPrf {
    /// Create a PRF keyed by the given encryption key, counter at zero.
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes()),
            counter: 0,
        }
    }

    /// Produce the next uniform draw in `[0, 1)` and advance the counter.
    pub fn next_unit(&mut self) -> f64 {
        let tag = hmac::sign(&self.key, &self.counter.to_le_bytes());
        self.counter = self.counter.wrapping_add(1);
        let t = tag.as_ref();
        f64::from(u32::from_le_bytes([t[0], t[1], t[2], t[3]])) / 4_294_967_296.0
    }
}
