//! Deterministic keyed shuffle of coordinate positions.
//!
//! A Fisher-Yates pass driven by [`KeyedPrf`](crate::random::KeyedPrf)
//! hides which ciphertext coordinate corresponds to which plaintext
//! dimension. The permutation depends only on the key and the length,
//! never on the values being shuffled.

// PRF draws are < 1.0, so the index cast is in range
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::keys::EncryptionKey;
use crate::random::KeyedPrf;

/// The Fisher-Yates index permutation for length `n` under `key`.
fn permutation(key: &EncryptionKey, n: usize) -> Vec<usize> {
    let mut prf = KeyedPrf::new(key);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        #[allow(clippy::cast_precision_loss)]
        let j = (prf.next_unit() * (i as f64 + 1.0)) as usize;
        indices.swap(i, j);
    }
    indices
}

/// Reorder `values` by the keyed permutation.
#[must_use]
pub fn shuffle<T: Copy>(key: &EncryptionKey, values: &[T]) -> Vec<T> {
    let indices = permutation(key, values.len());
    indices.iter().map(|&i| values[i]).collect()
}

/// Invert [`shuffle`]: `unshuffle(k, shuffle(k, x)) == x`.
#[must_use]
pub fn unshuffle<T: Copy + Default>(key: &EncryptionKey, values: &[T]) -> Vec<T> {
    let indices = permutation(key, values.len());
    let mut out = vec![T::default(); values.len()];
    for (position, &index) in indices.iter().enumerate() {
        out[index] = values[position];
    }
    out
}
