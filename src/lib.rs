//! # Veilvec
//!
//! Client-side distance-comparison-preserving encryption (DCPE) for dense
//! vector embeddings, plus the companion field encryption needed for
//! zero-trust retrieval over a third-party vector database.
//!
//! ## Security Model
//!
//! Vector ciphertexts preserve the ordering of pairwise distances, so the
//! database can run nearest-neighbor search without seeing plaintext
//! coordinates. That preservation is the point and also the leak: anyone
//! holding many ciphertexts learns their relative geometry. The
//! approximation factor trades search fidelity against how much geometry
//! survives. Everything else is standard symmetric cryptography:
//! HMAC-SHA-256/512 for authentication and derivation, AES-256-GCM for
//! field payloads, OS randomness for every IV and noise draw.
//!
//! ## Usage
//!
//! ```rust
//! use veilvec::Client;
//!
//! # fn main() -> veilvec::Result<()> {
//! let material = veilvec::generate_key()?;
//! let client = Client::new(&material, 1.5, 1)?;
//!
//! let embedding = vec![0.12_f32, -0.48, 0.91];
//! let (ciphertext, metadata) = client.encrypt_vector(&embedding)?;
//! let recovered = client.decrypt_vector(&ciphertext, &metadata)?;
//! assert_eq!(recovered.len(), embedding.len());
//!
//! let category = client.encrypt_deterministic("category:reports")?;
//! assert_eq!(client.decrypt_deterministic(&category)?, "category:reports");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, VeilError>`. Common errors:
//! - [`VeilError::Decrypt`] - authentication failed (tampered data or wrong key)
//! - [`VeilError::InvalidKey`] - malformed key material or zero scaling factor
//! - [`VeilError::InvalidInput`] - malformed header, blob, or approximation factor
//! - [`VeilError::Overflow`] - a ciphertext coordinate left the f32 range
//!
//! Decryption failures are reported identically for wrong-key and
//! tampered-data cases; hash and tag comparisons are constant-time.
//!
//! ## Concurrency
//!
//! A [`Client`] is a plain value with no interior mutability. Concurrent
//! encrypt/decrypt through shared references is safe; key rotation needs
//! external mutual exclusion. Key material is zeroized on drop.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Error/panic docs are centralized above; individual function docs are concise
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod auth;
mod client;
mod deterministic;
mod distance;
mod error;
mod header;
mod kdf;
mod keys;
mod noise;
mod random;
mod shuffle;
mod text;
mod vector;

pub use auth::{compute_auth_hash, AuthHash, AUTH_HASH_LEN};
pub use client::{Client, KeyProvider};
pub use deterministic::{decrypt_deterministic, encrypt_deterministic};
pub use distance::DistanceMetric;
pub use error::{Result, VeilError};
pub use header::{
    decode_vector_metadata, decode_version_prefixed, encode_vector_metadata, EdekType,
    KeyIdHeader, PayloadType, VectorMetadata, HEADER_LEN, VECTOR_METADATA_LEN,
};
pub use kdf::hkdf_sha256;
pub use keys::{EncryptionKey, ScalingFactor, VectorEncryptionKey};
pub use noise::generate_noise_vector;
pub use random::{
    fill_random_bytes, random_bytes, random_vec, sample_standard_normal, uniform_unit, KeyedPrf,
};
pub use shuffle::{shuffle, unshuffle};
pub use text::{decrypt_text, encrypt_text, EncryptedText, TAG_LEN};
pub use vector::{decrypt_vector, encrypt_vector, EncryptedVector, IV_LEN};

/// Generate fresh 32-byte master key material from the OS CSPRNG.
pub fn generate_key() -> Result<[u8; 32]> {
    random::random_bytes()
}
