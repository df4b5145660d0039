//! Error types for vector and field encryption operations.

use thiserror::Error;

/// Result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, VeilError>;

/// Errors that can occur during encryption, decryption, and key handling.
///
/// Every public operation either succeeds or fails with exactly one of
/// these kinds. Messages name the failing condition, never the secret
/// input.
#[derive(Error, Debug)]
pub enum VeilError {
    /// The runtime environment is unusable (e.g. the system CSPRNG failed).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Key material is malformed: wrong length, or a zero scaling factor.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Caller-supplied input is malformed: bad approximation factor,
    /// truncated ciphertext, malformed header.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Text encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Text decryption failed - tag mismatch, tampered data, or wrong key.
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// Vector encryption failed.
    #[error("vector encryption failed: {0}")]
    VectorEncrypt(String),

    /// Vector decryption failed.
    #[error("vector decryption failed: {0}")]
    VectorDecrypt(String),

    /// A ciphertext coordinate left the representable range of its float type.
    #[error("overflow: {0}")]
    Overflow(String),

    /// A value could not be converted to or from its wire representation.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
