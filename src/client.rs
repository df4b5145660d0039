//! High-level client tying keys, vector encryption, and field encryption
//! together.
//!
//! A [`Client`] holds one key triple (vector, text, deterministic) built
//! from 32 bytes of master material, plus the approximation factor and the
//! key id written into ciphertext headers. It is not internally
//! synchronized: share immutable references freely for encrypt/decrypt,
//! but wrap it in a lock if any thread calls [`Client::rotate_key`].

use std::num::NonZeroU32;

use ring::{digest, pbkdf2};

use crate::deterministic;
use crate::error::{Result, VeilError};
use crate::header::{
    decode_vector_metadata, encode_vector_metadata, EdekType, KeyIdHeader, PayloadType,
};
use crate::keys::{EncryptionKey, ScalingFactor, VectorEncryptionKey};
use crate::text::{self, EncryptedText};
use crate::vector::{self, EncryptedVector};

/// PBKDF2 iteration count for the password construction path.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Minimum master material length in bytes.
const MIN_MATERIAL_LEN: usize = 32;

/// Source of key material looked up by key id.
///
/// Implementations typically call out to a KMS, vault, or tenant security
/// proxy. The trait is synchronous: fetch before construction, per the
/// factory pattern, rather than suspending mid-operation.
pub trait KeyProvider {
    /// Fetch master key material for `key_id`.
    ///
    /// # Errors
    /// Returns a provider-specific error when the key cannot be produced.
    fn get_key(&self, key_id: u32) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Client for encrypting vectors and companion fields before they leave
/// the trust boundary.
#[derive(Debug)]
pub struct Client {
    vector_key: VectorEncryptionKey,
    text_key: EncryptionKey,
    deterministic_key: EncryptionKey,
    approximation_factor: f32,
    key_id: u32,
}

fn build_key_triple(
    material: &[u8],
    approximation_factor: f32,
) -> Result<(VectorEncryptionKey, EncryptionKey, EncryptionKey)> {
    if material.len() < MIN_MATERIAL_LEN {
        return Err(VeilError::InvalidInput(format!(
            "key material must be at least {MIN_MATERIAL_LEN} bytes, got {}",
            material.len()
        )));
    }
    if !approximation_factor.is_finite() || approximation_factor <= 0.0 {
        return Err(VeilError::InvalidInput(
            "approximation factor must be a positive finite number".into(),
        ));
    }
    let core = material[..MIN_MATERIAL_LEN].to_vec();
    let vector_key = VectorEncryptionKey::new(
        ScalingFactor::new(approximation_factor),
        EncryptionKey::new(core.clone()),
    );
    let text_key = EncryptionKey::new(core.clone());
    let deterministic_key = EncryptionKey::new(core);
    Ok((vector_key, text_key, deterministic_key))
}

impl Client {
    /// Build a client from pre-fetched master key material.
    ///
    /// All three keys in the triple are derived from the first 32 bytes of
    /// `material`; the scaling factor is the approximation factor itself.
    ///
    /// # Errors
    /// Returns `VeilError::InvalidInput` if the material is shorter than 32
    /// bytes or the approximation factor is not a positive finite number.
    pub fn new(material: &[u8], approximation_factor: f32, key_id: u32) -> Result<Self> {
        let (vector_key, text_key, deterministic_key) =
            build_key_triple(material, approximation_factor)?;
        Ok(Self {
            vector_key,
            text_key,
            deterministic_key,
            approximation_factor,
            key_id,
        })
    }

    /// Build a client by fetching material from a [`KeyProvider`] first.
    ///
    /// # Errors
    /// Provider failures are reported as `VeilError::InvalidInput` wrapping
    /// the provider's error; material validation is as in [`Client::new`].
    pub fn from_provider(
        provider: &dyn KeyProvider,
        key_id: u32,
        approximation_factor: f32,
    ) -> Result<Self> {
        let material = provider.get_key(key_id).map_err(|e| {
            VeilError::InvalidInput(format!("key provider lookup for key id {key_id} failed: {e}"))
        })?;
        Self::new(&material, approximation_factor, key_id)
    }

    /// Build a client from a password and service name.
    ///
    /// Master material is PBKDF2-HMAC-SHA-256 over the password with
    /// 100,000 iterations, salted with the SHA-256 of the service name.
    ///
    /// # Errors
    /// Returns `VeilError::InvalidInput` if the approximation factor is not
    /// a positive finite number.
    pub fn from_password(
        password: &str,
        service: &str,
        approximation_factor: f32,
        key_id: u32,
    ) -> Result<Self> {
        let salt = digest::digest(&digest::SHA256, service.as_bytes());
        let mut material = [0u8; MIN_MATERIAL_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            NonZeroU32::new(PBKDF2_ITERATIONS).unwrap(),
            salt.as_ref(),
            password.as_bytes(),
            &mut material,
        );
        Self::new(&material, approximation_factor, key_id)
    }

    /// Replace the whole key triple with new material.
    ///
    /// The swap is atomic from the caller's view: either all three keys and
    /// the key id change, or (on validation failure) none do. The previous
    /// triple is dropped and zeroized, not retained - decrypting data
    /// written under an old key requires a client built with that key.
    pub fn rotate_key(&mut self, material: &[u8], new_key_id: u32) -> Result<()> {
        let (vector_key, text_key, deterministic_key) =
            build_key_triple(material, self.approximation_factor)?;
        self.vector_key = vector_key;
        self.text_key = text_key;
        self.deterministic_key = deterministic_key;
        self.key_id = new_key_id;
        Ok(())
    }

    /// Rotate to material fetched from a [`KeyProvider`].
    pub fn rotate_key_from_provider(
        &mut self,
        provider: &dyn KeyProvider,
        new_key_id: u32,
    ) -> Result<()> {
        let material = provider.get_key(new_key_id).map_err(|e| {
            VeilError::InvalidInput(format!(
                "key provider lookup for key id {new_key_id} failed: {e}"
            ))
        })?;
        self.rotate_key(&material, new_key_id)
    }

    /// Key id written into metadata produced by this client.
    #[must_use]
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// The approximation factor this client encrypts with.
    #[must_use]
    pub fn approximation_factor(&self) -> f32 {
        self.approximation_factor
    }

    /// Encrypt a vector, returning the ciphertext and its 50-byte metadata
    /// blob (header, IV, authentication hash) for storage alongside it.
    pub fn encrypt_vector(&self, plaintext: &[f32]) -> Result<(Vec<f32>, Vec<u8>)> {
        let encrypted = vector::encrypt_vector(&self.vector_key, self.approximation_factor, plaintext)?;
        let header = KeyIdHeader::new(self.key_id, EdekType::Standalone, PayloadType::VectorMetadata);
        let metadata = encode_vector_metadata(&header, &encrypted.iv, &encrypted.auth_hash);
        Ok((encrypted.ciphertext, metadata))
    }

    /// Verify and decrypt a vector given its ciphertext and metadata blob.
    ///
    /// # Errors
    /// * `InvalidInput` if the metadata is malformed or not vector metadata.
    /// * `InvalidKey` if the metadata names a different key id than this
    ///   client holds (the embedded id is in the error message; retry with
    ///   a client built from that key).
    /// * `Decrypt` on authentication failure.
    pub fn decrypt_vector(&self, ciphertext: &[f32], metadata: &[u8]) -> Result<Vec<f32>> {
        let parsed = decode_vector_metadata(metadata)?;
        if parsed.header.payload_type != PayloadType::VectorMetadata {
            return Err(VeilError::InvalidInput(
                "metadata blob is not vector metadata".into(),
            ));
        }
        if parsed.header.key_id != self.key_id {
            return Err(VeilError::InvalidKey(format!(
                "metadata was written under key id {} but this client holds key id {}",
                parsed.header.key_id, self.key_id
            )));
        }
        let encrypted = EncryptedVector {
            ciphertext: ciphertext.to_vec(),
            iv: parsed.iv,
            auth_hash: parsed.auth_hash,
        };
        vector::decrypt_vector(&self.vector_key, self.approximation_factor, &encrypted)
    }

    /// Encrypt an opaque payload field with standard AES-256-GCM.
    pub fn encrypt_text(&self, plaintext: &str) -> Result<EncryptedText> {
        text::encrypt_text(&self.text_key, plaintext)
    }

    /// Decrypt a standard payload field.
    pub fn decrypt_text(&self, encrypted: &EncryptedText) -> Result<String> {
        text::decrypt_text(&self.text_key, encrypted)
    }

    /// Deterministically encrypt a filterable metadata field.
    pub fn encrypt_deterministic(&self, plaintext: &str) -> Result<Vec<u8>> {
        deterministic::encrypt_deterministic(&self.deterministic_key, plaintext)
    }

    /// Decrypt a deterministically encrypted field.
    pub fn decrypt_deterministic(&self, blob: &[u8]) -> Result<String> {
        deterministic::decrypt_deterministic(&self.deterministic_key, blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMetric;
    use crate::header::VECTOR_METADATA_LEN;

    fn test_client() -> Client {
        Client::new(&[0x01u8; 32], 1.0, 42).unwrap()
    }

    struct MapProvider;

    impl KeyProvider for MapProvider {
        fn get_key(
            &self,
            key_id: u32,
        ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            match key_id {
                42 => Ok(vec![0x01; 32]),
                7 => Ok(vec![0x09; 32]),
                _ => Err(format!("no key with id {key_id}").into()),
            }
        }
    }

    #[test]
    fn test_construction_validation() {
        assert!(matches!(
            Client::new(&[0u8; 31], 1.0, 1).unwrap_err(),
            VeilError::InvalidInput(_)
        ));
        assert!(matches!(
            Client::new(&[0u8; 32], 0.0, 1).unwrap_err(),
            VeilError::InvalidInput(_)
        ));
        assert!(matches!(
            Client::new(&[0u8; 32], f32::NAN, 1).unwrap_err(),
            VeilError::InvalidInput(_)
        ));
        assert!(Client::new(&[0u8; 48], 2.0, 1).is_ok());
    }

    #[test]
    fn test_vector_roundtrip_through_metadata() {
        let client = test_client();
        let plaintext = [1.0f32, 2.0, 3.0];
        let (ciphertext, metadata) = client.encrypt_vector(&plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        assert_eq!(metadata.len(), VECTOR_METADATA_LEN);

        let decrypted = client.decrypt_vector(&ciphertext, &metadata).unwrap();
        for (original, recovered) in plaintext.iter().zip(decrypted.iter()) {
            assert!((original - recovered).abs() <= 0.5);
        }
    }

    #[test]
    fn test_metadata_embeds_key_id() {
        let client = test_client();
        let (_, metadata) = client.encrypt_vector(&[1.0f32]).unwrap();
        let parsed = decode_vector_metadata(&metadata).unwrap();
        assert_eq!(parsed.header.key_id, 42);
        assert_eq!(parsed.header.payload_type, PayloadType::VectorMetadata);
        assert_eq!(parsed.header.edek_type, EdekType::Standalone);
    }

    #[test]
    fn test_key_id_mismatch_surfaced() {
        let writer = test_client();
        let reader = Client::new(&[0x01u8; 32], 1.0, 43).unwrap();
        let (ciphertext, metadata) = writer.encrypt_vector(&[1.0f32, 2.0]).unwrap();
        let err = reader.decrypt_vector(&ciphertext, &metadata).unwrap_err();
        match err {
            VeilError::InvalidKey(message) => {
                assert!(message.contains("42"));
                assert!(message.contains("43"));
            }
            other => panic!("expected InvalidKey, got {other:?}"),
        }
    }

    #[test]
    fn test_tampered_metadata_rejected() {
        let client = test_client();
        let (ciphertext, mut metadata) = client.encrypt_vector(&[1.0f32, 2.0]).unwrap();
        let last = metadata.len() - 1;
        metadata[last] ^= 0x01;
        assert!(matches!(
            client.decrypt_vector(&ciphertext, &metadata).unwrap_err(),
            VeilError::Decrypt(_)
        ));
    }

    #[test]
    fn test_truncated_metadata_rejected() {
        let client = test_client();
        let (ciphertext, metadata) = client.encrypt_vector(&[1.0f32]).unwrap();
        assert!(matches!(
            client.decrypt_vector(&ciphertext, &metadata[..10]).unwrap_err(),
            VeilError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_nearest_neighbor_ordering_preserved() {
        // Well-separated cluster structure survives encryption: the
        // nearest neighbor of the query stays nearest among ciphertexts.
        let client = Client::new(&[0x01u8; 32], 0.5, 1).unwrap();
        let query = [10.0f32, 0.0, 0.0, 0.0];
        let near = [11.0f32, 0.5, 0.0, 0.0];
        let far = [0.0f32, 20.0, 5.0, 0.0];

        let (query_ct, _) = client.encrypt_vector(&query).unwrap();
        let (near_ct, _) = client.encrypt_vector(&near).unwrap();
        let (far_ct, _) = client.encrypt_vector(&far).unwrap();

        let plain_near = DistanceMetric::L2.distance(&query, &near).unwrap();
        let plain_far = DistanceMetric::L2.distance(&query, &far).unwrap();
        assert!(plain_near < plain_far);

        let cipher_near = DistanceMetric::L2.distance(&query_ct, &near_ct).unwrap();
        let cipher_far = DistanceMetric::L2.distance(&query_ct, &far_ct).unwrap();
        assert!(cipher_near < cipher_far);
    }

    #[test]
    fn test_rotation_replaces_all_keys() {
        let mut client = test_client();
        let (ciphertext, metadata) = client.encrypt_vector(&[1.0f32, 2.0]).unwrap();
        let det_before = client.encrypt_deterministic("tag").unwrap();
        let text_before = client.encrypt_text("payload").unwrap();

        client.rotate_key(&[0x09u8; 32], 7).unwrap();
        assert_eq!(client.key_id(), 7);

        // Old vector metadata now names a stale key id.
        assert!(matches!(
            client.decrypt_vector(&ciphertext, &metadata).unwrap_err(),
            VeilError::InvalidKey(_)
        ));
        // Deterministic output changes with the key.
        assert_ne!(client.encrypt_deterministic("tag").unwrap(), det_before);
        // Old text ciphertext no longer authenticates.
        assert!(client.decrypt_text(&text_before).is_err());
    }

    #[test]
    fn test_rotation_validation_leaves_client_unchanged() {
        let mut client = test_client();
        assert!(client.rotate_key(&[0u8; 16], 9).is_err());
        assert_eq!(client.key_id(), 42);
        let (ciphertext, metadata) = client.encrypt_vector(&[1.0f32]).unwrap();
        assert!(client.decrypt_vector(&ciphertext, &metadata).is_ok());
    }

    #[test]
    fn test_provider_construction_and_rotation() {
        let provider = MapProvider;
        let mut client = Client::from_provider(&provider, 42, 1.0).unwrap();
        assert_eq!(client.key_id(), 42);

        let direct = test_client();
        let blob = client.encrypt_deterministic("shared field").unwrap();
        assert_eq!(blob, direct.encrypt_deterministic("shared field").unwrap());

        client.rotate_key_from_provider(&provider, 7).unwrap();
        assert_eq!(client.key_id(), 7);

        let err = Client::from_provider(&provider, 99, 1.0).unwrap_err();
        match err {
            VeilError::InvalidInput(message) => assert!(message.contains("99")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_password_construction_deterministic() {
        let a = Client::from_password("hunter2", "search.example.com", 1.0, 1).unwrap();
        let b = Client::from_password("hunter2", "search.example.com", 1.0, 1).unwrap();
        assert_eq!(
            a.encrypt_deterministic("field").unwrap(),
            b.encrypt_deterministic("field").unwrap()
        );

        let c = Client::from_password("hunter2", "other.example.com", 1.0, 1).unwrap();
        assert_ne!(
            a.encrypt_deterministic("field").unwrap(),
            c.encrypt_deterministic("field").unwrap()
        );
    }

    #[test]
    fn test_text_wrappers_roundtrip() {
        let client = test_client();
        let encrypted = client.encrypt_text("opaque payload").unwrap();
        assert_eq!(client.decrypt_text(&encrypted).unwrap(), "opaque payload");

        let blob = client.encrypt_deterministic("filterable value").unwrap();
        assert_eq!(client.decrypt_deterministic(&blob).unwrap(), "filterable value");
    }
}
