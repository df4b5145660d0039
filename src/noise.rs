//! Noise sampling for distance-comparison-preserving encryption.
//!
//! Each encrypted vector is perturbed by a point drawn uniformly from the
//! open n-ball of radius `s * a / 4`, where `s` is the scaling factor and
//! `a` the approximation factor. Direction comes from normalized standard
//! normals, the radius from a `u^(1/d)` draw, which together give the
//! uniform distribution over the ball interior.

use crate::error::{Result, VeilError};
use crate::keys::VectorEncryptionKey;
use crate::random::{sample_standard_normal, uniform_unit};
use crate::vector::IV_LEN;

/// Sample a noise vector of the given dimensionality.
///
/// The IV is validated but not yet consumed: it is reserved for binding the
/// noise stream to the ciphertext IV in a future PRF-seeded variant.
///
/// # Errors
/// * `InvalidKey` if the scaling factor is zero or negative.
/// * `InvalidInput` if the approximation factor is not a positive finite
///   number, the dimensionality is zero, or the IV is not 12 bytes.
pub fn generate_noise_vector(
    key: &VectorEncryptionKey,
    iv: &[u8],
    approximation_factor: f32,
    dimensionality: usize,
) -> Result<Vec<f64>> {
    let scaling_factor = key.scaling_factor.value();
    if scaling_factor <= 0.0 {
        return Err(VeilError::InvalidKey(
            "scaling factor must be positive to generate noise".into(),
        ));
    }
    if !approximation_factor.is_finite() || approximation_factor <= 0.0 {
        return Err(VeilError::InvalidInput(
            "approximation factor must be a positive finite number".into(),
        ));
    }
    if dimensionality == 0 {
        return Err(VeilError::InvalidInput(
            "noise dimensionality must be at least 1".into(),
        ));
    }
    if iv.len() != IV_LEN {
        return Err(VeilError::InvalidInput(format!(
            "noise IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }

    let mut direction = Vec::with_capacity(dimensionality);
    for _ in 0..dimensionality {
        direction.push(sample_standard_normal()?);
    }
    let norm = direction.iter().map(|z| z * z).sum::<f64>().sqrt();

    #[allow(clippy::cast_precision_loss)]
    let exponent = 1.0 / dimensionality as f64;
    let radius = f64::from(scaling_factor) / 4.0
        * f64::from(approximation_factor)
        * uniform_unit()?.powf(exponent);

    Ok(direction.iter().map(|z| z * radius / norm).collect())
}
