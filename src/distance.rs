//! Distance metrics for similarity search over plaintext or ciphertext
//! vectors.
//!
//! Distance-comparison-preserving encryption keeps the relative ordering
//! of these metrics across vectors, so the same metric the database uses
//! for nearest-neighbor queries can be evaluated locally to validate
//! results or re-rank decrypted candidates.

use crate::error::{Result, VeilError};

/// Distance metric for vector similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// L2 (Euclidean) distance.
    L2,
    /// Cosine distance: `1 - cosine similarity`.
    Cosine,
    /// Negative inner product (smaller is more similar).
    InnerProduct,
}

impl DistanceMetric {
    /// Compute the distance between two vectors of equal dimension.
    ///
    /// # Errors
    /// Returns `VeilError::InvalidInput` on dimension mismatch.
    pub fn distance(self, a: &[f32], b: &[f32]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(VeilError::InvalidInput(format!(
                "vector dimensions differ: {} vs {}",
                a.len(),
                b.len()
            )));
        }
        Ok(match self {
            Self::L2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| {
                    let diff = f64::from(x - y);
                    diff * diff
                })
                .sum::<f64>()
                .sqrt(),
            Self::Cosine => {
                let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| f64::from(x * y)).sum();
                let norm_a: f64 = a.iter().map(|x| f64::from(x * x)).sum::<f64>().sqrt();
                let norm_b: f64 = b.iter().map(|x| f64::from(x * x)).sum::<f64>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (norm_a * norm_b)
                }
            }
            Self::InnerProduct => {
                -a.iter().zip(b.iter()).map(|(x, y)| f64::from(x * y)).sum::<f64>()
            }
        })
    }
}
