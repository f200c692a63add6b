//! uint8 quantization for stored embeddings.
//!
//! One byte per dimension on disk. A vector's value range [min, max]
//! maps linearly onto [0, 255]; restoring computes byte * scale + offset.

use ndarray::Array1;

/// A quantized embedding as persisted in `chunk_embeddings`.
pub struct QuantizedEmbedding {
    pub bytes: Vec<u8>,
    pub scale: f32,
    pub offset: f32,
}

impl QuantizedEmbedding {
    /// Quantize a float32 vector.
    pub fn from_vector(embedding: &Array1<f32>) -> Self {
        let (min_val, max_val) = embedding
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let range = max_val - min_val;
        if range < 1e-9 {
            // Constant vector: zeros, with the offset carrying the value.
            return Self {
                bytes: vec![0u8; embedding.len()],
                scale: 0.0,
                offset: min_val,
            };
        }

        let scale = range / 255.0;
        let bytes = embedding
            .iter()
            .map(|&v| ((v - min_val) / scale).round().clamp(0.0, 255.0) as u8)
            .collect();

        Self {
            bytes,
            scale,
            offset: min_val,
        }
    }

    /// Restore a float32 vector from its stored columns.
    pub fn restore(bytes: &[u8], scale: f32, offset: f32) -> Array1<f32> {
        bytes.iter().map(|&b| b as f32 * scale + offset).collect()
    }

    pub fn to_vector(&self) -> Array1<f32> {
        Self::restore(&self.bytes, self.scale, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_quantization_roundtrip_within_tolerance() {
        let original = array![-0.4, 0.0, 0.25, 0.9, -0.05];
        let restored = QuantizedEmbedding::from_vector(&original).to_vector();
        for (a, b) in original.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 0.01);
        }
    }

    #[test]
    fn test_constant_vector() {
        let q = QuantizedEmbedding::from_vector(&array![0.7, 0.7, 0.7]);
        assert_eq!(q.scale, 0.0);
        assert_eq!(q.offset, 0.7);
        assert!(q.bytes.iter().all(|&b| b == 0));
        let restored = q.to_vector();
        assert!(restored.iter().all(|&v| (v - 0.7).abs() < 1e-6));
    }
}
