//! Perceptual Hash (pHash) implementation.
//!
//! The image is shrunk, converted to grayscale and run through a Discrete
//! Cosine Transform; the low-frequency block is then thresholded against its
//! mean. The result survives:
//! - Scaling
//! - Re-encoding and compression artifacts
//! - Small brightness/contrast changes
//!
//! The transform itself comes from the image_hasher crate.

use super::super::traits::{HashAlgorithm, ImageHashValue};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};

/// Default edge length of the hash grid: 8x8 = 64 bits
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// DCT-based perceptual hasher
pub struct PerceptualHasher {
    hash_size: u32,
    hasher: image_hasher::Hasher,
}

impl PerceptualHasher {
    /// Create a hasher producing `hash_size * hash_size` bits
    pub fn new(hash_size: u32) -> Self {
        let hasher = ImageHasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hash_size, hasher }
    }

    /// Number of bits in every hash this hasher produces
    pub fn bits(&self) -> u32 {
        self.hash_size * self.hash_size
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SIZE)
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError> {
        let hash = self.hasher.hash_image(image);
        let bytes = hash.as_bytes().to_vec();

        if bytes.is_empty() {
            return Err(HashError::ComputationFailed(
                "perceptual hash produced no bits".to_string(),
            ));
        }

        Ok(ImageHashValue::new(bytes))
    }

    fn name(&self) -> &'static str {
        "pHash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::super::traits::PerceptualHash;
    use image::{ImageBuffer, Rgb};

    fn create_gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let v = ((x * 255) / width.max(1)) as u8;
            Rgb([v, (y % 256) as u8, 255 - v])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = PerceptualHasher::default();
        let image = create_gradient_image(100, 100);

        let hash1 = hasher.hash_image(&image).unwrap();
        let hash2 = hasher.hash_image(&image.clone()).unwrap();

        assert_eq!(hash1.distance(&hash2), 0);
    }

    #[test]
    fn default_hash_is_64_bits() {
        let hasher = PerceptualHasher::default();
        let hash = hasher.hash_image(&create_gradient_image(64, 48)).unwrap();

        assert_eq!(hasher.bits(), 64);
        assert_eq!(hash.bit_count(), 64);
        assert_eq!(hash.to_hex().len(), 16);
    }

    #[test]
    fn rescaled_image_stays_close() {
        let hasher = PerceptualHasher::default();
        let original = create_gradient_image(200, 200);
        let smaller = original.resize_exact(100, 100, image::imageops::FilterType::Triangle);

        let distance = hasher
            .hash_image(&original)
            .unwrap()
            .distance(&hasher.hash_image(&smaller).unwrap());

        assert!(distance <= 10, "distance was {distance}");
    }

    #[test]
    fn name_is_phash() {
        assert_eq!(PerceptualHasher::default().name(), "pHash");
    }
}
