//! Trait definitions for perceptual hashing.

use super::decode::decode_file;
use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A computed perceptual hash that can be compared
pub trait PerceptualHash: Clone + Send + Sync {
    /// Hamming distance to another hash: the number of differing bits.
    ///
    /// Lower distance = more similar images.
    fn distance(&self, other: &Self) -> u32;

    /// Get the raw hash bytes
    fn as_bytes(&self) -> &[u8];

    /// Get the hash as a lowercase hexadecimal string
    fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Get the total number of bits in this hash
    fn bit_count(&self) -> u32 {
        (self.as_bytes().len() * 8) as u32
    }
}

/// Capability that turns a decoded image into a fixed-length bit vector.
///
/// The pipeline only talks to this trait, so tests and other front ends can
/// swap in their own implementation.
pub trait HashAlgorithm: Send + Sync {
    /// Compute a hash from an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue, HashError>;

    /// Decode a file and hash it
    fn hash_file(&self, path: &Path) -> Result<ImageHashValue, HashError> {
        let image = decode_file(path)?;
        self.hash_image(&image)
    }

    /// Short algorithm name for reports ("pHash")
    fn name(&self) -> &'static str;
}

/// Concrete hash value type.
///
/// Serialized as its hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ImageHashValue {
    bytes: Vec<u8>,
}

impl ImageHashValue {
    /// Create a new hash value
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse a hex string produced by [`PerceptualHash::to_hex`]
    pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(value).map(Self::new)
    }
}

impl PerceptualHash for ImageHashValue {
    fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Display for ImageHashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<ImageHashValue> for String {
    fn from(value: ImageHashValue) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for ImageHashValue {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let hash = ImageHashValue::new(vec![0xFF, 0x00, 0xAA, 0x55]);
        assert_eq!(hash.distance(&hash), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let hash_a = ImageHashValue::new(vec![0xF0, 0x0F]);
        let hash_b = ImageHashValue::new(vec![0x01, 0xFF]);

        assert_eq!(hash_a.distance(&hash_b), hash_b.distance(&hash_a));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let hash_a = ImageHashValue::new(vec![0b1111_1111]);
        let hash_b = ImageHashValue::new(vec![0b0000_0000]);

        assert_eq!(hash_a.distance(&hash_b), 8);
    }

    #[test]
    fn to_hex_produces_correct_string() {
        let hash = ImageHashValue::new(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(hash.to_hex(), "deadbeef");
        assert_eq!(hash.to_string(), "deadbeef");
        assert_eq!(hash.bit_count(), 32);
    }

    #[test]
    fn serializes_as_hex_string() {
        let hash = ImageHashValue::new(vec![0x01, 0xab]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"01ab\"");

        let back: ImageHashValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
