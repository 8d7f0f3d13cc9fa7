//! Perceptual comparison of two images.

use crate::core::hasher::{display_name, HashAlgorithm, ImageHashValue, PerceptualHash, PerceptualHasher};
use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Largest Hamming distance still reported as highly similar
pub const SIMILARITY_THRESHOLD: u32 = 5;

/// Verdict of an image comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageVerdict {
    HighlySimilar,
    Different,
}

impl ImageVerdict {
    /// Classify a Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        if distance <= SIMILARITY_THRESHOLD {
            ImageVerdict::HighlySimilar
        } else {
            ImageVerdict::Different
        }
    }
}

impl std::fmt::Display for ImageVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageVerdict::HighlySimilar => write!(f, "Highly Similar"),
            ImageVerdict::Different => write!(f, "Different"),
        }
    }
}

/// Outcome of comparing two images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageComparison {
    pub path_a: PathBuf,
    pub path_b: PathBuf,
    pub hash_a: ImageHashValue,
    pub hash_b: ImageHashValue,
    /// Hamming distance between the two hashes
    pub distance: u32,
    pub verdict: ImageVerdict,
}

impl ImageComparison {
    /// Base name of the first image
    pub fn name_a(&self) -> String {
        display_name(&self.path_a)
    }

    /// Base name of the second image
    pub fn name_b(&self) -> String {
        display_name(&self.path_b)
    }
}

/// Compares images with an injectable hash capability
pub struct ImageComparator {
    hasher: Arc<dyn HashAlgorithm>,
}

impl ImageComparator {
    /// Comparator using the default 64-bit pHash
    pub fn new() -> Self {
        Self::with_algorithm(Arc::new(PerceptualHasher::default()))
    }

    /// Comparator using a caller-supplied capability
    pub fn with_algorithm(hasher: Arc<dyn HashAlgorithm>) -> Self {
        Self { hasher }
    }

    /// Decode and hash both images, then measure their distance.
    ///
    /// Either image failing to decode fails the whole comparison.
    pub fn compare(&self, path_a: &Path, path_b: &Path) -> Result<ImageComparison, CompareError> {
        let hash_a = self.hasher.hash_file(path_a)?;
        let hash_b = self.hasher.hash_file(path_b)?;
        let distance = hash_a.distance(&hash_b);
        let verdict = ImageVerdict::from_distance(distance);

        info!(
            a = %path_a.display(),
            b = %path_b.display(),
            distance,
            %verdict,
            "Compared images"
        );

        Ok(ImageComparison {
            path_a: path_a.to_path_buf(),
            path_b: path_b.to_path_buf(),
            hash_a,
            hash_b,
            distance,
            verdict,
        })
    }
}

impl Default for ImageComparator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two images with the default pHash
pub fn compare_images(path_a: &Path, path_b: &Path) -> Result<ImageComparison, CompareError> {
    ImageComparator::new().compare(path_a, path_b)
}
