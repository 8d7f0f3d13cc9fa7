//! # Hasher Module
//!
//! Turns one file path into one [`FileRecord`].
//!
//! ## What gets computed
//! - **SHA-256** over the full byte content, always
//! - **pHash** (DCT-based, 64 bits) when the extension names a raster image
//!   and the bytes decode
//!
//! ## Failure policy
//! - The digest cannot be computed (missing, unreadable, vanished): the file
//!   is skipped with a reason, the batch continues
//! - The image does not decode or hash: the record is kept without a
//!   perceptual hash and the reason is carried alongside it
//!
//! ## Example
//! ```rust,ignore
//! use origistamp::core::hasher::{FileHasher, HashOutcome};
//!
//! let hasher = FileHasher::new();
//! if let HashOutcome::Hashed { record, .. } = hasher.hash_file(&path) {
//!     println!("{}  {}", record.digest, record.display_name);
//! }
//! ```

mod algorithms;
pub mod decode;
mod digest;
mod traits;

pub use algorithms::{PerceptualHasher, DEFAULT_HASH_SIZE};
pub use digest::{is_digest_hex, sha256_file, sha256_hex, DIGEST_HEX_LEN};
pub use traits::{HashAlgorithm, ImageHashValue, PerceptualHash};

use crate::core::scanner::is_raster_image;
use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Digest and metadata for one file of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path as selected; unique within a batch
    pub path: PathBuf,
    /// Base name shown in reports
    pub display_name: String,
    /// Lowercase hex SHA-256 of the content
    pub digest: String,
    /// Size reported by filesystem metadata
    pub size_bytes: u64,
    /// Number of bytes actually read and hashed
    pub content_len: u64,
    /// Present only for raster images that decoded
    pub perceptual_hash: Option<ImageHashValue>,
}

impl FileRecord {
    /// Metadata size and bytes read disagree (file changed while reading)
    pub fn size_mismatch(&self) -> bool {
        self.size_bytes != self.content_len
    }
}

/// Base name of a path, for display
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Tagged outcome of hashing one file
#[derive(Debug)]
pub enum HashOutcome {
    /// The digest was computed. `image_error` says why an image has no
    /// perceptual hash, when that happened.
    Hashed {
        record: FileRecord,
        image_error: Option<HashError>,
    },
    /// The file could not be read; it is left out of the batch
    Skipped { path: PathBuf, reason: HashError },
}

impl HashOutcome {
    /// The record, if the file was hashed
    pub fn record(&self) -> Option<&FileRecord> {
        match self {
            HashOutcome::Hashed { record, .. } => Some(record),
            HashOutcome::Skipped { .. } => None,
        }
    }
}

/// Computes file records with an injectable perceptual hash capability
#[derive(Clone)]
pub struct FileHasher {
    image_hasher: Arc<dyn HashAlgorithm>,
}

impl FileHasher {
    /// Hasher with the default 64-bit pHash
    pub fn new() -> Self {
        Self::with_algorithm(Arc::new(PerceptualHasher::default()))
    }

    /// Hasher with a caller-supplied image hash capability
    pub fn with_algorithm(image_hasher: Arc<dyn HashAlgorithm>) -> Self {
        Self { image_hasher }
    }

    /// The image hash capability in use
    pub fn image_algorithm(&self) -> &dyn HashAlgorithm {
        self.image_hasher.as_ref()
    }

    /// Hash one file.
    ///
    /// The file is read once into memory and closed before returning.
    pub fn hash_file(&self, path: &Path) -> HashOutcome {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(source) => return skipped(path, source),
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => return skipped(path, source),
        };

        let digest = sha256_hex(&bytes);

        let (perceptual_hash, image_error) = if is_raster_image(path) {
            match decode::decode_bytes(path, &bytes)
                .and_then(|image| self.image_hasher.hash_image(&image))
            {
                Ok(hash) => (Some(hash), None),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Perceptual hash failed");
                    (None, Some(e))
                }
            }
        } else {
            (None, None)
        };

        let record = FileRecord {
            path: path.to_path_buf(),
            display_name: display_name(path),
            digest,
            size_bytes: metadata.len(),
            content_len: bytes.len() as u64,
            perceptual_hash,
        };

        if record.size_mismatch() {
            warn!(
                path = %path.display(),
                metadata_len = record.size_bytes,
                read_len = record.content_len,
                "File size changed while hashing"
            );
        }

        debug!(path = %path.display(), digest = %record.digest, "Hashed file");

        HashOutcome::Hashed {
            record,
            image_error,
        }
    }
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn skipped(path: &Path, source: std::io::Error) -> HashOutcome {
    let reason = HashError::Io {
        path: path.to_path_buf(),
        source,
    };
    warn!(path = %path.display(), error = %reason, "Skipping unreadable file");
    HashOutcome::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use tempfile::TempDir;

    struct ConstantHasher;

    impl HashAlgorithm for ConstantHasher {
        fn hash_image(&self, _image: &DynamicImage) -> Result<ImageHashValue, HashError> {
            Ok(ImageHashValue::new(vec![0xAB; 8]))
        }

        fn name(&self) -> &'static str {
            "constant"
        }
    }

    #[test]
    fn text_file_has_digest_and_no_perceptual_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, b"abc").unwrap();

        let outcome = FileHasher::new().hash_file(&path);
        let record = outcome.record().unwrap();

        assert_eq!(
            record.digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(record.size_bytes, 3);
        assert_eq!(record.display_name, "note.txt");
        assert!(record.perceptual_hash.is_none());
        assert!(!record.size_mismatch());
    }

    #[test]
    fn image_gets_perceptual_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stripes.png");
        ImageBuffer::from_fn(32, 32, |x, _| Rgb([if x % 4 < 2 { 255u8 } else { 0 }, 0, 0]))
            .save(&path)
            .unwrap();

        match FileHasher::new().hash_file(&path) {
            HashOutcome::Hashed {
                record,
                image_error,
            } => {
                assert!(image_error.is_none());
                assert_eq!(record.perceptual_hash.unwrap().bit_count(), 64);
            }
            HashOutcome::Skipped { reason, .. } => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn undecodable_image_keeps_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"this is not a jpeg").unwrap();

        match FileHasher::new().hash_file(&path) {
            HashOutcome::Hashed {
                record,
                image_error,
            } => {
                assert_eq!(record.digest, sha256_hex(b"this is not a jpeg"));
                assert!(record.perceptual_hash.is_none());
                assert!(matches!(image_error, Some(HashError::Decode { .. })));
            }
            HashOutcome::Skipped { reason, .. } => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn missing_file_is_skipped_with_reason() {
        let outcome = FileHasher::new().hash_file(Path::new("/nonexistent/gone.txt"));
        assert!(matches!(
            outcome,
            HashOutcome::Skipped {
                reason: HashError::Io { .. },
                ..
            }
        ));
    }

    #[test]
    fn injected_algorithm_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.bmp");
        ImageBuffer::from_fn(4, 4, |_, _| Rgb([1u8, 2, 3]))
            .save(&path)
            .unwrap();

        let hasher = FileHasher::with_algorithm(Arc::new(ConstantHasher));
        let record = hasher.hash_file(&path).record().cloned().unwrap();

        assert_eq!(hasher.image_algorithm().name(), "constant");
        assert_eq!(record.perceptual_hash.unwrap().to_hex(), "abababababababab");
    }

    #[test]
    fn display_name_is_base_name() {
        assert_eq!(display_name(Path::new("/a/b/report.pdf")), "report.pdf");
    }
}
