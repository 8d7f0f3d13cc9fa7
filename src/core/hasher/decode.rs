//! Image decoding with the image crate.
//!
//! The format is sniffed from the content, not the extension, so a
//! mislabelled file decodes if its bytes are a supported image.

use crate::error::HashError;
use image::DynamicImage;
use std::fs;
use std::path::Path;

/// Decode an image that is already in memory
pub fn decode_bytes(path: &Path, bytes: &[u8]) -> Result<DynamicImage, HashError> {
    let image = image::load_from_memory(bytes).map_err(|e| HashError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(HashError::Decode {
            path: path.to_path_buf(),
            reason: "image has no pixels".to_string(),
        });
    }

    Ok(image)
}

/// Read and decode an image file
pub fn decode_file(path: &Path) -> Result<DynamicImage, HashError> {
    let bytes = fs::read(path).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    #[test]
    fn decodes_png_written_by_image_crate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile.png");
        ImageBuffer::from_fn(16, 16, |x, _| Rgb([x as u8 * 10, 0, 0]))
            .save(&path)
            .unwrap();

        let image = decode_file(&path).unwrap();
        assert_eq!(image.width(), 16);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let result = decode_bytes(Path::new("fake.png"), b"not an image");
        assert!(matches!(result, Err(HashError::Decode { .. })));
    }

    #[test]
    fn missing_file_fails_with_io_error() {
        let result = decode_file(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(HashError::Io { .. })));
    }
}
