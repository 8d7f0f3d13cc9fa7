//! SHA-256 digests rendered as lowercase hex.

use crate::error::HashError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Length of a hex-encoded SHA-256 digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute the SHA-256 of `data` as a lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Read a whole file and return its SHA-256 hex digest.
///
/// The handle is closed before this returns.
pub fn sha256_file(path: &Path) -> Result<String, HashError> {
    let bytes = fs::read(path).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(sha256_hex(&bytes))
}

/// Whether `value` looks like a digest produced by this module
pub fn is_digest_hex(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
