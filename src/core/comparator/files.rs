//! Byte-exact comparison of two files by SHA-256.

use crate::core::hasher::{display_name, sha256_hex};
use crate::error::CompareError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of comparing two files byte for byte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComparison {
    pub path_a: PathBuf,
    pub path_b: PathBuf,
    pub digest_a: String,
    pub digest_b: String,
    pub identical: bool,
}

impl FileComparison {
    /// Human-readable verdict
    pub fn verdict(&self) -> &'static str {
        if self.identical {
            "✅ Files are IDENTICAL."
        } else {
            "❌ Files are DIFFERENT."
        }
    }

    /// Base name of the first file
    pub fn name_a(&self) -> String {
        display_name(&self.path_a)
    }

    /// Base name of the second file
    pub fn name_b(&self) -> String {
        display_name(&self.path_b)
    }
}

fn digest_of(path: &Path) -> Result<String, CompareError> {
    let bytes = fs::read(path).map_err(|source| CompareError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(sha256_hex(&bytes))
}

/// Hash both files from disk and compare the digests.
///
/// Nothing is reused from an earlier batch: both files are read again.
pub fn compare_files(path_a: &Path, path_b: &Path) -> Result<FileComparison, CompareError> {
    let digest_a = digest_of(path_a)?;
    let digest_b = digest_of(path_b)?;
    let identical = digest_a == digest_b;

    info!(
        a = %path_a.display(),
        b = %path_b.display(),
        identical,
        "Compared files"
    );

    Ok(FileComparison {
        path_a: path_a.to_path_buf(),
        path_b: path_b.to_path_buf(),
        digest_a,
        digest_b,
        identical,
    })
}
