//! # Comparator Module
//!
//! On-demand comparisons that run outside the batch.
//!
//! ## Kinds
//! | Comparison | Basis | Verdict |
//! |------------|-------|---------|
//! | Files  | SHA-256 equality | identical / different |
//! | Images | pHash Hamming distance | distance <= 5: highly similar, else different |
//!
//! Both re-read their inputs on every call. A failure on either side aborts
//! the comparison; there is no partial result.

mod files;
mod images;

pub use files::{compare_files, FileComparison};
pub use images::{compare_images, ImageComparator, ImageComparison, ImageVerdict, SIMILARITY_THRESHOLD};

use serde::{Deserialize, Serialize};

/// The comparison retained by a session and appended to its next report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonResult {
    Files(FileComparison),
    Images(ImageComparison),
}

impl ComparisonResult {
    /// One-line verdict for status output
    pub fn verdict(&self) -> String {
        match self {
            ComparisonResult::Files(c) => c.verdict().to_string(),
            ComparisonResult::Images(c) => {
                format!("pHash difference: {} - {}", c.distance, c.verdict)
            }
        }
    }
}

impl From<FileComparison> for ComparisonResult {
    fn from(value: FileComparison) -> Self {
        ComparisonResult::Files(value)
    }
}

impl From<ImageComparison> for ComparisonResult {
    fn from(value: ImageComparison) -> Self {
        ComparisonResult::Images(value)
    }
}
