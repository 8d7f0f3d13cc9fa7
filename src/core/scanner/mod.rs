//! # Scanner Module
//!
//! Expands a selection of files and folders into the flat, ordered list of
//! paths that make up a batch.
//!
//! ## Rules
//! - Folders are walked recursively, in file-name order
//! - Only allowlisted extensions survive (case-insensitive)
//! - Unsupported files are dropped silently
//! - Missing roots and unreadable directories are recorded, never fatal
//!
//! ## Example
//! ```rust,ignore
//! use origistamp::core::scanner::{FileScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(&["/Users/me/Documents".into()]);
//! ```

mod filter;
mod walker;

pub use filter::{is_raster_image, ExtensionFilter, RASTER_IMAGE_EXTENSIONS, SUPPORTED_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::PathBuf;

/// Result of an enumeration
#[derive(Debug)]
pub struct ScanResult {
    /// Candidate files, in enumeration order
    pub files: Vec<PathBuf>,
    /// Problems encountered along the way (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for file enumerators
///
/// Implement this trait to feed a batch from somewhere other than the
/// local filesystem walker (e.g., a fixed list in tests).
pub trait FileScanner: Send + Sync {
    /// Enumerate candidate files below the given roots
    fn scan(&self, roots: &[PathBuf]) -> ScanResult;

    /// Enumerate with progress reporting via events
    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanResult;
}
