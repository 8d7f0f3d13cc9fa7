//! # Core Module
//!
//! The front-end-agnostic hashing and export engine.
//!
//! ## Modules
//! - `scanner` - Expands a selection into candidate files
//! - `hasher` - SHA-256 digests and perceptual image hashes
//! - `comparator` - Two-file and two-image comparison
//! - `reporter` - Builds and exports the Markdown/PDF report
//! - `archive` - Packages files and report into a sealed ZIP
//! - `pipeline` - Batch execution and the session holding its results

pub mod archive;
pub mod comparator;
pub mod hasher;
pub mod pipeline;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use archive::{verify_sidecar, ArchivePackager, ArchiveReceipt};
pub use comparator::{ComparisonResult, FileComparison, ImageComparison, ImageVerdict};
pub use hasher::{FileHasher, FileRecord, HashOutcome, ImageHashValue, PerceptualHash};
pub use pipeline::{Batch, CancellationToken, Pipeline, Session};
pub use reporter::{build_report, ExportFormat, ReportMetadata};
