//! # Error Module
//!
//! Error types for the hashing, comparison and export pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file failures are not fatal** - the batch executor turns them
//!   into skip outcomes instead of propagating them

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrigistampError {
    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Non-fatal problems met while enumerating files.
///
/// These never abort a run; the batch keeps their messages.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while hashing a single file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Perceptual hash computation failed: {0}")]
    ComputationFailed(String),
}

/// Errors that abort a two-file or two-image comparison
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image hash failed: {0}")]
    ImageHash(#[from] HashError),
}

/// Errors that occur during report generation or report file export
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("GPG fingerprint must be exactly 40 hexadecimal characters (got {value:?})")]
    InvalidFingerprint { value: String },

    #[error("Nothing to report: hash some files or run a comparison first")]
    NothingToReport,

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while packaging an archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("No files to archive: hash some files first")]
    NoFiles,

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Archive I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write zip entry {entry}: {reason}")]
    Zip { entry: String, reason: String },

    #[error("Checksum file {path} is malformed")]
    MalformedSidecar { path: PathBuf },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Errors that occur while loading or saving preferences
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unknown export format: {value} (expected markdown, pdf or both)")]
    UnknownExportFormat { value: String },
}

/// Errors that stop a batch run as a whole
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Batch was cancelled after {completed} of {total} files")]
    Cancelled { completed: usize, total: usize },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrigistampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::Decode {
            path: PathBuf::from("/docs/broken.png"),
            reason: "invalid PNG signature".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/docs/broken.png"));
        assert!(message.contains("invalid PNG signature"));
    }

    #[test]
    fn fingerprint_error_shows_value() {
        let error = ReportError::InvalidFingerprint {
            value: "ABC".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("40 hexadecimal"));
        assert!(message.contains("ABC"));
    }

    #[test]
    fn archive_error_wraps_report_error_transparently() {
        let error: ArchiveError = ReportError::NothingToReport.into();
        assert_eq!(error.to_string(), ReportError::NothingToReport.to_string());
    }

    #[test]
    fn cancelled_error_reports_counts() {
        let error = PipelineError::Cancelled {
            completed: 3,
            total: 10,
        };
        assert!(error.to_string().contains("3 of 10"));
    }
}
