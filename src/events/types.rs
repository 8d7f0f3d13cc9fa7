//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the hashing and export pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Enumeration phase events
    Scan(ScanEvent),
    /// Hashing phase events
    Hash(HashEvent),
    /// Report and archive export events
    Export(ExportEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during file enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started
    Started { roots: Vec<PathBuf> },
    /// A candidate file passed the extension filter
    FileFound { path: PathBuf },
    /// An error occurred but enumeration continues
    Error { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_files: usize },
}

/// Events during the hashing phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Hashing has started
    Started { total_files: usize },
    /// Progress update, sent once after every file
    Progress(HashProgress),
    /// A file was hashed successfully
    FileHashed { path: PathBuf, digest: String },
    /// A file was skipped; the batch continues
    Skipped { path: PathBuf, reason: String },
    /// The digest was recorded but the image could not be perceptually hashed
    ImageHashFailed { path: PathBuf, reason: String },
    /// Metadata size and bytes read disagree
    SizeMismatch {
        path: PathBuf,
        metadata_len: u64,
        read_len: u64,
    },
    /// Hashing completed
    Completed { hashed: usize, skipped: usize },
}

/// Progress information during hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of files processed so far (hashed or skipped)
    pub completed: usize,
    /// Total number of files in the batch
    pub total: usize,
    /// The file that was just processed
    pub current_path: PathBuf,
}

impl HashProgress {
    /// Fraction of the batch processed, in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Events emitted by export actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportEvent {
    /// A report file was written
    ReportWritten { path: PathBuf },
    /// An entry was added to an archive
    ArchiveEntryAdded { name: String },
    /// An archive and its checksum sidecar were written
    ArchiveSealed {
        path: PathBuf,
        sidecar: PathBuf,
        digest: String,
    },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Reporting,
    Packaging,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Files that passed the extension filter
    pub total_files: usize,
    /// Files with a digest record
    pub hashed: usize,
    /// Files skipped because they could not be read
    pub skipped: usize,
    /// Records carrying a perceptual hash
    pub images: usize,
    /// Sum of all hashed file sizes
    pub total_bytes: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
            PipelinePhase::Packaging => write!(f, "Packaging"),
        }
    }
}
