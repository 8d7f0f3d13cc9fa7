//! Batch execution: enumerate, then hash every file in parallel.

use crate::core::hasher::{FileHasher, FileRecord, HashOutcome};
use crate::core::scanner::{FileScanner, ScanConfig, WalkDirScanner};
use crate::error::{OrigistampError, PipelineError};
use crate::events::{
    null_sender, Event, EventSender, HashEvent, HashProgress, PipelineEvent, PipelinePhase,
    PipelineSummary,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};

/// Cooperative cancellation flag, checked before each file is hashed.
///
/// Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A file that was left out of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// The hashed result of one selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Records in enumeration order
    pub records: Vec<FileRecord>,
    /// Files whose digest could not be computed
    pub skipped: Vec<SkippedFile>,
    /// Images that were hashed but not perceptually hashed, with the reason
    pub image_failures: Vec<SkippedFile>,
    /// Non-fatal enumeration problems
    pub scan_errors: Vec<String>,
    pub summary: PipelineSummary,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Paths of the hashed files, in order
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.records.iter().map(|r| r.path.clone()).collect()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Files and folders making up the selection
    pub paths: Vec<PathBuf>,
    /// Enumerator configuration
    pub scan_config: ScanConfig,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    hasher: Option<FileHasher>,
    cancellation: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            hasher: None,
            cancellation: None,
        }
    }

    /// Files and folders to hash
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Include dot-files
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Use a hasher with a different image hash capability
    pub fn hasher(mut self, hasher: FileHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Allow the run to be cancelled from another thread
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            hasher: self.hasher.unwrap_or_default(),
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerates a selection and hashes it into a [`Batch`]
pub struct Pipeline {
    config: PipelineConfig,
    hasher: FileHasher,
    cancellation: CancellationToken,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<Batch, OrigistampError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Records come back in enumeration order whatever order the workers
    /// finish in. Progress events carry a strictly increasing `completed`
    /// count and the last one equals the total.
    pub fn run_with_events(&self, events: &EventSender) -> Result<Batch, OrigistampError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan_with_events(&self.config.paths, events);

        let scan_errors: Vec<String> = scan_result.errors.iter().map(|e| e.to_string()).collect();
        for error in &scan_errors {
            warn!(%error, "Enumeration problem");
        }

        let files = scan_result.files;
        let total = files.len();

        // Phase 2: Hashing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));
        events.send(Event::Hash(HashEvent::Started { total_files: total }));

        let completed = Mutex::new(0usize);

        let outcomes: Vec<Option<HashOutcome>> = files
            .par_iter()
            .map(|path| {
                if self.cancellation.is_cancelled() {
                    return None;
                }

                let outcome = self.hasher.hash_file(path);
                report_outcome(&outcome, events);

                // Counting and sending under one lock keeps progress ordered
                let mut done = completed.lock().unwrap_or_else(|e| e.into_inner());
                *done += 1;
                events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed: *done,
                    total,
                    current_path: path.clone(),
                })));

                Some(outcome)
            })
            .collect();

        if self.cancellation.is_cancelled() {
            let done = *completed.lock().unwrap_or_else(|e| e.into_inner());
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
            info!(completed = done, total, "Batch cancelled");
            return Err(PipelineError::Cancelled {
                completed: done,
                total,
            }
            .into());
        }

        let mut records = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        let mut image_failures = Vec::new();

        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                HashOutcome::Hashed {
                    record,
                    image_error,
                } => {
                    if let Some(error) = image_error {
                        image_failures.push(SkippedFile {
                            path: record.path.clone(),
                            reason: error.to_string(),
                        });
                    }
                    records.push(record);
                }
                HashOutcome::Skipped { path, reason } => skipped.push(SkippedFile {
                    path,
                    reason: reason.to_string(),
                }),
            }
        }

        events.send(Event::Hash(HashEvent::Completed {
            hashed: records.len(),
            skipped: skipped.len(),
        }));

        let summary = PipelineSummary {
            total_files: total,
            hashed: records.len(),
            skipped: skipped.len(),
            images: records
                .iter()
                .filter(|r| r.perceptual_hash.is_some())
                .count(),
            total_bytes: records.iter().map(|r| r.size_bytes).sum(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            hashed = summary.hashed,
            skipped = summary.skipped,
            duration_ms = summary.duration_ms,
            "Batch hashed"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(Batch {
            records,
            skipped,
            image_failures,
            scan_errors,
            summary,
        })
    }
}

fn report_outcome(outcome: &HashOutcome, events: &EventSender) {
    match outcome {
        HashOutcome::Hashed {
            record,
            image_error,
        } => {
            events.send(Event::Hash(HashEvent::FileHashed {
                path: record.path.clone(),
                digest: record.digest.clone(),
            }));
            if let Some(error) = image_error {
                events.send(Event::Hash(HashEvent::ImageHashFailed {
                    path: record.path.clone(),
                    reason: error.to_string(),
                }));
            }
            if record.size_mismatch() {
                events.send(Event::Hash(HashEvent::SizeMismatch {
                    path: record.path.clone(),
                    metadata_len: record.size_bytes,
                    read_len: record.content_len,
                }));
            }
        }
        HashOutcome::Skipped { path, reason } => {
            events.send(Event::Hash(HashEvent::Skipped {
                path: path.clone(),
                reason: reason.to_string(),
            }));
        }
    }
}
