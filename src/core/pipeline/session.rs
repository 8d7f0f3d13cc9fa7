//! The active batch and comparison, and the three export actions over them.

use super::executor::{Batch, CancellationToken, Pipeline};
use crate::core::archive::{ArchivePackager, ArchiveReceipt};
use crate::core::comparator::{compare_files, ComparisonResult, ImageComparator};
use crate::core::hasher::{FileHasher, HashAlgorithm, PerceptualHasher};
use crate::core::reporter::{build_report, export_reports, ExportFormat, PdfRenderer, ReportMetadata};
use crate::core::scanner::ScanConfig;
use crate::error::{ArchiveError, CompareError, OrigistampError, ReportError};
use crate::events::{Event, EventSender, ExportEvent, PipelineEvent, PipelinePhase};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Holds at most one batch and one comparison result.
///
/// Loading a new selection discards both. Every export goes through
/// [`build_report`], so clipboard text, saved files and archived reports
/// are byte-identical for the same state and metadata.
pub struct Session {
    batch: Option<Batch>,
    comparison: Option<ComparisonResult>,
    hasher: FileHasher,
    image_comparator: ImageComparator,
    scan_config: ScanConfig,
}

impl Session {
    /// Session using the default 64-bit pHash
    pub fn new() -> Self {
        Self::with_algorithm(Arc::new(PerceptualHasher::default()))
    }

    /// Session whose batch hashing and image comparison share one capability
    pub fn with_algorithm(algorithm: Arc<dyn HashAlgorithm>) -> Self {
        Self {
            batch: None,
            comparison: None,
            hasher: FileHasher::with_algorithm(algorithm.clone()),
            image_comparator: ImageComparator::with_algorithm(algorithm),
            scan_config: ScanConfig::default(),
        }
    }

    pub fn with_scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    pub fn comparison(&self) -> Option<&ComparisonResult> {
        self.comparison.as_ref()
    }

    /// Replace the batch with a fresh hash of `paths`.
    ///
    /// The previous batch and comparison are dropped before hashing starts,
    /// so a failed or cancelled load leaves the session empty.
    pub fn load(
        &mut self,
        paths: Vec<PathBuf>,
        events: &EventSender,
        cancellation: Option<CancellationToken>,
    ) -> Result<&Batch, OrigistampError> {
        self.batch = None;
        self.comparison = None;

        let mut builder = Pipeline::builder()
            .paths(paths)
            .scan_config(self.scan_config.clone())
            .hasher(self.hasher.clone());
        if let Some(token) = cancellation {
            builder = builder.cancellation(token);
        }

        let batch = builder.build().run_with_events(events)?;
        Ok(self.batch.insert(batch))
    }

    /// Byte-compare two files and retain the result.
    ///
    /// On failure the previous comparison, if any, is kept.
    pub fn compare_files(&mut self, a: &Path, b: &Path) -> Result<&ComparisonResult, CompareError> {
        let result = compare_files(a, b)?;
        Ok(self.comparison.insert(result.into()))
    }

    /// Perceptually compare two images and retain the result.
    ///
    /// On failure the previous comparison, if any, is kept.
    pub fn compare_images(&mut self, a: &Path, b: &Path) -> Result<&ComparisonResult, CompareError> {
        let result = self.image_comparator.compare(a, b)?;
        Ok(self.comparison.insert(result.into()))
    }

    fn build(&self, metadata: &ReportMetadata) -> Result<String, ReportError> {
        let records = self.batch.as_ref().map(|b| b.records.as_slice()).unwrap_or(&[]);
        build_report(records, self.comparison.as_ref(), metadata)
    }

    /// Report text for the clipboard. Requires a batch.
    pub fn report_text(&self, metadata: &ReportMetadata) -> Result<String, ReportError> {
        if self.batch.is_none() {
            return Err(ReportError::NothingToReport);
        }
        self.build(metadata)
    }

    /// Write the report into `dir` as `<base_name>.md` and/or `.pdf`.
    ///
    /// Requires a batch or a retained comparison.
    pub fn save_report(
        &self,
        dir: &Path,
        base_name: &str,
        format: ExportFormat,
        metadata: &ReportMetadata,
        renderer: &dyn PdfRenderer,
        events: &EventSender,
    ) -> Result<Vec<PathBuf>, ReportError> {
        if self.batch.is_none() && self.comparison.is_none() {
            return Err(ReportError::NothingToReport);
        }

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Reporting,
        }));

        let report = self.build(metadata)?;
        let written = export_reports(dir, base_name, format, &report, renderer)?;

        for path in &written {
            events.send(Event::Export(ExportEvent::ReportWritten { path: path.clone() }));
        }
        info!(files = written.len(), dir = %dir.display(), "Report saved");

        Ok(written)
    }

    /// Package the batch and its report into `dest`. Requires a non-empty
    /// batch.
    pub fn create_archive(
        &self,
        dest: &Path,
        format: ExportFormat,
        metadata: &ReportMetadata,
        renderer: Arc<dyn PdfRenderer>,
        events: &EventSender,
    ) -> Result<ArchiveReceipt, ArchiveError> {
        let sources = match &self.batch {
            Some(batch) if !batch.is_empty() => batch.source_paths(),
            _ => return Err(ArchiveError::NoFiles),
        };

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Packaging,
        }));

        let report = self.build(metadata)?;
        ArchivePackager::new()
            .with_format(format)
            .with_renderer(renderer)
            .package(dest, &sources, &report, events)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
