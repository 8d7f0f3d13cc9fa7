//! # Archive Module
//!
//! Bundles the hashed files and the report into one ZIP and seals it with a
//! `.sha256` sidecar.
//!
//! ## Layout
//! - Every source file under its base name, flat. Two sources with the same
//!   base name collapse to one entry holding the later file's bytes.
//! - Then `sha_report.md` and/or `sha_report.pdf`, per [`ExportFormat`].
//!
//! ## Atomicity
//! Reports are staged in a temporary directory. The ZIP and its sidecar are
//! written to temporary files next to the destination and renamed into place,
//! archive first, once both are complete. A failed run leaves an existing
//! archive and sidecar at the destination untouched.
//!
//! ## Example
//! ```rust,ignore
//! use origistamp::core::archive::ArchivePackager;
//!
//! let receipt = ArchivePackager::new().package(&dest, &paths, &report, &events)?;
//! println!("{}  {}", receipt.digest, receipt.path.display());
//! ```

use crate::core::hasher::{display_name, is_digest_hex, sha256_hex};
use crate::core::reporter::{export_reports, ExportFormat, PdfRenderer, PrintPdfRenderer};
use crate::error::ArchiveError;
use crate::events::{Event, EventSender, ExportEvent};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, instrument, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Base name of the report entries inside the archive
pub const REPORT_ENTRY_STEM: &str = "sha_report";

/// Extension appended to the archive path for the checksum sidecar
pub const SIDECAR_EXTENSION: &str = "sha256";

/// Format of the default archive name
pub const ARCHIVE_NAME_FORMAT: &str = "DocHash_%Y%m%d_%H%M%S.zip";

/// What a successful packaging run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReceipt {
    /// Final archive location
    pub path: PathBuf,
    /// Checksum sidecar location
    pub sidecar: PathBuf,
    /// Lowercase hex SHA-256 of the archive bytes
    pub digest: String,
    /// Entry names in the order they were written
    pub entries: Vec<String>,
}

/// `<archive>.sha256`, next to the archive
pub fn sidecar_path(archive: &Path) -> PathBuf {
    let mut name = archive
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    archive.with_file_name(name)
}

/// `DocHash_<YYYYmmdd_HHMMSS>.zip`
pub fn default_archive_name(now: NaiveDateTime) -> String {
    now.format(ARCHIVE_NAME_FORMAT).to_string()
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn zip_error(entry: &str) -> impl FnOnce(zip::result::ZipError) -> ArchiveError + '_ {
    move |e| ArchiveError::Zip {
        entry: entry.to_string(),
        reason: e.to_string(),
    }
}

/// Ordered entry plan. A later entry with a name already planned replaces
/// the earlier source and keeps the earlier position.
fn plan_entries(sources: impl IntoIterator<Item = PathBuf>) -> Vec<(String, PathBuf)> {
    let mut plan: Vec<(String, PathBuf)> = Vec::new();
    for source in sources {
        let name = display_name(&source);
        match plan.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => {
                debug!(entry = %name, replaced_by = %source.display(), "Duplicate archive entry name");
                slot.1 = source;
            }
            None => plan.push((name, source)),
        }
    }
    plan
}

/// Writes archives and their sidecars
#[derive(Clone)]
pub struct ArchivePackager {
    format: ExportFormat,
    renderer: Arc<dyn PdfRenderer>,
    staging_root: Option<PathBuf>,
}

impl ArchivePackager {
    /// Packager that includes a Markdown report and renders PDFs with printpdf
    pub fn new() -> Self {
        Self {
            format: ExportFormat::default(),
            renderer: Arc::new(PrintPdfRenderer::new()),
            staging_root: None,
        }
    }

    /// Which report files go into the archive
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Use a different PDF renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Stage reports under `dir` instead of the system temp directory
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(dir.into());
        self
    }

    fn staging_dir(&self) -> Result<TempDir, ArchiveError> {
        match &self.staging_root {
            Some(root) => TempDir::new_in(root).map_err(io_error(root)),
            None => TempDir::new().map_err(io_error(Path::new("<staging>"))),
        }
    }

    /// Build the archive at `dest` from `sources` plus the report text.
    ///
    /// `sources` must be non-empty. On any failure the destination is left
    /// untouched and the staged reports are removed.
    #[instrument(skip(self, sources, report, events), fields(dest = %dest.display(), files = sources.len()))]
    pub fn package(
        &self,
        dest: &Path,
        sources: &[PathBuf],
        report: &str,
        events: &EventSender,
    ) -> Result<ArchiveReceipt, ArchiveError> {
        if sources.is_empty() {
            return Err(ArchiveError::NoFiles);
        }

        let staging = self.staging_dir()?;
        let staged = export_reports(
            staging.path(),
            REPORT_ENTRY_STEM,
            self.format,
            report,
            self.renderer.as_ref(),
        )?;

        let plan = plan_entries(sources.iter().cloned().chain(staged));

        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = NamedTempFile::new_in(&parent).map_err(io_error(&parent))?;

        {
            let mut writer = ZipWriter::new(temp.as_file_mut());
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            for (name, source) in &plan {
                let mut input = File::open(source).map_err(io_error(source))?;
                writer.start_file(name.as_str(), options).map_err(zip_error(name))?;
                io::copy(&mut input, &mut writer).map_err(io_error(source))?;
                events.send(Event::Export(ExportEvent::ArchiveEntryAdded { name: name.clone() }));
            }

            writer.finish().map_err(zip_error("<central directory>"))?;
        }

        let mut bytes = Vec::new();
        temp.reopen()
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(io_error(temp.path()))?;
        let digest = sha256_hex(&bytes);

        let sidecar = sidecar_path(dest);
        let mut sidecar_temp = NamedTempFile::new_in(&parent).map_err(io_error(&parent))?;
        write!(sidecar_temp, "{digest}  {}\n", display_name(dest))
            .map_err(io_error(sidecar_temp.path()))?;

        temp.persist(dest).map_err(|e| ArchiveError::Io {
            path: dest.to_path_buf(),
            source: e.error,
        })?;

        if let Err(e) = sidecar_temp.persist(&sidecar) {
            if let Err(cleanup) = fs::remove_file(dest) {
                warn!(path = %dest.display(), error = %cleanup, "Failed to remove unsealed archive");
            }
            return Err(ArchiveError::Io {
                path: sidecar,
                source: e.error,
            });
        }

        info!(path = %dest.display(), entries = plan.len(), %digest, "Archive sealed");
        events.send(Event::Export(ExportEvent::ArchiveSealed {
            path: dest.to_path_buf(),
            sidecar: sidecar.clone(),
            digest: digest.clone(),
        }));

        Ok(ArchiveReceipt {
            path: dest.to_path_buf(),
            sidecar,
            digest,
            entries: plan.into_iter().map(|(name, _)| name).collect(),
        })
    }
}

impl Default for ArchivePackager {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-hash an archive and check it against its sidecar.
///
/// Returns the verified digest.
pub fn verify_sidecar(archive: &Path) -> Result<String, ArchiveError> {
    let sidecar = sidecar_path(archive);
    let contents = fs::read_to_string(&sidecar).map_err(io_error(&sidecar))?;

    let malformed = || ArchiveError::MalformedSidecar {
        path: sidecar.clone(),
    };
    let line = contents.lines().next().ok_or_else(malformed)?;
    let (expected, name) = line.split_once("  ").ok_or_else(malformed)?;
    if !is_digest_hex(expected) || name != display_name(archive) {
        return Err(malformed());
    }

    let bytes = fs::read(archive).map_err(io_error(archive))?;
    let actual = sha256_hex(&bytes);

    if actual != expected {
        return Err(ArchiveError::ChecksumMismatch {
            path: archive.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }

    Ok(actual)
}

/// Entry names of an archive, in stored order
pub fn list_entries(archive: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(archive).map_err(io_error(archive))?;
    let mut zip = ZipArchive::new(file).map_err(zip_error("<central directory>"))?;

    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i).map_err(zip_error("<entry>"))?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}
