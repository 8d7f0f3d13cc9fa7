//! Writing report files to disk.
//!
//! Markdown is written as UTF-8 with a byte-order mark; PDF comes from the
//! injected renderer. Which of the two is written follows [`ExportFormat`].

use super::pdf::PdfRenderer;
use crate::error::{ConfigError, ReportError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Byte-order mark prefixed to Markdown reports
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Format of the default report base name
pub const REPORT_NAME_FORMAT: &str = "SHA_Report_%Y%m%d_%H%M%S";

/// `SHA_Report_<YYYYmmdd_HHMMSS>`, without extension
pub fn default_report_name(now: NaiveDateTime) -> String {
    now.format(REPORT_NAME_FORMAT).to_string()
}

/// Report file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    #[serde(alias = "md")]
    Markdown,
    Pdf,
    Both,
}

impl ExportFormat {
    /// Whether a `.md` file is produced
    pub fn includes_markdown(self) -> bool {
        matches!(self, ExportFormat::Markdown | ExportFormat::Both)
    }

    /// Whether a `.pdf` file is produced
    pub fn includes_pdf(self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Both)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            "both" => Ok(ExportFormat::Both),
            other => Err(ConfigError::UnknownExportFormat {
                value: other.to_string(),
            }),
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `<base_name>.md` and/or `<base_name>.pdf` into `dir`.
///
/// All contents are rendered before anything touches the disk. If a later
/// write fails, files already written by this call are removed.
///
/// Returns the paths written, Markdown first.
pub fn export_reports(
    dir: &Path,
    base_name: &str,
    format: ExportFormat,
    markdown: &str,
    renderer: &dyn PdfRenderer,
) -> Result<Vec<PathBuf>, ReportError> {
    let mut pending: Vec<(PathBuf, Vec<u8>)> = Vec::with_capacity(2);

    if format.includes_markdown() {
        let mut contents = Vec::with_capacity(UTF8_BOM.len() + markdown.len());
        contents.extend_from_slice(UTF8_BOM);
        contents.extend_from_slice(markdown.as_bytes());
        pending.push((dir.join(format!("{base_name}.md")), contents));
    }

    if format.includes_pdf() {
        let bytes = renderer.render(markdown)?;
        pending.push((dir.join(format!("{base_name}.pdf")), bytes));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(pending.len());
    for (path, contents) in pending {
        if let Err(e) = write_file(&path, &contents) {
            for done in &written {
                if let Err(cleanup) = fs::remove_file(done) {
                    warn!(path = %done.display(), error = %cleanup, "Failed to remove partial report");
                }
            }
            return Err(e);
        }
        info!(path = %path.display(), "Wrote report");
        written.push(path);
    }

    Ok(written)
}
