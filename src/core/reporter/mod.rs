//! # Reporter Module
//!
//! Turns a batch (and the retained comparison, if any) into the report text
//! shared by every export action: clipboard text, saved report files and the
//! report inside an archive. There is exactly one builder, so the three
//! outputs cannot drift apart.
//!
//! ## Layout
//! 1. Title heading
//! 2. Metadata: author, notes, GPG fingerprint (each only when set), then
//!    the report time
//! 3. Table: file name, SHA-256, size in KB
//! 4. Comparison block, when a comparison is retained
//!
//! ## Renderers
//! - `markdown` - the canonical text
//! - `html` - styled HTML intermediate of the same text
//! - `pdf` - landscape PDF through an injectable [`PdfRenderer`]

mod export;
mod html;
mod markdown;
mod pdf;
mod table;

pub use export::{
    default_report_name, export_reports, ExportFormat, REPORT_NAME_FORMAT, UTF8_BOM,
};
pub use html::markdown_to_html;
pub use markdown::{format_size_kb, render_comparison, render_table, REPORT_TITLE};
pub use pdf::{PdfRenderer, PrintPdfRenderer};

use crate::core::comparator::ComparisonResult;
use crate::core::hasher::FileRecord;
use crate::error::ReportError;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Length of a full OpenPGP v4 fingerprint in hex characters
pub const FINGERPRINT_HEX_LEN: usize = 40;

/// Timestamp format shown in the report header
pub const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional user-supplied context printed above the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub author: String,
    pub note: String,
    /// Recorded as-is after a format check. Never verified against a key.
    pub gpg_fingerprint: String,
    pub generated_at: NaiveDateTime,
}

impl ReportMetadata {
    /// Empty metadata stamped with the given time
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            author: String::new(),
            note: String::new(),
            gpg_fingerprint: String::new(),
            generated_at,
        }
    }

    /// Empty metadata stamped with the local time
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into().trim().to_string();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into().trim().to_string();
        self
    }

    pub fn with_gpg_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.gpg_fingerprint = fingerprint.into().trim().to_string();
        self
    }

    /// Check the fingerprint format
    pub fn validate(&self) -> Result<(), ReportError> {
        validate_fingerprint(&self.gpg_fingerprint)
    }
}

/// Accepts an empty string or exactly 40 hex characters in any case.
///
/// This is a format check only.
pub fn validate_fingerprint(value: &str) -> Result<(), ReportError> {
    if value.is_empty() {
        return Ok(());
    }

    if value.len() == FINGERPRINT_HEX_LEN && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ReportError::InvalidFingerprint {
            value: value.to_string(),
        })
    }
}

/// Render the metadata block, ending with the report time
fn render_metadata(metadata: &ReportMetadata) -> String {
    let mut block = String::new();
    if !metadata.author.is_empty() {
        block.push_str(&format!("**Author:** {}\n", metadata.author));
    }
    if !metadata.note.is_empty() {
        block.push_str(&format!("**Notes:** {}\n", metadata.note));
    }
    if !metadata.gpg_fingerprint.is_empty() {
        block.push_str(&format!("**GPG Fingerprint:** `{}`\n", metadata.gpg_fingerprint));
    }
    block.push_str(&format!(
        "**Report Time:** {}\n",
        metadata.generated_at.format(REPORT_TIME_FORMAT)
    ));
    block
}

/// Build the full Markdown report.
///
/// The fingerprint is validated first; on failure nothing is rendered.
/// Output depends only on the arguments, so an unchanged batch and metadata
/// always produce identical bytes.
pub fn build_report(
    records: &[FileRecord],
    comparison: Option<&ComparisonResult>,
    metadata: &ReportMetadata,
) -> Result<String, ReportError> {
    metadata.validate()?;

    let mut report = format!("# {REPORT_TITLE}\n\n");
    report.push_str(&render_metadata(metadata));
    report.push_str("\n\n");
    report.push_str(&render_table(records));

    if let Some(comparison) = comparison {
        report.push_str("\n\n");
        report.push_str(&render_comparison(comparison));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comparator::FileComparison;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    fn record(name: &str, size: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from("/docs").join(name),
            display_name: name.to_string(),
            digest: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".to_string(),
            size_bytes: size,
            content_len: size,
            perceptual_hash: None,
        }
    }

    #[test]
    fn fingerprint_validation_rules() {
        assert!(validate_fingerprint("").is_ok());
        assert!(validate_fingerprint(&"a".repeat(40)).is_ok());
        assert!(validate_fingerprint("0123456789ABCDEFabcdef0123456789ABCDEF01").is_ok());

        assert!(validate_fingerprint(&"a".repeat(39)).is_err());
        assert!(validate_fingerprint(&"a".repeat(41)).is_err());
        assert!(validate_fingerprint(&format!("{}g", "a".repeat(39))).is_err());
        assert!(validate_fingerprint(&format!("{} ", "a".repeat(39))).is_err());
    }

    #[test]
    fn metadata_block_renders_only_set_fields() {
        let metadata = ReportMetadata::new(fixed_time()).with_note("  v1.2  ");
        let report = build_report(&[], None, &metadata).unwrap();

        assert!(!report.contains("**Author:**"));
        assert!(report.contains("**Notes:** v1.2\n"));
        assert!(!report.contains("**GPG Fingerprint:**"));
        assert!(report.contains("**Report Time:** 2024-03-09 14:05:07\n"));
    }

    #[test]
    fn report_layout_is_exact() {
        let fp = "0123456789abcdef0123456789abcdef01234567";
        let metadata = ReportMetadata::new(fixed_time())
            .with_author("Ada")
            .with_gpg_fingerprint(fp);
        let report = build_report(&[record("a.txt", 10)], None, &metadata).unwrap();

        let expected = format!(
            "# SHA-256 Hash Report\n\n\
             **Author:** Ada\n\
             **GPG Fingerprint:** `{fp}`\n\
             **Report Time:** 2024-03-09 14:05:07\n\
             \n\n\
             | File Name | SHA-256 | Size |\n\
             |-----------|---------|------|\n\
             | a.txt | `e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855` | 0.01 KB |\n"
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn invalid_fingerprint_blocks_report() {
        let metadata = ReportMetadata::new(fixed_time()).with_gpg_fingerprint("not-a-fingerprint");
        let result = build_report(&[record("a.txt", 1)], None, &metadata);

        assert!(matches!(result, Err(ReportError::InvalidFingerprint { .. })));
    }

    #[test]
    fn report_is_deterministic() {
        let records = vec![record("a.txt", 1), record("b.txt", 2048)];
        let metadata = ReportMetadata::new(fixed_time()).with_author("Ada");

        let first = build_report(&records, None, &metadata).unwrap();
        let second = build_report(&records, None, &metadata).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn comparison_is_appended_after_table() {
        let comparison = ComparisonResult::Files(FileComparison {
            path_a: PathBuf::from("/x/a.bin"),
            path_b: PathBuf::from("/y/b.bin"),
            digest_a: "11".repeat(32),
            digest_b: "11".repeat(32),
            identical: true,
        });
        let metadata = ReportMetadata::new(fixed_time());
        let report = build_report(&[record("a.txt", 1)], Some(&comparison), &metadata).unwrap();

        let table_end = report.find("| a.txt |").unwrap();
        let comparison_start = report.find("# File Comparison").unwrap();
        assert!(comparison_start > table_end);
        assert!(report.ends_with("**Result:** ✅ Files are IDENTICAL."));
    }
}
