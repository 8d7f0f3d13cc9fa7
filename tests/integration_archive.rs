//! Integration tests for report export and archive packaging.

use chrono::NaiveDate;
use origistamp::core::archive::{list_entries, sidecar_path, verify_sidecar, ArchivePackager};
use origistamp::core::hasher::sha256_hex;
use origistamp::core::pipeline::Session;
use origistamp::core::reporter::{ExportFormat, PrintPdfRenderer, ReportMetadata, UTF8_BOM};
use origistamp::error::{ArchiveError, ReportError};
use origistamp::events::{null_sender, Event, EventChannel, ExportEvent};
use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const FINGERPRINT: &str = "0123456789ABCDEF0123456789ABCDEF01234567";

fn metadata() -> ReportMetadata {
    let at = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    ReportMetadata::new(at)
        .with_author("Ada Lovelace")
        .with_note("Signed copy")
        .with_gpg_fingerprint(FINGERPRINT)
}

fn loaded_session(dir: &TempDir) -> Session {
    fs::write(dir.path().join("contract.pdf"), b"%PDF-contract").unwrap();
    fs::write(dir.path().join("notes.txt"), b"notes").unwrap();

    let mut session = Session::new();
    session
        .load(vec![dir.path().to_path_buf()], &null_sender(), None)
        .unwrap();
    session
}

fn zip_entry(archive: &PathBuf, name: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}

#[test]
fn archive_round_trip_with_sidecar() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let session = loaded_session(&src);
    let dest = out.path().join("DocHash_20240601_120000.zip");
    let (sender, receiver) = EventChannel::new();

    let receipt = session
        .create_archive(
            &dest,
            ExportFormat::Both,
            &metadata(),
            Arc::new(PrintPdfRenderer::new()),
            &sender,
        )
        .unwrap();

    assert_eq!(
        list_entries(&dest).unwrap(),
        vec!["contract.pdf", "notes.txt", "sha_report.md", "sha_report.pdf"]
    );
    assert_eq!(zip_entry(&dest, "notes.txt"), b"notes");
    assert!(zip_entry(&dest, "sha_report.pdf").starts_with(b"%PDF"));

    let sidecar = fs::read_to_string(sidecar_path(&dest)).unwrap();
    assert_eq!(
        sidecar,
        format!("{}  DocHash_20240601_120000.zip\n", sha256_hex(&fs::read(&dest).unwrap()))
    );
    assert_eq!(verify_sidecar(&dest).unwrap(), receipt.digest);

    let sealed = receiver
        .drain()
        .into_iter()
        .any(|e| matches!(e, Event::Export(ExportEvent::ArchiveSealed { .. })));
    assert!(sealed);
}

#[test]
fn archived_report_matches_clipboard_text() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let session = loaded_session(&src);
    let dest = out.path().join("bundle.zip");

    session
        .create_archive(
            &dest,
            ExportFormat::Markdown,
            &metadata(),
            Arc::new(PrintPdfRenderer::new()),
            &null_sender(),
        )
        .unwrap();

    let archived = zip_entry(&dest, "sha_report.md");
    let clipboard = session.report_text(&metadata()).unwrap();

    assert!(archived.starts_with(UTF8_BOM));
    assert_eq!(&archived[UTF8_BOM.len()..], clipboard.as_bytes());
    assert!(clipboard.contains("**Author:** Ada Lovelace\n**Notes:** Signed copy\n"));
    assert!(clipboard.contains(&format!("**GPG Fingerprint:** `{FINGERPRINT}`")));
}

#[test]
fn only_archive_and_sidecar_are_left_behind() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let stage = TempDir::new().unwrap();
    let session = loaded_session(&src);
    let dest = out.path().join("clean.zip");
    let report = session.report_text(&metadata()).unwrap();

    ArchivePackager::new()
        .with_format(ExportFormat::Both)
        .with_renderer(Arc::new(PrintPdfRenderer::new()))
        .with_staging_dir(stage.path())
        .package(&dest, &session.batch().unwrap().source_paths(), &report, &null_sender())
        .unwrap();

    let mut names: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["clean.zip", "clean.zip.sha256"]);
    assert_eq!(fs::read_dir(stage.path()).unwrap().count(), 0);
    assert_eq!(
        list_entries(&dest).unwrap(),
        vec!["contract.pdf", "notes.txt", "sha_report.md", "sha_report.pdf"]
    );
}

#[test]
fn invalid_fingerprint_blocks_archive() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let session = loaded_session(&src);
    let dest = out.path().join("blocked.zip");
    let bad = metadata().with_gpg_fingerprint("ZZZZ");

    let result = session.create_archive(
        &dest,
        ExportFormat::Markdown,
        &bad,
        Arc::new(PrintPdfRenderer::new()),
        &null_sender(),
    );

    assert!(matches!(
        result,
        Err(ArchiveError::Report(ReportError::InvalidFingerprint { .. }))
    ));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn saved_report_round_trips() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let session = loaded_session(&src);

    let written = session
        .save_report(
            out.path(),
            "SHA_Report_20240601_120000",
            ExportFormat::Both,
            &metadata(),
            &PrintPdfRenderer::new(),
            &null_sender(),
        )
        .unwrap();

    assert_eq!(written.len(), 2);
    let md = fs::read(&written[0]).unwrap();
    let expected = session.report_text(&metadata()).unwrap();
    assert_eq!(&md[UTF8_BOM.len()..], expected.as_bytes());
    assert!(fs::read(&written[1]).unwrap().starts_with(b"%PDF"));
}
