//! # CLI Module
//!
//! Command-line interface for Origistamp Hash.
//!
//! ## Usage
//! ```bash
//! # Hash a folder and print the report table
//! origistamp hash ~/Documents/contract
//!
//! # Save the report as Markdown and PDF, and bundle everything
//! origistamp hash ~/Documents/contract --report out/report.md --format both --zip out/
//!
//! # Compare two files or two images
//! origistamp compare-files a.pdf b.pdf
//! origistamp compare-images a.png b.png --output json
//!
//! # Check an archive against its .sha256 sidecar
//! origistamp verify out/DocHash_20240101_120000.zip
//! ```

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use origistamp::config::Config;
use origistamp::core::archive::{default_archive_name, list_entries, verify_sidecar, ArchiveReceipt};
use origistamp::core::comparator::{compare_files, compare_images, ComparisonResult};
use origistamp::core::pipeline::{Batch, Session};
use origistamp::core::reporter::{
    default_report_name, format_size_kb, markdown_to_html, render_comparison, validate_fingerprint,
    ExportFormat, PrintPdfRenderer,
};
use origistamp::core::scanner::ScanConfig;
use origistamp::error::{ReportError, Result};
use origistamp::events::{null_sender, Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Origistamp Hash - fingerprint documents and images
#[derive(Parser, Debug)]
#[command(name = "origistamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash files and folders, then optionally save a report or archive
    Hash {
        /// Files and folders to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Save the report here (a file name or a directory)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Also write the report as standalone HTML
        #[arg(long)]
        html: Option<PathBuf>,

        /// Report format: markdown, pdf or both
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Bundle files and report into a ZIP (a file name or a directory)
        #[arg(long)]
        zip: Option<PathBuf>,

        /// Author shown in the report
        #[arg(long)]
        author: Option<String>,

        /// Note shown in the report
        #[arg(long)]
        note: Option<String>,

        /// GPG fingerprint shown in the report (40 hex characters)
        #[arg(long)]
        gpg: Option<String>,

        /// Byte-compare two files and append the result to the report
        #[arg(long, num_args = 2, value_names = ["A", "B"])]
        compare_files: Option<Vec<PathBuf>>,

        /// Compare two images perceptually and append the result to the report
        #[arg(long, num_args = 2, value_names = ["A", "B"])]
        compare_images: Option<Vec<PathBuf>>,

        /// Skip dot-files
        #[arg(long)]
        no_hidden: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Check whether two files are byte-identical
    CompareFiles {
        a: PathBuf,
        b: PathBuf,

        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Measure how similar two images look
    CompareImages {
        a: PathBuf,
        b: PathBuf,

        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Check an archive against its .sha256 sidecar
    Verify {
        archive: PathBuf,
    },

    /// Show or change stored preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current preferences
    Show,
    /// Change one or more preferences
    Set {
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        gpg: Option<String>,
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(long)]
        open_folder: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// The report itself, as Markdown
    Markdown,
}

struct HashArgs {
    paths: Vec<PathBuf>,
    report: Option<PathBuf>,
    html: Option<PathBuf>,
    format: Option<ExportFormat>,
    zip: Option<PathBuf>,
    author: Option<String>,
    note: Option<String>,
    gpg: Option<String>,
    compare_files: Option<Vec<PathBuf>>,
    compare_images: Option<Vec<PathBuf>>,
    include_hidden: bool,
    output: OutputFormat,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Hash {
            paths,
            report,
            html,
            format,
            zip,
            author,
            note,
            gpg,
            compare_files,
            compare_images,
            no_hidden,
            output,
        } => run_hash(
            &config_path,
            HashArgs {
                paths,
                report,
                html,
                format,
                zip,
                author,
                note,
                gpg,
                compare_files,
                compare_images,
                include_hidden: !no_hidden,
                output,
            },
        ),
        Commands::CompareFiles { a, b, output } => {
            let result = ComparisonResult::from(compare_files(&a, &b)?);
            print_comparison(&result, output);
            Ok(())
        }
        Commands::CompareImages { a, b, output } => {
            let result = ComparisonResult::from(compare_images(&a, &b)?);
            print_comparison(&result, output);
            Ok(())
        }
        Commands::Verify { archive } => run_verify(&archive),
        Commands::Config { action } => run_config(&config_path, action),
    }
}

fn run_hash(config_path: &Path, args: HashArgs) -> Result<()> {
    let term = Term::stderr();
    let config = Config::load(config_path);
    let now = Local::now().naive_local();

    let mut metadata = config.metadata(now);
    if let Some(author) = args.author {
        metadata = metadata.with_author(author);
    }
    if let Some(note) = args.note {
        metadata = metadata.with_note(note);
    }
    if let Some(gpg) = args.gpg {
        metadata = metadata.with_gpg_fingerprint(gpg);
    }
    // Fail before hashing rather than after
    metadata.validate()?;

    let format = args.format.unwrap_or(config.export_format);
    let pretty = args.output == OutputFormat::Pretty;

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Origistamp Hash").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut session = Session::new().with_scan_config(ScanConfig {
        include_hidden: args.include_hidden,
        ..Default::default()
    });

    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Hash(HashEvent::Skipped { path, reason }) => {
                    pb.println(format!(
                        "{} skipped {}: {}",
                        style("!").yellow().bold(),
                        path.display(),
                        reason
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let loaded = session.load(args.paths, &sender, None).map(|_| ());

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    loaded?;

    if let Some(pair) = &args.compare_files {
        if let [a, b] = pair.as_slice() {
            session.compare_files(a, b)?;
        }
    }
    if let Some(pair) = &args.compare_images {
        if let [a, b] = pair.as_slice() {
            session.compare_images(a, b)?;
        }
    }

    let renderer = Arc::new(PrintPdfRenderer::new());
    let mut written: Vec<PathBuf> = Vec::new();
    let mut receipt: Option<ArchiveReceipt> = None;

    if let Some(target) = &args.report {
        let (dir, base) = report_target(target, now);
        written.extend(session.save_report(
            &dir,
            &base,
            format,
            &metadata,
            renderer.as_ref(),
            &null_sender(),
        )?);
    }

    if let Some(target) = &args.html {
        let text = session.report_text(&metadata)?;
        fs::write(target, markdown_to_html(&text)).map_err(|source| ReportError::Write {
            path: target.clone(),
            source,
        })?;
        info!(path = %target.display(), "Wrote HTML report");
        written.push(target.clone());
    }

    if let Some(target) = &args.zip {
        let dest = archive_target(target, now);
        receipt = Some(session.create_archive(
            &dest,
            format,
            &metadata,
            renderer.clone(),
            &null_sender(),
        )?);
    }

    match args.output {
        OutputFormat::Pretty => {
            if let Some(batch) = session.batch() {
                print_pretty_batch(&term, batch);
            }
            if let Some(comparison) = session.comparison() {
                print_pretty_comparison(&term, comparison);
            }
            print_pretty_outputs(&term, &written, receipt.as_ref());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "batch": session.batch(),
                "comparison": session.comparison(),
                "reports": written,
                "archive": receipt,
            });
            print_json(&output);
        }
        OutputFormat::Markdown => {
            println!("{}", session.report_text(&metadata)?);
        }
    }

    if config.open_folder {
        let folder = written
            .first()
            .map(PathBuf::as_path)
            .or(receipt.as_ref().map(|r| r.path.as_path()))
            .map(parent_or_cwd);
        if let Some(folder) = folder {
            open_folder(&folder);
        }
    }

    Ok(())
}

fn run_verify(archive: &Path) -> Result<()> {
    let term = Term::stdout();
    let digest = verify_sidecar(archive)?;
    let entries = list_entries(archive)?;

    term.write_line(&format!(
        "{} {} matches its checksum",
        style("✓").green().bold(),
        archive.display()
    ))
    .ok();
    term.write_line(&format!("  SHA-256: {}", style(&digest).cyan())).ok();
    term.write_line(&format!("  {} entries:", entries.len())).ok();
    for entry in entries {
        term.write_line(&format!("    {entry}")).ok();
    }
    Ok(())
}

fn run_config(config_path: &Path, action: ConfigAction) -> Result<()> {
    let mut config = Config::load(config_path);

    match action {
        ConfigAction::Show => {
            println!("# {}", config_path.display());
            print_json(&config);
        }
        ConfigAction::Set {
            author,
            note,
            gpg,
            format,
            open_folder,
        } => {
            if let Some(author) = author {
                config.author = author.trim().to_string();
            }
            if let Some(note) = note {
                config.note = note.trim().to_string();
            }
            if let Some(gpg) = gpg {
                let gpg = gpg.trim().to_string();
                validate_fingerprint(&gpg)?;
                config.gpg = gpg;
            }
            if let Some(format) = format {
                config.export_format = format;
            }
            if let Some(open_folder) = open_folder {
                config.open_folder = open_folder;
            }
            config.save(config_path)?;
            println!(
                "{} Saved {}",
                style("✓").green().bold(),
                config_path.display()
            );
        }
    }
    Ok(())
}

/// A directory gets a timestamped name; a file path gives the directory and
/// base name, extension dropped
fn report_target(target: &Path, now: NaiveDateTime) -> (PathBuf, String) {
    if target.is_dir() {
        return (target.to_path_buf(), default_report_name(now));
    }
    let base = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| default_report_name(now));
    (parent_or_cwd(target), base)
}

fn archive_target(target: &Path, now: NaiveDateTime) -> PathBuf {
    if target.is_dir() {
        target.join(default_archive_name(now))
    } else {
        target.to_path_buf()
    }
}

fn parent_or_cwd(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Launch the platform file manager. Failure is only logged.
fn open_folder(dir: &Path) {
    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let program = "xdg-open";

    if let Err(e) = Command::new(program).arg(dir).spawn() {
        warn!(dir = %dir.display(), error = %e, "Could not open folder");
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Failed to serialize output"),
    }
}

fn print_comparison(result: &ComparisonResult, output: OutputFormat) {
    match output {
        OutputFormat::Pretty => print_pretty_comparison(&Term::stdout(), result),
        OutputFormat::Json => print_json(result),
        OutputFormat::Markdown => println!("{}", render_comparison(result)),
    }
}

fn print_pretty_batch(term: &Term, batch: &Batch) {
    term.write_line(&format!("{} Hashing Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} files hashed in {:.1}s",
        style(batch.summary.hashed).cyan(),
        batch.summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    if batch.summary.images > 0 {
        term.write_line(&format!(
            "  {} images with a perceptual hash",
            style(batch.summary.images).cyan()
        ))
        .ok();
    }
    if !batch.skipped.is_empty() {
        term.write_line(&format!(
            "  {} files skipped",
            style(batch.skipped.len()).yellow()
        ))
        .ok();
    }
    term.write_line("").ok();

    if batch.is_empty() {
        term.write_line(&format!("  {}", style("No supported files found.").yellow()))
            .ok();
        return;
    }

    for record in &batch.records {
        term.write_line(&format!(
            "  {}  {}  {}",
            style(&record.digest).dim(),
            style(format!("{:>12}", format_size_kb(record.size_bytes))).cyan(),
            record.display_name
        ))
        .ok();
        if let Some(hash) = &record.perceptual_hash {
            term.write_line(&format!("    {} {}", style("pHash").dim(), hash)).ok();
        }
    }

    for failure in &batch.image_failures {
        term.write_line(&format!(
            "  {} {}: {}",
            style("!").yellow(),
            failure.path.display(),
            failure.reason
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn print_pretty_comparison(term: &Term, comparison: &ComparisonResult) {
    match comparison {
        ComparisonResult::Files(c) => {
            term.write_line(&format!("{}", style("File Comparison").bold().underlined()))
                .ok();
            term.write_line(&format!("  A: {}  {}", c.name_a(), style(&c.digest_a).dim()))
                .ok();
            term.write_line(&format!("  B: {}  {}", c.name_b(), style(&c.digest_b).dim()))
                .ok();
            let verdict = if c.identical {
                style(c.verdict()).green().bold()
            } else {
                style(c.verdict()).red().bold()
            };
            term.write_line(&format!("  {verdict}")).ok();
        }
        ComparisonResult::Images(c) => {
            term.write_line(&format!("{}", style("Image Comparison").bold().underlined()))
                .ok();
            term.write_line(&format!("  A: {}  {}", c.name_a(), style(&c.hash_a).dim()))
                .ok();
            term.write_line(&format!("  B: {}  {}", c.name_b(), style(&c.hash_b).dim()))
                .ok();
            term.write_line(&format!(
                "  Difference: {}  {}",
                style(c.distance).cyan(),
                style(c.verdict.to_string()).bold()
            ))
            .ok();
        }
    }
    term.write_line("").ok();
}

fn print_pretty_outputs(term: &Term, written: &[PathBuf], receipt: Option<&ArchiveReceipt>) {
    for path in written {
        term.write_line(&format!(
            "{} Saved {}",
            style("✓").green().bold(),
            path.display()
        ))
        .ok();
    }
    if let Some(receipt) = receipt {
        term.write_line(&format!(
            "{} Archive {} ({} entries)",
            style("✓").green().bold(),
            receipt.path.display(),
            receipt.entries.len()
        ))
        .ok();
        term.write_line(&format!(
            "  Checksum {}  {}",
            style(&receipt.digest).cyan(),
            receipt.sidecar.display()
        ))
        .ok();
    }
}
