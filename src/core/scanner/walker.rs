//! Directory walking implementation using walkdir.

use super::{filter::ExtensionFilter, FileScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for the enumerator
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include dot-files
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use the default allowlist)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            extensions: None,
        }
    }
}

/// Enumerator built on the walkdir crate.
///
/// Directory entries are visited in file-name order, so a fixed filesystem
/// state always yields the same sequence.
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ExtensionFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ExtensionFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    fn push_candidate(
        &self,
        path: &Path,
        seen: &mut HashSet<PathBuf>,
        files: &mut Vec<PathBuf>,
        events: &EventSender,
    ) {
        if !self.filter.should_include(path) {
            return;
        }
        if !seen.insert(path.to_path_buf()) {
            debug!(path = %path.display(), "Duplicate selection ignored");
            return;
        }
        events.send(Event::Scan(ScanEvent::FileFound {
            path: path.to_path_buf(),
        }));
        files.push(path.to_path_buf());
    }

    fn walk_directory(
        &self,
        root: &Path,
        seen: &mut HashSet<PathBuf>,
        files: &mut Vec<PathBuf>,
        errors: &mut Vec<ScanError>,
        events: &EventSender,
    ) {
        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker.into_iter().filter_entry(|entry| {
            include_hidden || entry.depth() == 0 || !is_hidden_dir(entry)
        });

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        continue;
                    }
                    self.push_candidate(entry.path(), seen, files, events);
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    errors.push(error);
                }
            }
        }
    }
}

/// Dot-directory below the walk root
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

impl FileScanner for WalkDirScanner {
    fn scan(&self, roots: &[PathBuf]) -> ScanResult {
        self.scan_with_events(roots, &crate::events::null_sender())
    }

    fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut files = Vec::new();
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for root in roots {
            if root.is_dir() {
                self.walk_directory(root, &mut seen, &mut files, &mut errors, events);
            } else if root.exists() {
                self.push_candidate(root, &mut seen, &mut files, events);
            } else {
                let error = ScanError::PathNotFound { path: root.clone() };
                events.send(Event::Scan(ScanEvent::Error {
                    path: root.clone(),
                    message: error.to_string(),
                }));
                errors.push(error);
            }
        }

        debug!(found = files.len(), errors = errors.len(), "Enumeration finished");

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        ScanResult { files, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"content").unwrap();
        path
    }

    fn scan_dir(dir: &TempDir) -> ScanResult {
        WalkDirScanner::new(ScanConfig::default()).scan(&[dir.path().to_path_buf()])
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let result = scan_dir(&temp_dir);

        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_keeps_only_supported_files_in_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        create_file(temp_dir.path(), "notes.txt");
        create_file(temp_dir.path(), "movie.mp4");
        create_file(&nested, "logo.PNG");
        create_file(&nested, "data.sqlite");
        create_file(&nested, "setup.exe");

        let result = scan_dir(&temp_dir);

        assert_eq!(result.files.len(), 3);
        assert!(result.files.iter().all(|p| {
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            name != "movie.mp4" && name != "data.sqlite"
        }));
    }

    #[test]
    fn scan_order_is_lexicographic_and_stable() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        create_file(temp_dir.path(), "c.txt");
        create_file(temp_dir.path(), "a.txt");
        create_file(&sub, "b.txt");

        let first = scan_dir(&temp_dir);
        let second = scan_dir(&temp_dir);

        let names: Vec<_> = first
            .files
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("c.txt"),
                PathBuf::from("sub").join("b.txt"),
            ]
        );
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn explicit_files_keep_caller_order_and_are_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let z = create_file(temp_dir.path(), "z.md");
        let a = create_file(temp_dir.path(), "a.json");
        let skipped = create_file(temp_dir.path(), "clip.mov");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[z.clone(), skipped, a.clone()]);

        assert_eq!(result.files, vec![z, a]);
    }

    #[test]
    fn duplicate_selections_are_collapsed() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_file(temp_dir.path(), "one.txt");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[file.clone(), file.clone()]);

        assert_eq!(result.files, vec![file]);
    }

    #[test]
    fn missing_root_is_recorded_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let present = create_file(temp_dir.path(), "here.txt");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&[PathBuf::from("/nonexistent/path/12345"), present.clone()]);

        assert_eq!(result.files, vec![present]);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ScanError::PathNotFound { .. }));
    }

    #[test]
    fn scan_emits_found_and_completed_events() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.txt");
        create_file(temp_dir.path(), "b.txt");

        let (sender, receiver) = EventChannel::new();
        let scanner = WalkDirScanner::new(ScanConfig::default());
        scanner.scan_with_events(&[temp_dir.path().to_path_buf()], &sender);

        let events = receiver.drain();
        let found = events
            .iter()
            .filter(|e| matches!(e, Event::Scan(ScanEvent::FileFound { .. })))
            .count();
        assert_eq!(found, 2);
        assert!(matches!(
            events.last(),
            Some(Event::Scan(ScanEvent::Completed { total_files: 2 }))
        ));
    }

    #[test]
    fn hidden_directories_are_pruned_when_hidden_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let git = temp_dir.path().join(".git");
        fs::create_dir(&git).unwrap();
        create_file(&git, "config.json");
        create_file(temp_dir.path(), ".env.txt");
        let kept = create_file(temp_dir.path(), "a.txt");

        let config = ScanConfig {
            include_hidden: false,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(result.files, vec![kept]);
    }

    #[test]
    fn hidden_root_is_still_walked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join(".vault");
        fs::create_dir(&root).unwrap();
        let inside = create_file(&root, "deed.pdf");

        let config = ScanConfig {
            include_hidden: false,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(&[root]);

        assert_eq!(result.files, vec![inside]);
    }

    #[test]
    fn hidden_directories_are_walked_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let git = temp_dir.path().join(".git");
        fs::create_dir(&git).unwrap();
        create_file(&git, "config.json");

        let result = scan_dir(&temp_dir);

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn max_depth_limits_recursion() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("deep");
        fs::create_dir(&sub).unwrap();
        create_file(temp_dir.path(), "top.txt");
        create_file(&sub, "inner.txt");

        let config = ScanConfig {
            max_depth: Some(1),
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("top.txt"));
    }
}
